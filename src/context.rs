//! Per-file run state.
//!
//! Everything the engine needs to know or accumulate while cleaning one file
//! travels in a [`RunContext`], so separate files never share mutable state.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use log::warn;
use serde::Serialize;

use crate::{config::CleanConfig, profile::ColumnKind};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Alert {
    /// A date-like column had no pattern above the minimum rate and was kept as text.
    DateFallback {
        column: String,
        best_pattern: Option<String>,
        match_rate: f64,
    },
    /// Non-blank cells that could not be read under the column's kind.
    ParseFailures {
        column: String,
        kind: ColumnKind,
        count: usize,
    },
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Alert::DateFallback {
                column,
                best_pattern: Some(pattern),
                match_rate,
            } => write!(
                f,
                "column '{column}' looked date-like but its best pattern {pattern} matched only {:.0}% of values; kept as text",
                match_rate * 100.0
            ),
            Alert::DateFallback { column, .. } => write!(
                f,
                "column '{column}' looked date-like but no date pattern matched; kept as text"
            ),
            Alert::ParseFailures {
                column,
                kind,
                count,
            } => write!(
                f,
                "column '{column}': {count} {kind} value(s) could not be parsed and were set to null"
            ),
        }
    }
}

#[derive(Debug)]
pub struct RunContext<'a> {
    source: PathBuf,
    config: &'a CleanConfig,
    alerts: Vec<Alert>,
}

impl<'a> RunContext<'a> {
    pub fn new(source: impl Into<PathBuf>, config: &'a CleanConfig) -> Self {
        Self {
            source: source.into(),
            config,
            alerts: Vec::new(),
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn config(&self) -> &'a CleanConfig {
        self.config
    }

    pub fn alert(&mut self, alert: Alert) {
        warn!("{}: {alert}", self.source.display());
        self.alerts.push(alert);
    }

    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    pub fn into_alerts(self) -> Vec<Alert> {
        self.alerts
    }
}
