use std::{fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{error::CleanError, header::DEFAULT_MAX_HEADER_LEN};

pub const DEFAULT_PROFILE_SAMPLE_ROWS: usize = 2000;
pub const DEFAULT_RESOLVER_SAMPLE_ROWS: usize = 1000;
pub const DEFAULT_MARKER_THRESHOLD: f64 = 0.8;
pub const DEFAULT_DATE_LIKE_THRESHOLD: f64 = 0.8;
pub const DEFAULT_DATE_MIN_MATCH_RATE: f64 = 0.6;

/// Tunables for profiling, date resolution, and auditing.
///
/// Loaded from YAML; every field is optional and falls back to its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CleanConfig {
    /// Non-null values inspected per column when profiling (0 = all).
    pub profile_sample_rows: usize,
    /// Non-null values scored per date pattern (0 = all).
    pub resolver_sample_rows: usize,
    /// Share of values that must carry `%` or currency markers.
    pub marker_threshold: f64,
    /// Share of values that must parse under some date pattern.
    pub date_like_threshold: f64,
    /// Minimum parse rate of the winning date pattern.
    pub date_min_match_rate: f64,
    pub max_header_len: usize,
    /// Allowed absolute drift between original and cleaned column sums.
    pub sum_tolerance: Decimal,
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self {
            profile_sample_rows: DEFAULT_PROFILE_SAMPLE_ROWS,
            resolver_sample_rows: DEFAULT_RESOLVER_SAMPLE_ROWS,
            marker_threshold: DEFAULT_MARKER_THRESHOLD,
            date_like_threshold: DEFAULT_DATE_LIKE_THRESHOLD,
            date_min_match_rate: DEFAULT_DATE_MIN_MATCH_RATE,
            max_header_len: DEFAULT_MAX_HEADER_LEN,
            sum_tolerance: Decimal::new(1, 2),
        }
    }
}

impl CleanConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening config file {path:?}"))?;
        let config: CleanConfig = serde_yaml::from_reader(BufReader::new(file))
            .with_context(|| format!("Parsing config YAML {path:?}"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), CleanError> {
        for (name, value) in [
            ("marker_threshold", self.marker_threshold),
            ("date_like_threshold", self.date_like_threshold),
            ("date_min_match_rate", self.date_min_match_rate),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(CleanError::InvalidConfig(format!(
                    "{name} must be within (0, 1], got {value}"
                )));
            }
        }
        if self.max_header_len == 0 {
            return Err(CleanError::InvalidConfig(
                "max_header_len must be positive".to_string(),
            ));
        }
        if self.sum_tolerance.is_sign_negative() {
            return Err(CleanError::InvalidConfig(format!(
                "sum_tolerance cannot be negative, got {}",
                self.sum_tolerance
            )));
        }
        Ok(())
    }
}
