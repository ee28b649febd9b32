//! Serializable per-file and per-run reports.

use std::{
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::{
    audit::AuditReport,
    context::Alert,
    engine::CleanOutcome,
    header::{HeaderAlert, LongHeader},
    profile::ColumnProfile,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Success,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub source: PathBuf,
    pub fingerprint: Option<String>,
    pub status: FileStatus,
    pub original_rows: usize,
    pub original_columns: usize,
    pub headers: Vec<String>,
    pub header_warnings: Vec<LongHeader>,
    pub header_alerts: Vec<HeaderAlert>,
    pub profiles: Vec<ColumnProfile>,
    pub alerts: Vec<Alert>,
    pub audit: Option<AuditReport>,
    pub output: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileReport {
    pub fn succeeded(
        source: PathBuf,
        fingerprint: String,
        raw_shape: (usize, usize),
        outcome: &CleanOutcome,
        alerts: Vec<Alert>,
        output: PathBuf,
    ) -> Self {
        Self {
            source,
            fingerprint: Some(fingerprint),
            status: FileStatus::Success,
            original_rows: raw_shape.0,
            original_columns: raw_shape.1,
            headers: outcome.headers.names.clone(),
            header_warnings: outcome.headers.warnings.clone(),
            header_alerts: outcome.headers.alerts.clone(),
            profiles: outcome.profiles.clone(),
            alerts,
            audit: Some(outcome.audit.clone()),
            output: Some(output),
            error: None,
        }
    }

    /// A file that produced no output. `fingerprint` is absent when the
    /// source could not be read at all.
    pub fn failed(source: PathBuf, fingerprint: Option<String>, error: String) -> Self {
        Self {
            source,
            fingerprint,
            status: FileStatus::Failed,
            original_rows: 0,
            original_columns: 0,
            headers: Vec::new(),
            header_warnings: Vec::new(),
            header_alerts: Vec::new(),
            profiles: Vec::new(),
            alerts: Vec::new(),
            audit: None,
            output: None,
            error: Some(error),
        }
    }

    pub fn with_shape(mut self, rows: usize, columns: usize) -> Self {
        self.original_rows = rows;
        self.original_columns = columns;
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == FileStatus::Success
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub inputs: Vec<PathBuf>,
    pub output_dir: PathBuf,
    pub files: Vec<FileReport>,
}

impl RunSummary {
    pub fn failed_count(&self) -> usize {
        self.files.iter().filter(|file| !file.is_success()).count()
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let file = File::create(path).with_context(|| format!("Creating report file {path:?}"))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)
            .with_context(|| format!("Writing JSON report to {path:?}"))?;
        Ok(())
    }
}
