//! Human-readable run log written alongside the cleaned output.
//!
//! One log per `clean` invocation, named `cleaning_log_YYYYMMDD_HHMMSS.txt`,
//! with a banner, one section per file and a completion footer.

use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::Local;

use crate::{
    header::HeaderAlert,
    report::{FileReport, FileStatus},
};

const RULE_WIDTH: usize = 80;
const STAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn log_file_name() -> String {
    Local::now()
        .format("cleaning_log_%Y%m%d_%H%M%S.txt")
        .to_string()
}

pub struct RunLog<W: Write> {
    out: W,
    /// The configured `max_header_len`, quoted in long-header warnings.
    header_limit: usize,
}

impl RunLog<BufWriter<File>> {
    /// Creates `dir` if needed and opens a fresh timestamped log inside it.
    pub fn create(dir: &Path, header_limit: usize) -> Result<(Self, PathBuf)> {
        fs::create_dir_all(dir).with_context(|| format!("Creating log directory {dir:?}"))?;
        let path = dir.join(log_file_name());
        let file = File::create(&path).with_context(|| format!("Creating log file {path:?}"))?;
        Ok((Self::new(BufWriter::new(file), header_limit), path))
    }
}

impl<W: Write> RunLog<W> {
    pub fn new(out: W, header_limit: usize) -> Self {
        Self { out, header_limit }
    }

    fn rule(&mut self, ch: char) -> Result<()> {
        writeln!(self.out, "{}", ch.to_string().repeat(RULE_WIDTH))?;
        Ok(())
    }

    pub fn banner(&mut self, inputs: &[PathBuf], output_dir: &Path) -> Result<()> {
        self.rule('=')?;
        writeln!(
            self.out,
            "CSV Cleaning Log - {}",
            Local::now().format(STAMP_FORMAT)
        )?;
        self.rule('=')?;
        for input in inputs {
            writeln!(self.out, "Input: {}", input.display())?;
        }
        writeln!(self.out, "Output Directory: {}", output_dir.display())?;
        writeln!(self.out)?;
        Ok(())
    }

    pub fn found(&mut self, count: usize) -> Result<()> {
        if count == 0 {
            writeln!(self.out, "No CSV files found")?;
        } else {
            writeln!(self.out, "Found {count} CSV file(s) to clean")?;
        }
        writeln!(self.out)?;
        Ok(())
    }

    pub fn file_section(&mut self, report: &FileReport) -> Result<()> {
        self.rule('-')?;
        let name = report
            .source
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| report.source.display().to_string());
        writeln!(self.out, "File: {name}")?;
        if let Some(fingerprint) = &report.fingerprint {
            writeln!(self.out, "SHA-256: {fingerprint}")?;
        }
        if report.original_columns > 0 || report.original_rows > 0 {
            writeln!(
                self.out,
                "Original dimensions: {} rows × {} columns",
                report.original_rows, report.original_columns
            )?;
        }

        let generated: Vec<_> = report
            .header_alerts
            .iter()
            .filter_map(|alert| match alert {
                HeaderAlert::Fallback {
                    original, assigned, ..
                } if original.trim().is_empty() => Some(assigned),
                _ => None,
            })
            .collect();
        if !generated.is_empty() {
            writeln!(
                self.out,
                "ALERT: Auto-generated column headers detected (rows have more values than headers):"
            )?;
            for name in generated {
                writeln!(self.out, "  - '{name}' was automatically created")?;
            }
        }
        for alert in &report.header_alerts {
            match alert {
                HeaderAlert::Fallback { original, .. } if original.trim().is_empty() => {}
                other => writeln!(self.out, "ALERT: {other}")?,
            }
        }
        if !report.header_warnings.is_empty() {
            writeln!(
                self.out,
                "WARNING: Column headers exceeding {} characters:",
                self.header_limit
            )?;
            for warning in &report.header_warnings {
                writeln!(self.out, "  - {warning}")?;
            }
        }
        for alert in &report.alerts {
            writeln!(self.out, "ALERT: {alert}")?;
        }

        if let Some(audit) = &report.audit {
            writeln!(self.out)?;
            writeln!(self.out, "=== DATA AUDIT ===")?;
            for mismatch in &audit.mismatches {
                writeln!(self.out, "{mismatch}")?;
            }
            if audit.passed() {
                writeln!(self.out, "[PASS] Audit PASSED: Data integrity maintained")?;
            } else {
                writeln!(
                    self.out,
                    "[FAIL] Audit FAILED: Data integrity issues detected (see warnings above)"
                )?;
            }
            writeln!(self.out)?;
            writeln!(
                self.out,
                "Cleaned dimensions: {} rows × {} columns",
                audit.cleaned_rows,
                report.headers.len()
            )?;
        }

        match report.status {
            FileStatus::Success => {
                writeln!(self.out, "Status: SUCCESS")?;
                if let Some(output) = &report.output {
                    writeln!(self.out, "Output: {}", output.display())?;
                }
            }
            FileStatus::Failed => {
                writeln!(self.out, "Status: FAILED")?;
                if let Some(error) = &report.error {
                    writeln!(self.out, "ERROR: {error}")?;
                }
            }
        }
        writeln!(self.out)?;
        Ok(())
    }

    pub fn finish(mut self) -> Result<W> {
        self.rule('=')?;
        writeln!(
            self.out,
            "Processing completed at {}",
            Local::now().format(STAMP_FORMAT)
        )?;
        self.rule('=')?;
        self.out.flush()?;
        Ok(self.out)
    }
}
