use itertools::Itertools;
use thiserror::Error;

use crate::audit::AuditMismatch;

/// Engine-level failures for a single table.
///
/// Cell-level parse problems never surface here; they are nulled, counted, and
/// reported through the audit instead.
#[derive(Debug, Error)]
pub enum CleanError {
    #[error("table declares {headers} header(s) but stores {columns} column(s)")]
    HeaderCount { headers: usize, columns: usize },
    #[error("column '{column}' holds {actual} value(s) but the table has {expected} row(s)")]
    MisalignedColumn {
        column: String,
        expected: usize,
        actual: usize,
    },
    #[error("structural violation: {}", describe_mismatches(.mismatches))]
    Structural { mismatches: Vec<AuditMismatch> },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

fn describe_mismatches(mismatches: &[AuditMismatch]) -> String {
    mismatches.iter().map(ToString::to_string).join("; ")
}
