//! Per-cell value normalization driven by a column's profile.
//!
//! Output stays index-aligned with the input column: one cell out per cell
//! in, in the same order. A blank cell always becomes null; a non-blank cell
//! that cannot be read under the column's kind also becomes null and is
//! counted in [`NormalizedColumn::parse_failures`].

use crate::{
    config::CleanConfig,
    data::{
        has_percent_marker, is_plain_numeric, parse_currency, parse_percentage, render_fraction,
    },
    dates::{DateFormatResolver, ResolveOutcome, Resolution},
    profile::ColumnKind,
};

#[derive(Debug, Clone, PartialEq)]
pub enum DateOutcome {
    NotTemporal,
    Resolved { resolution: Resolution, has_time: bool },
    /// The column looked date-like but no pattern cleared the threshold.
    Fallback { best: Option<Resolution> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedColumn {
    pub values: Vec<Option<String>>,
    pub parse_failures: usize,
    pub date: DateOutcome,
}

impl NormalizedColumn {
    /// The kind the column actually ended up with after date resolution.
    pub fn effective_kind(&self, profiled: ColumnKind) -> ColumnKind {
        match &self.date {
            DateOutcome::NotTemporal => profiled,
            DateOutcome::Resolved { has_time: true, .. } => ColumnKind::DateTime,
            DateOutcome::Resolved { has_time: false, .. } => ColumnKind::Date,
            DateOutcome::Fallback { .. } => ColumnKind::Text,
        }
    }
}

enum Cell {
    Null,
    Value(String),
    Failed,
}

fn normalize_cell(value: &str, kind: ColumnKind) -> Cell {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Cell::Null;
    }
    let normalized = match kind {
        ColumnKind::Text | ColumnKind::Date | ColumnKind::DateTime => Some(trimmed.to_string()),
        ColumnKind::Numeric => is_plain_numeric(trimmed).then(|| trimmed.to_string()),
        ColumnKind::Currency => parse_currency(trimmed).map(|parsed| parsed.amount.to_string()),
        ColumnKind::Percentage if has_percent_marker(trimmed) => {
            parse_percentage(trimmed).map(render_fraction)
        }
        ColumnKind::Percentage => is_plain_numeric(trimmed).then(|| trimmed.to_string()),
    };
    match normalized {
        Some(value) => Cell::Value(value),
        None => Cell::Failed,
    }
}

fn normalize_cells(values: &[Option<String>], kind: ColumnKind) -> (Vec<Option<String>>, usize) {
    let mut failures = 0usize;
    let cleaned = values
        .iter()
        .map(|cell| match cell.as_deref().map(|value| normalize_cell(value, kind)) {
            None | Some(Cell::Null) => None,
            Some(Cell::Value(value)) => Some(value),
            Some(Cell::Failed) => {
                failures += 1;
                None
            }
        })
        .collect();
    (cleaned, failures)
}

pub fn normalize_column(
    values: &[Option<String>],
    kind: ColumnKind,
    config: &CleanConfig,
) -> NormalizedColumn {
    if !kind.is_temporal() {
        let (values, parse_failures) = normalize_cells(values, kind);
        return NormalizedColumn {
            values,
            parse_failures,
            date: DateOutcome::NotTemporal,
        };
    }

    let resolver =
        DateFormatResolver::new(config.resolver_sample_rows, config.date_min_match_rate);
    match resolver.resolve(values) {
        ResolveOutcome::Resolved(resolution) => {
            let converted = resolver.convert(values, resolution.pattern);
            NormalizedColumn {
                values: converted.values,
                parse_failures: converted.failures,
                date: DateOutcome::Resolved {
                    resolution,
                    has_time: converted.has_time,
                },
            }
        }
        ResolveOutcome::BelowThreshold { best, .. } => {
            let (values, parse_failures) = normalize_cells(values, ColumnKind::Text);
            NormalizedColumn {
                values,
                parse_failures,
                date: DateOutcome::Fallback { best },
            }
        }
    }
}
