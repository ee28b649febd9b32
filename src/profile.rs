//! Column type profiling.
//!
//! A column is classified from the share of its non-blank values accepted by
//! each recognizer, checked in priority order: numeric, percentage, currency,
//! date/datetime, then text. Numeric is decided first and requires every
//! sampled value, which keeps digit-only identifiers such as `20240115` away
//! from the date recognizers entirely.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    config::CleanConfig,
    data::{has_percent_marker, is_plain_numeric, parse_currency},
    dates::{DATE_PATTERNS, DatePattern},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Numeric,
    Date,
    DateTime,
    Percentage,
    Currency,
    Text,
}

impl ColumnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Numeric => "numeric",
            ColumnKind::Date => "date",
            ColumnKind::DateTime => "datetime",
            ColumnKind::Percentage => "percentage",
            ColumnKind::Currency => "currency",
            ColumnKind::Text => "text",
        }
    }

    pub fn is_numeric_like(&self) -> bool {
        matches!(
            self,
            ColumnKind::Numeric | ColumnKind::Percentage | ColumnKind::Currency
        )
    }

    pub fn is_temporal(&self) -> bool {
        matches!(self, ColumnKind::Date | ColumnKind::DateTime)
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnProfile {
    pub original_name: String,
    pub sanitized_name: String,
    pub kind: ColumnKind,
    /// Share of sampled values that matched `kind`.
    pub confidence: f64,
    pub sampled: usize,
    /// Set once a temporal column has been resolved.
    pub date_pattern: Option<&'static DatePattern>,
}

#[derive(Debug, Clone, Default)]
struct TypeCandidate {
    non_empty: usize,
    numeric_matches: usize,
    percent_matches: usize,
    currency_matches: usize,
    currency_marker_hits: usize,
    date_matches: usize,
    datetime_matches: usize,
}

impl TypeCandidate {
    fn update(&mut self, value: &str) {
        self.non_empty += 1;
        if is_plain_numeric(value) {
            self.numeric_matches += 1;
            return;
        }
        if has_percent_marker(value) {
            self.percent_matches += 1;
            return;
        }
        if let Some(amount) = parse_currency(value) {
            self.currency_matches += 1;
            if amount.has_marker {
                self.currency_marker_hits += 1;
            }
            return;
        }
        if let Some(temporal) = DATE_PATTERNS.iter().find_map(|pattern| pattern.parse(value)) {
            self.date_matches += 1;
            if temporal.has_time() {
                self.datetime_matches += 1;
            }
        }
    }

    fn rate(&self, count: usize) -> f64 {
        count as f64 / self.non_empty as f64
    }

    fn decide(&self, config: &CleanConfig) -> (ColumnKind, f64) {
        if self.non_empty == 0 {
            return (ColumnKind::Text, 0.0);
        }
        if self.numeric_matches == self.non_empty {
            return (ColumnKind::Numeric, 1.0);
        }
        let percent = self.rate(self.percent_matches);
        if percent >= config.marker_threshold {
            return (ColumnKind::Percentage, percent);
        }
        // Plain numerals are valid amounts inside a currency column.
        let currency = self.rate(self.currency_matches + self.numeric_matches);
        if self.currency_marker_hits > 0 && currency >= config.marker_threshold {
            return (ColumnKind::Currency, currency);
        }
        let dates = self.rate(self.date_matches);
        if dates >= config.date_like_threshold {
            let kind = if self.datetime_matches > 0 {
                ColumnKind::DateTime
            } else {
                ColumnKind::Date
            };
            return (kind, dates);
        }
        (ColumnKind::Text, 1.0)
    }
}

pub fn profile_column(
    original_name: &str,
    sanitized_name: &str,
    values: &[Option<String>],
    config: &CleanConfig,
) -> ColumnProfile {
    let limit = if config.profile_sample_rows == 0 {
        usize::MAX
    } else {
        config.profile_sample_rows
    };
    let mut candidate = TypeCandidate::default();
    values
        .iter()
        .flatten()
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .take(limit)
        .for_each(|value| candidate.update(value));
    let (kind, confidence) = candidate.decide(config);
    ColumnProfile {
        original_name: original_name.to_string(),
        sanitized_name: sanitized_name.to_string(),
        kind,
        confidence,
        sampled: candidate.non_empty,
        date_pattern: None,
    }
}
