//! Audit of a cleaned table against its raw original.
//!
//! Every check runs independently and appends to the same mismatch list; no
//! check can suppress another and the audit itself never fails. Whether a
//! fatal mismatch stops the file is the caller's decision.
//!
//! Checks:
//!
//! - row and column counts (fatal when they differ)
//! - null counts per column, graded by the share of rows affected
//! - decimal sums, minimum, maximum, and mean for numeric, currency, and
//!   percentage columns
//! - min/max ranges for date and datetime columns
//! - distinct value counts for text columns

use std::fmt;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    config::CleanConfig,
    data::{parse_loose_decimal, parse_plain_decimal},
    dates::{self, DatePattern},
    frame::Table,
    profile::{ColumnKind, ColumnProfile},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MismatchKind {
    RowCount,
    ColumnCount,
    NullCount,
    NumericSum,
    NumericMin,
    NumericMax,
    NumericMean,
    DateRange,
    DistinctCount,
}

impl MismatchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MismatchKind::RowCount => "row_count",
            MismatchKind::ColumnCount => "column_count",
            MismatchKind::NullCount => "null_count",
            MismatchKind::NumericSum => "numeric_sum",
            MismatchKind::NumericMin => "numeric_min",
            MismatchKind::NumericMax => "numeric_max",
            MismatchKind::NumericMean => "numeric_mean",
            MismatchKind::DateRange => "date_range",
            MismatchKind::DistinctCount => "distinct_count",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditMismatch {
    /// `None` for table-level checks.
    pub column: Option<String>,
    pub kind: MismatchKind,
    pub original_value: String,
    pub cleaned_value: String,
    pub severity: Severity,
}

impl fmt::Display for AuditMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.column {
            Some(column) => write!(
                f,
                "{} column '{column}' {} changed from {} to {}",
                self.severity,
                self.kind.as_str(),
                self.original_value,
                self.cleaned_value
            ),
            None => write!(
                f,
                "{} {} mismatch: original {}, cleaned {}",
                self.severity,
                self.kind.as_str(),
                self.original_value,
                self.cleaned_value
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnPair<T> {
    pub column: String,
    pub original: T,
    pub cleaned: T,
}

/// Extremes and mean of the parseable values in a numeric column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NumericRange {
    pub min: Decimal,
    pub max: Decimal,
    /// Rounded to six decimal places.
    pub mean: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub min: NaiveDateTime,
    pub max: NaiveDateTime,
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.min, self.max)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AuditReport {
    pub row_count_match: bool,
    pub original_rows: usize,
    pub cleaned_rows: usize,
    pub null_counts: Vec<ColumnPair<usize>>,
    pub numeric_sums: Vec<ColumnPair<Decimal>>,
    pub numeric_ranges: Vec<ColumnPair<Option<NumericRange>>>,
    pub date_ranges: Vec<ColumnPair<Option<DateRange>>>,
    pub mismatches: Vec<AuditMismatch>,
}

impl AuditReport {
    pub fn passed(&self) -> bool {
        self.mismatches.is_empty()
    }

    pub fn has_fatal(&self) -> bool {
        self.mismatches
            .iter()
            .any(|mismatch| mismatch.severity == Severity::Fatal)
    }

    pub fn fatal_mismatches(&self) -> Vec<AuditMismatch> {
        self.mismatches
            .iter()
            .filter(|mismatch| mismatch.severity == Severity::Fatal)
            .cloned()
            .collect()
    }

    pub fn worst_severity(&self) -> Option<Severity> {
        self.mismatches.iter().map(|mismatch| mismatch.severity).max()
    }

    pub fn null_delta(&self, column: &str) -> Option<i64> {
        self.null_counts
            .iter()
            .find(|pair| pair.column == column)
            .map(|pair| pair.cleaned as i64 - pair.original as i64)
    }

    pub fn mismatches_for(&self, column: &str) -> impl Iterator<Item = &AuditMismatch> {
        self.mismatches
            .iter()
            .filter(move |mismatch| mismatch.column.as_deref() == Some(column))
    }

    fn push(
        &mut self,
        column: Option<&str>,
        kind: MismatchKind,
        original: impl ToString,
        cleaned: impl ToString,
        severity: Severity,
    ) {
        self.mismatches.push(AuditMismatch {
            column: column.map(str::to_string),
            kind,
            original_value: original.to_string(),
            cleaned_value: cleaned.to_string(),
            severity,
        });
    }
}

/// Grades a null-count change by the share of rows it touches.
pub fn null_delta_severity(original: usize, cleaned: usize, rows: usize) -> Severity {
    if cleaned < original {
        return Severity::Error;
    }
    let delta = (cleaned - original) as f64;
    let share = if rows == 0 { 1.0 } else { delta / rows as f64 };
    if share < 0.01 {
        Severity::Info
    } else if share < 0.10 {
        Severity::Warning
    } else {
        Severity::Error
    }
}

const MEAN_DECIMALS: u32 = 6;

fn numeric_summary<'a, F>(
    cells: impl Iterator<Item = &'a Option<String>>,
    parse: F,
) -> (Decimal, Option<NumericRange>)
where
    F: Fn(&str) -> Option<Decimal>,
{
    let mut sum = Decimal::ZERO;
    let mut count = 0u64;
    let mut extremes: Option<(Decimal, Decimal)> = None;
    for value in cells.flatten().filter_map(|value| parse(value.as_str())) {
        sum = sum.saturating_add(value);
        count += 1;
        extremes = Some(match extremes {
            None => (value, value),
            Some((min, max)) => (min.min(value), max.max(value)),
        });
    }
    let range = extremes.and_then(|(min, max)| {
        let mean = sum.checked_div(Decimal::from(count))?.round_dp(MEAN_DECIMALS);
        Some(NumericRange { min, max, mean })
    });
    (sum, range)
}

fn describe_number(value: Option<Decimal>) -> String {
    value.map_or_else(|| "none".to_string(), |value| value.normalize().to_string())
}

fn date_range<'a, F>(cells: impl Iterator<Item = &'a Option<String>>, parse: F) -> Option<DateRange>
where
    F: Fn(&str) -> Option<NaiveDateTime>,
{
    cells
        .flatten()
        .filter_map(|value| parse(value.as_str()))
        .fold(None, |range: Option<DateRange>, value| match range {
            None => Some(DateRange {
                min: value,
                max: value,
            }),
            Some(range) => Some(DateRange {
                min: range.min.min(value),
                max: range.max.max(value),
            }),
        })
}

fn parse_original_temporal(value: &str, pattern: Option<&DatePattern>) -> Option<NaiveDateTime> {
    dates::parse_any(value, pattern).map(dates::Temporal::to_datetime)
}

fn parse_cleaned_temporal(value: &str) -> Option<NaiveDateTime> {
    dates::parse_canonical(value).map(dates::Temporal::to_datetime)
}

pub fn audit_tables(
    original: &Table,
    cleaned: &Table,
    profiles: &[ColumnProfile],
    config: &CleanConfig,
) -> AuditReport {
    let mut report = AuditReport {
        row_count_match: original.row_count() == cleaned.row_count(),
        original_rows: original.row_count(),
        cleaned_rows: cleaned.row_count(),
        ..AuditReport::default()
    };
    if !report.row_count_match {
        report.push(
            None,
            MismatchKind::RowCount,
            original.row_count(),
            cleaned.row_count(),
            Severity::Fatal,
        );
    }
    if original.column_count() != cleaned.column_count() {
        report.push(
            None,
            MismatchKind::ColumnCount,
            original.column_count(),
            cleaned.column_count(),
            Severity::Fatal,
        );
    }

    let rows = original.row_count();
    for (idx, (raw_column, clean_column)) in original
        .columns()
        .iter()
        .zip(cleaned.columns())
        .enumerate()
    {
        let name = cleaned.headers()[idx].as_str();
        let profile = profiles.get(idx);
        let kind = profile.map_or(ColumnKind::Text, |p| p.kind);

        let raw_nulls = original.null_count(idx);
        let clean_nulls = cleaned.null_count(idx);
        if raw_nulls != clean_nulls {
            report.push(
                Some(name),
                MismatchKind::NullCount,
                raw_nulls,
                clean_nulls,
                null_delta_severity(raw_nulls, clean_nulls, rows),
            );
        }
        report.null_counts.push(ColumnPair {
            column: name.to_string(),
            original: raw_nulls,
            cleaned: clean_nulls,
        });

        if kind.is_numeric_like() {
            let (raw_sum, raw_range) = numeric_summary(raw_column.iter(), parse_loose_decimal);
            let (clean_sum, clean_range) =
                numeric_summary(clean_column.iter(), parse_plain_decimal);
            let drifted = |raw: Decimal, clean: Decimal| {
                raw.saturating_sub(clean).abs() > config.sum_tolerance
            };
            if drifted(raw_sum, clean_sum) {
                report.push(
                    Some(name),
                    MismatchKind::NumericSum,
                    raw_sum,
                    clean_sum,
                    Severity::Error,
                );
            }
            let stats: [(MismatchKind, fn(&NumericRange) -> Decimal); 3] = [
                (MismatchKind::NumericMin, |range| range.min),
                (MismatchKind::NumericMax, |range| range.max),
                (MismatchKind::NumericMean, |range| range.mean),
            ];
            for (check, stat) in stats {
                let raw = raw_range.as_ref().map(stat);
                let clean = clean_range.as_ref().map(stat);
                let changed = match (raw, clean) {
                    (Some(raw), Some(clean)) => drifted(raw, clean),
                    (raw, clean) => raw.is_some() != clean.is_some(),
                };
                if changed {
                    report.push(
                        Some(name),
                        check,
                        describe_number(raw),
                        describe_number(clean),
                        Severity::Error,
                    );
                }
            }
            report.numeric_sums.push(ColumnPair {
                column: name.to_string(),
                original: raw_sum,
                cleaned: clean_sum,
            });
            report.numeric_ranges.push(ColumnPair {
                column: name.to_string(),
                original: raw_range,
                cleaned: clean_range,
            });
        } else if kind.is_temporal() {
            let pattern = profile.and_then(|p| p.date_pattern);
            let raw_range =
                date_range(raw_column.iter(), |value| parse_original_temporal(value, pattern));
            let clean_range = date_range(clean_column.iter(), parse_cleaned_temporal);
            if raw_range != clean_range {
                report.push(
                    Some(name),
                    MismatchKind::DateRange,
                    describe_range(raw_range),
                    describe_range(clean_range),
                    Severity::Error,
                );
            }
            report.date_ranges.push(ColumnPair {
                column: name.to_string(),
                original: raw_range,
                cleaned: clean_range,
            });
        } else {
            let raw_distinct = original.distinct_count(idx);
            let clean_distinct = cleaned.distinct_count(idx);
            if raw_distinct != clean_distinct {
                report.push(
                    Some(name),
                    MismatchKind::DistinctCount,
                    raw_distinct,
                    clean_distinct,
                    Severity::Info,
                );
            }
        }
    }
    report
}

fn describe_range(range: Option<DateRange>) -> String {
    range.map_or_else(|| "none".to_string(), |range| range.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::pattern_by_label;

    fn table(headers: &[&str], columns: Vec<Vec<Option<&str>>>) -> Table {
        Table::new(
            headers.iter().map(|h| h.to_string()).collect(),
            columns
                .into_iter()
                .map(|column| column.into_iter().map(|v| v.map(str::to_string)).collect())
                .collect(),
        )
        .unwrap()
    }

    fn profile(name: &str, kind: ColumnKind) -> ColumnProfile {
        ColumnProfile {
            original_name: name.to_string(),
            sanitized_name: name.to_string(),
            kind,
            confidence: 1.0,
            sampled: 0,
            date_pattern: None,
        }
    }

    #[test]
    fn identical_tables_produce_no_mismatches() {
        let original = table(
            &["id", "amount", "day", "name"],
            vec![
                vec![Some("1"), Some("2")],
                vec![Some("10.50"), Some("4")],
                vec![Some("2024-01-01"), Some("2024-02-01")],
                vec![Some("a"), Some("b")],
            ],
        );
        let profiles = vec![
            profile("id", ColumnKind::Numeric),
            profile("amount", ColumnKind::Numeric),
            profile("day", ColumnKind::Date),
            profile("name", ColumnKind::Text),
        ];
        let report = audit_tables(&original, &original, &profiles, &CleanConfig::default());
        assert!(report.passed(), "{:?}", report.mismatches);
        assert!(report.row_count_match);
        assert_eq!(report.numeric_sums[1].original, Decimal::new(1450, 2));
        assert_eq!(report.date_ranges.len(), 1);
    }

    #[test]
    fn row_count_mismatch_is_fatal_and_other_checks_still_run() {
        let original = table(&["x"], vec![vec![Some("1"), Some("2"), Some("3")]]);
        let cleaned = table(&["x"], vec![vec![Some("1"), Some("2")]]);
        let report = audit_tables(
            &original,
            &cleaned,
            &[profile("x", ColumnKind::Numeric)],
            &CleanConfig::default(),
        );
        assert!(!report.row_count_match);
        assert!(report.has_fatal());
        assert_eq!(report.fatal_mismatches()[0].kind, MismatchKind::RowCount);
        assert!(
            report
                .mismatches
                .iter()
                .any(|m| m.kind == MismatchKind::NumericSum)
        );
    }

    #[test]
    fn column_count_mismatch_is_fatal() {
        let original = table(&["a", "b"], vec![vec![Some("1")], vec![Some("2")]]);
        let cleaned = table(&["a"], vec![vec![Some("1")]]);
        let report = audit_tables(
            &original,
            &cleaned,
            &[profile("a", ColumnKind::Text)],
            &CleanConfig::default(),
        );
        assert_eq!(report.worst_severity(), Some(Severity::Fatal));
        assert_eq!(report.mismatches[0].kind, MismatchKind::ColumnCount);
    }

    #[test]
    fn null_delta_is_graded_by_share_of_rows() {
        assert_eq!(null_delta_severity(0, 1, 1000), Severity::Info);
        assert_eq!(null_delta_severity(0, 5, 100), Severity::Warning);
        assert_eq!(null_delta_severity(0, 1, 3), Severity::Error);
        assert_eq!(null_delta_severity(2, 1, 100), Severity::Error);
    }

    #[test]
    fn percentage_sums_compare_as_fractions() {
        let original = table(&["rate"], vec![vec![Some("25%"), Some("50%")]]);
        let cleaned = table(&["rate"], vec![vec![Some("0.25"), Some("0.5")]]);
        let report = audit_tables(
            &original,
            &cleaned,
            &[profile("rate", ColumnKind::Percentage)],
            &CleanConfig::default(),
        );
        assert!(report.passed(), "{:?}", report.mismatches);
        assert_eq!(report.numeric_sums[0].cleaned, Decimal::new(75, 2));
    }

    #[test]
    fn sum_drift_beyond_tolerance_is_reported() {
        let original = table(&["amt"], vec![vec![Some("$1,000"), Some("$5")]]);
        let cleaned = table(&["amt"], vec![vec![Some("1000"), Some("5.02")]]);
        let report = audit_tables(
            &original,
            &cleaned,
            &[profile("amt", ColumnKind::Currency)],
            &CleanConfig::default(),
        );
        let mismatch = report.mismatches_for("amt").next().unwrap();
        assert_eq!(mismatch.kind, MismatchKind::NumericSum);
        assert_eq!(mismatch.original_value, "1005");
        assert_eq!(mismatch.cleaned_value, "1005.02");
    }

    #[test]
    fn preserved_sum_does_not_hide_shifted_extremes() {
        let original = table(&["amt"], vec![vec![Some("1"), Some("5")]]);
        let cleaned = table(&["amt"], vec![vec![Some("2"), Some("4")]]);
        let report = audit_tables(
            &original,
            &cleaned,
            &[profile("amt", ColumnKind::Numeric)],
            &CleanConfig::default(),
        );
        let kinds: Vec<_> = report.mismatches_for("amt").map(|m| m.kind).collect();
        assert_eq!(kinds, vec![MismatchKind::NumericMin, MismatchKind::NumericMax]);
        assert_eq!(report.mismatches[0].original_value, "1");
        assert_eq!(report.mismatches[0].cleaned_value, "2");
        assert_eq!(report.worst_severity(), Some(Severity::Error));
        let ranges = &report.numeric_ranges[0];
        assert_eq!(ranges.original.map(|r| r.mean), Some(Decimal::from(3)));
        assert_eq!(ranges.cleaned.map(|r| r.mean), Some(Decimal::from(3)));
    }

    #[test]
    fn dropped_value_moves_the_mean() {
        let original = table(&["amt"], vec![vec![Some("0"), Some("3"), Some("0")]]);
        let cleaned = table(&["amt"], vec![vec![None, Some("3"), Some("0")]]);
        let report = audit_tables(
            &original,
            &cleaned,
            &[profile("amt", ColumnKind::Numeric)],
            &CleanConfig::default(),
        );
        let mean = report
            .mismatches_for("amt")
            .find(|m| m.kind == MismatchKind::NumericMean)
            .expect("mean mismatch");
        assert_eq!(mean.original_value, "1");
        assert_eq!(mean.cleaned_value, "1.5");
        assert!(
            report
                .mismatches_for("amt")
                .all(|m| m.kind != MismatchKind::NumericSum)
        );
    }

    #[test]
    fn sum_drift_within_tolerance_passes() {
        let original = table(&["amt"], vec![vec![Some("1.004")]]);
        let cleaned = table(&["amt"], vec![vec![Some("1.00")]]);
        let report = audit_tables(
            &original,
            &cleaned,
            &[profile("amt", ColumnKind::Numeric)],
            &CleanConfig::default(),
        );
        assert!(report.passed());
    }

    #[test]
    fn date_range_uses_the_resolved_pattern_for_originals() {
        let original = table(&["day"], vec![vec![Some("01/02/2024"), Some("15/03/2024")]]);
        let cleaned = table(&["day"], vec![vec![Some("2024-02-01"), Some("2024-03-15")]]);
        let mut day = profile("day", ColumnKind::Date);
        day.date_pattern = pattern_by_label("DD/MM/YYYY");
        let report = audit_tables(&original, &cleaned, &[day], &CleanConfig::default());
        assert!(report.passed(), "{:?}", report.mismatches);
    }

    #[test]
    fn shifted_dates_are_reported() {
        let original = table(&["day"], vec![vec![Some("2024-01-01"), Some("2024-06-30")]]);
        let cleaned = table(&["day"], vec![vec![Some("2024-01-01"), None]]);
        let report = audit_tables(
            &original,
            &cleaned,
            &[profile("day", ColumnKind::Date)],
            &CleanConfig::default(),
        );
        let kinds: Vec<_> = report.mismatches.iter().map(|m| m.kind).collect();
        assert_eq!(kinds, vec![MismatchKind::NullCount, MismatchKind::DateRange]);
        assert_eq!(
            report.mismatches[1].original_value,
            "2024-01-01 00:00:00..2024-06-30 00:00:00"
        );
    }

    #[test]
    fn text_distinct_count_change_is_informational() {
        let original = table(&["name"], vec![vec![Some("ann"), Some(" ann")]]);
        let cleaned = table(&["name"], vec![vec![Some("ann"), Some("ann")]]);
        let report = audit_tables(
            &original,
            &cleaned,
            &[profile("name", ColumnKind::Text)],
            &CleanConfig::default(),
        );
        assert_eq!(report.mismatches.len(), 1);
        assert_eq!(report.mismatches[0].kind, MismatchKind::DistinctCount);
        assert_eq!(report.mismatches[0].severity, Severity::Info);
    }
}
