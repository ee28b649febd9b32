//! Date format resolution.
//!
//! Every date-like column is converted with exactly one pattern from a fixed,
//! ordered catalog. The pattern with the highest parse rate over a sample of
//! the column wins (earlier catalog entries win ties) and is then applied to
//! every value. A value the winning pattern cannot read becomes null; it is
//! never retried against another pattern, so a value such as `01/02/2024`
//! cannot mean January 2nd in one row and February 1st in the next.
//!
//! Each catalog entry is a date layout that may be followed by a time of day
//! in one of the [`TIME_SUFFIXES`] shapes.

use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatePattern {
    pub label: &'static str,
    format: &'static str,
    two_digit_year: bool,
}

impl DatePattern {
    const fn new(label: &'static str, format: &'static str) -> Self {
        Self {
            label,
            format,
            two_digit_year: false,
        }
    }

    const fn two_digit_year(label: &'static str, format: &'static str) -> Self {
        Self {
            label,
            format,
            two_digit_year: true,
        }
    }

    pub fn parse(&self, value: &str) -> Option<Temporal> {
        let value = value.trim();
        let (date, remainder) = NaiveDate::parse_and_remainder(value, self.format).ok()?;
        // chrono reads `%Y` with as few as one digit.
        if !self.two_digit_year && date.year() < 1000 {
            return None;
        }
        if remainder.is_empty() {
            return Some(Temporal::Date(date));
        }
        TIME_SUFFIXES
            .iter()
            .find_map(|suffix| NaiveTime::parse_from_str(remainder, suffix).ok())
            .map(|time| Temporal::DateTime(date.and_time(time)))
    }
}

impl fmt::Display for DatePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label)
    }
}

impl Serialize for DatePattern {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.label)
    }
}

pub const DATE_PATTERNS: &[DatePattern] = &[
    DatePattern::new("YYYY-MM-DD", "%Y-%m-%d"),
    DatePattern::new("MM/DD/YYYY", "%m/%d/%Y"),
    DatePattern::new("DD/MM/YYYY", "%d/%m/%Y"),
    DatePattern::new("YYYY/MM/DD", "%Y/%m/%d"),
    DatePattern::new("MM-DD-YYYY", "%m-%d-%Y"),
    DatePattern::new("DD-MM-YYYY", "%d-%m-%Y"),
    DatePattern::new("DD.MM.YYYY", "%d.%m.%Y"),
    DatePattern::new("Month DD, YYYY", "%B %d, %Y"),
    DatePattern::new("DD Month YYYY", "%d %B %Y"),
    DatePattern::new("DD-Mon-YYYY", "%d-%b-%Y"),
    DatePattern::new("Mon DD YYYY", "%b %d %Y"),
    DatePattern::two_digit_year("MM/DD/YY", "%m/%d/%y"),
];

pub const TIME_SUFFIXES: &[&str] = &[
    " %H:%M:%S%.f",
    "T%H:%M:%S%.f",
    "T%H:%M:%S%.fZ",
    " %H:%M",
    "T%H:%M",
    " %I:%M:%S %p",
    " %I:%M %p",
];

pub const DATE_OUTPUT_FORMAT: &str = "%Y-%m-%d";
/// Whole-second datetime form; a non-zero fraction is appended with its
/// trailing zeros removed (`08:30:00.25`).
pub const DATETIME_OUTPUT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Temporal {
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl Temporal {
    pub fn has_time(&self) -> bool {
        matches!(self, Temporal::DateTime(_))
    }

    pub fn to_datetime(self) -> NaiveDateTime {
        match self {
            Temporal::Date(date) => date.and_time(NaiveTime::MIN),
            Temporal::DateTime(datetime) => datetime,
        }
    }

    /// Canonical rendering; `with_time` forces the datetime form.
    pub fn render(&self, with_time: bool) -> String {
        match (self, with_time) {
            (Temporal::Date(date), false) => date.format(DATE_OUTPUT_FORMAT).to_string(),
            (Temporal::DateTime(datetime), false) => {
                datetime.date().format(DATE_OUTPUT_FORMAT).to_string()
            }
            (_, true) => {
                let datetime = self.to_datetime();
                let mut rendered = datetime.format(DATETIME_OUTPUT_FORMAT).to_string();
                let nanos = datetime.nanosecond() % 1_000_000_000;
                if nanos > 0 {
                    let digits = format!("{nanos:09}");
                    rendered.push('.');
                    rendered.push_str(digits.trim_end_matches('0'));
                }
                rendered
            }
        }
    }
}

pub fn pattern_by_label(label: &str) -> Option<&'static DatePattern> {
    DATE_PATTERNS.iter().find(|pattern| pattern.label == label)
}

/// Reads a value with `preferred` first, then the catalog in order.
pub fn parse_any(value: &str, preferred: Option<&DatePattern>) -> Option<Temporal> {
    preferred
        .and_then(|pattern| pattern.parse(value))
        .or_else(|| DATE_PATTERNS.iter().find_map(|pattern| pattern.parse(value)))
}

/// Reads the resolver's own output forms.
pub fn parse_canonical(value: &str) -> Option<Temporal> {
    DATE_PATTERNS[0].parse(value)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    pub pattern: &'static DatePattern,
    pub match_rate: f64,
    pub sampled: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResolveOutcome {
    Resolved(Resolution),
    /// No pattern reached the minimum rate; `best` is the top scorer, if any matched.
    BelowThreshold {
        best: Option<Resolution>,
        sampled: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedColumn {
    pub values: Vec<Option<String>>,
    pub failures: usize,
    pub has_time: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct DateFormatResolver {
    sample_rows: usize,
    min_match_rate: f64,
}

impl DateFormatResolver {
    /// `sample_rows` of 0 scores every value.
    pub fn new(sample_rows: usize, min_match_rate: f64) -> Self {
        Self {
            sample_rows,
            min_match_rate,
        }
    }

    pub fn resolve(&self, values: &[Option<String>]) -> ResolveOutcome {
        let limit = if self.sample_rows == 0 {
            usize::MAX
        } else {
            self.sample_rows
        };
        let sample: Vec<&str> = values
            .iter()
            .flatten()
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
            .take(limit)
            .collect();
        if sample.is_empty() {
            return ResolveOutcome::BelowThreshold {
                best: None,
                sampled: 0,
            };
        }

        let mut best: Option<(&'static DatePattern, usize)> = None;
        for pattern in DATE_PATTERNS {
            let hits = sample
                .iter()
                .filter(|value| pattern.parse(value).is_some())
                .count();
            if hits > best.map_or(0, |(_, count)| count) {
                best = Some((pattern, hits));
            }
        }

        let best = best.map(|(pattern, hits)| Resolution {
            pattern,
            match_rate: hits as f64 / sample.len() as f64,
            sampled: sample.len(),
        });
        match best {
            Some(resolution) if resolution.match_rate >= self.min_match_rate => {
                ResolveOutcome::Resolved(resolution)
            }
            _ => ResolveOutcome::BelowThreshold {
                best,
                sampled: sample.len(),
            },
        }
    }

    /// Applies `pattern` to every value, preserving row order and nulls.
    pub fn convert(&self, values: &[Option<String>], pattern: &DatePattern) -> ConvertedColumn {
        let mut failures = 0usize;
        let parsed: Vec<Option<Temporal>> = values
            .iter()
            .map(|cell| {
                let value = cell.as_deref().map(str::trim).filter(|v| !v.is_empty())?;
                let temporal = pattern.parse(value);
                if temporal.is_none() {
                    failures += 1;
                }
                temporal
            })
            .collect();
        let has_time = parsed.iter().flatten().any(Temporal::has_time);
        ConvertedColumn {
            values: parsed
                .into_iter()
                .map(|temporal| temporal.map(|t| t.render(has_time)))
                .collect(),
            failures,
            has_time,
        }
    }
}
