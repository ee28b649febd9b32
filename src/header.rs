//! Header sanitization.
//!
//! Raw export headers are rewritten into database-safe identifiers by a fixed
//! rule sequence. Sanitization never truncates and never resolves collisions;
//! both conditions are reported so the caller can decide.

use std::fmt;

use itertools::Itertools;
use serde::Serialize;

pub const DEFAULT_MAX_HEADER_LEN: usize = 32;

const STRIPPED_CHARS: &[char] = &['/', '@', '*', '^', '&', '(', ')', '{', '}', '[', ']'];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedHeader {
    pub name: String,
    pub fallback: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LongHeader {
    pub name: String,
    pub length: usize,
}

impl fmt::Display for LongHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' ({} characters)", self.name, self.length)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HeaderAlert {
    /// Header was empty or could not start an identifier; a positional name was assigned.
    Fallback {
        position: usize,
        original: String,
        assigned: String,
    },
    /// Several columns sanitized to the same name. Positions are 1-based.
    Collision { name: String, positions: Vec<usize> },
}

impl fmt::Display for HeaderAlert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderAlert::Fallback {
                position,
                original,
                assigned,
            } if original.trim().is_empty() => write!(
                f,
                "column {position} has no header; auto-generated '{assigned}'"
            ),
            HeaderAlert::Fallback {
                position,
                original,
                assigned,
            } => write!(
                f,
                "column {position} header '{original}' is not a valid identifier; renamed to '{assigned}'"
            ),
            HeaderAlert::Collision { name, positions } => write!(
                f,
                "header '{name}' produced by columns {}",
                positions.iter().join(", ")
            ),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HeaderReport {
    pub names: Vec<String>,
    pub warnings: Vec<LongHeader>,
    pub alerts: Vec<HeaderAlert>,
}

impl HeaderReport {
    pub fn has_collisions(&self) -> bool {
        self.alerts
            .iter()
            .any(|alert| matches!(alert, HeaderAlert::Collision { .. }))
    }
}

fn apply_rules(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.trim().chars() {
        match ch {
            ' ' | '-' => out.push('_'),
            '#' => out.push_str("Num"),
            '$' => out.push_str("Dol"),
            '%' => out.push_str("pct"),
            c if STRIPPED_CHARS.contains(&c) => {}
            c => out.push(c),
        }
    }
    // Stripping can expose whitespace at either end.
    let trimmed = out.trim();
    if trimmed.len() == out.len() {
        out
    } else {
        trimmed.to_string()
    }
}

pub fn is_valid_identifier_start(name: &str) -> bool {
    name.chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
}

pub fn fallback_name(position: usize) -> String {
    format!("column_{position}")
}

/// Sanitizes the header at 1-based `position`.
pub fn sanitize_header(raw: &str, position: usize) -> SanitizedHeader {
    let name = apply_rules(raw);
    if is_valid_identifier_start(&name) {
        SanitizedHeader {
            name,
            fallback: false,
        }
    } else {
        SanitizedHeader {
            name: fallback_name(position),
            fallback: true,
        }
    }
}

pub fn sanitize_headers(raw: &[String], max_len: usize) -> HeaderReport {
    let mut report = HeaderReport::default();
    for (idx, original) in raw.iter().enumerate() {
        let position = idx + 1;
        let sanitized = sanitize_header(original, position);
        if sanitized.fallback {
            report.alerts.push(HeaderAlert::Fallback {
                position,
                original: original.clone(),
                assigned: sanitized.name.clone(),
            });
        }
        let length = sanitized.name.chars().count();
        if length > max_len {
            report.warnings.push(LongHeader {
                name: sanitized.name.clone(),
                length,
            });
        }
        report.names.push(sanitized.name);
    }

    for name in report.names.iter().duplicates() {
        let positions = report
            .names
            .iter()
            .positions(|candidate| candidate == name)
            .map(|idx| idx + 1)
            .collect();
        report.alerts.push(HeaderAlert::Collision {
            name: name.clone(),
            positions,
        });
    }
    report
}
