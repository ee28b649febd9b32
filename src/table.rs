//! Plain-text tables for terminal output of profiles and audit results.

use std::fmt::{self, Write as _};

use crate::{audit::AuditMismatch, profile::ColumnProfile};

const GAP: &str = "  ";

#[derive(Debug, Clone, Default)]
pub struct TextTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TextTable {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Rows shorter than the header are padded with blanks; longer rows are cut.
    pub fn push_row(&mut self, row: Vec<String>) {
        let mut row = row;
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| cell_width(h)).collect();
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell_width(cell));
            }
        }
        widths.into_iter().map(|w| w.max(3)).collect()
    }
}

impl fmt::Display for TextTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths = self.widths();
        let separator: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        for line in std::iter::once(&self.headers)
            .chain(std::iter::once(&separator))
            .chain(&self.rows)
        {
            writeln!(f, "{}", format_line(line, &widths))?;
        }
        Ok(())
    }
}

fn cell_width(value: &str) -> usize {
    value.chars().count()
}

fn format_line(cells: &[String], widths: &[usize]) -> String {
    let mut line = String::new();
    for (idx, (cell, &width)) in cells.iter().zip(widths).enumerate() {
        if idx > 0 {
            line.push_str(GAP);
        }
        let flat = cell.replace(['\n', '\r', '\t'], " ");
        let _ = write!(line, "{flat:<width$}");
    }
    line.trim_end().to_string()
}

pub fn profiles_table(profiles: &[ColumnProfile]) -> TextTable {
    let mut table = TextTable::new(["#", "original", "sanitized", "kind", "confidence", "pattern"]);
    for (idx, profile) in profiles.iter().enumerate() {
        table.push_row(vec![
            (idx + 1).to_string(),
            profile.original_name.clone(),
            profile.sanitized_name.clone(),
            profile.kind.to_string(),
            format!("{:.2}", profile.confidence),
            profile
                .date_pattern
                .map(|pattern| pattern.label.to_string())
                .unwrap_or_default(),
        ]);
    }
    table
}

pub fn mismatches_table(mismatches: &[AuditMismatch]) -> TextTable {
    let mut table = TextTable::new(["severity", "check", "column", "original", "cleaned"]);
    for mismatch in mismatches {
        table.push_row(vec![
            mismatch.severity.to_string(),
            mismatch.kind.as_str().to_string(),
            mismatch.column.clone().unwrap_or_else(|| "-".to_string()),
            mismatch.original_value.clone(),
            mismatch.cleaned_value.clone(),
        ]);
    }
    table
}
