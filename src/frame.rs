//! Columnar table storage shared by the raw and cleaned snapshots of a file.
//!
//! A [`Table`] keeps one `Vec<Option<String>>` per column, every column
//! index-aligned to the same row count. Construction through [`Table::new`]
//! rejects misaligned columns, so "same row count, same row order" between a
//! raw table and its cleaned counterpart can be checked by comparing
//! [`Table::row_count`] alone.

use std::collections::HashSet;

use crate::error::CleanError;

pub type Column = Vec<Option<String>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    columns: Vec<Column>,
    row_count: usize,
}

/// The table as loaded from disk; the audit baseline.
pub type RawTable = Table;
/// The normalized table keyed by sanitized headers.
pub type CleanedTable = Table;

impl Table {
    pub fn new(headers: Vec<String>, columns: Vec<Column>) -> Result<Self, CleanError> {
        let row_count = columns.first().map(Vec::len).unwrap_or(0);
        Self::with_row_count(headers, columns, row_count)
    }

    /// Like [`Table::new`], but with the row count stated up front so a table
    /// without columns still keeps its rows.
    pub fn with_row_count(
        headers: Vec<String>,
        columns: Vec<Column>,
        row_count: usize,
    ) -> Result<Self, CleanError> {
        if headers.len() != columns.len() {
            return Err(CleanError::HeaderCount {
                headers: headers.len(),
                columns: columns.len(),
            });
        }
        for (header, column) in headers.iter().zip(&columns) {
            if column.len() != row_count {
                return Err(CleanError::MisalignedColumn {
                    column: header.clone(),
                    expected: row_count,
                    actual: column.len(),
                });
            }
        }
        Ok(Self {
            headers,
            columns,
            row_count,
        })
    }

    /// Builds a table from row-major records.
    ///
    /// Rows wider than the header row append columns with empty header names;
    /// shorter rows leave the missing cells as `None`. Present fields are kept
    /// verbatim, including empty strings.
    pub fn from_rows(mut headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = rows
            .iter()
            .map(Vec::len)
            .max()
            .unwrap_or(0)
            .max(headers.len());
        headers.resize(width, String::new());
        let mut columns: Vec<Column> = (0..width)
            .map(|_| Vec::with_capacity(rows.len()))
            .collect();
        let row_count = rows.len();
        for row in rows {
            let mut fields = row.into_iter();
            for column in &mut columns {
                column.push(fields.next());
            }
        }
        Self {
            headers,
            columns,
            row_count,
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, index: usize) -> Option<&[Option<String>]> {
        self.columns.get(index).map(Vec::as_slice)
    }

    pub fn column_by_name(&self, name: &str) -> Option<&[Option<String>]> {
        self.headers
            .iter()
            .position(|header| header == name)
            .and_then(|idx| self.column(idx))
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn null_count(&self, index: usize) -> usize {
        self.column(index)
            .map(|column| column.iter().filter(|cell| cell.is_none()).count())
            .unwrap_or(0)
    }

    pub fn distinct_count(&self, index: usize) -> usize {
        self.column(index)
            .map(|column| {
                column
                    .iter()
                    .flatten()
                    .map(String::as_str)
                    .collect::<HashSet<_>>()
                    .len()
            })
            .unwrap_or(0)
    }

    /// Row `index` as borrowed cells, in column order.
    pub fn row(&self, index: usize) -> Option<Vec<Option<&str>>> {
        (index < self.row_count).then(|| {
            self.columns
                .iter()
                .map(|column| column[index].as_deref())
                .collect()
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = Vec<Option<&str>>> + '_ {
        (0..self.row_count).filter_map(|idx| self.row(idx))
    }

    /// Treats empty fields as nulls, the convention for re-reading a cleaned file.
    pub fn with_blank_as_null(mut self) -> Self {
        for column in &mut self.columns {
            for cell in column.iter_mut() {
                if cell.as_deref().is_some_and(str::is_empty) {
                    *cell = None;
                }
            }
        }
        self
    }
}
