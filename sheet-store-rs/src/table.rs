//! In-memory table with tolerant column lookup
//!
//! Header matching is case-insensitive and ignores surrounding whitespace, so
//! `" STATE "`, `"State"` and `"state"` all name the same column.

use relay_sdk::sheets::ValueRange;

/// A header row plus data rows of text cells
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Create a table; rows shorter than the header are padded with empty cells
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                if row.len() < width {
                    row.resize(width, String::new());
                }
                row
            })
            .collect();

        Self { headers, rows }
    }

    /// Create a table whose first row is the header
    pub fn from_rows(rows: Vec<Vec<String>>) -> Self {
        let mut rows = rows.into_iter();
        match rows.next() {
            Some(headers) => Self::new(headers, rows.collect()),
            None => Self::default(),
        }
    }

    /// Create a table from a Sheets values range
    pub fn from_value_range(range: &ValueRange) -> Self {
        Self::from_rows(range.text_rows())
    }

    /// Header cells as they appear in the store
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Data rows
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no data rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the header matching `wanted`
    pub fn column_index(&self, wanted: &str) -> Option<usize> {
        let wanted = normalize(wanted);
        if wanted.is_empty() {
            return None;
        }
        self.headers.iter().position(|h| normalize(h) == wanted)
    }

    /// Actual header for the logical column name `wanted`
    pub fn resolve_column(&self, wanted: &str) -> Option<&str> {
        self.column_index(wanted).map(|i| self.headers[i].as_str())
    }

    /// Index of the first candidate, in candidate order, that names a header
    pub fn column_index_any<S: AsRef<str>>(&self, candidates: &[S]) -> Option<usize> {
        candidates
            .iter()
            .find_map(|candidate| self.column_index(candidate.as_ref()))
    }

    /// Actual header for the first candidate that matches
    pub fn resolve_any<S: AsRef<str>>(&self, candidates: &[S]) -> Option<&str> {
        self.column_index_any(candidates)
            .map(|i| self.headers[i].as_str())
    }

    /// Cell text, empty when the row or column is out of range
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// Trimmed, lower-cased form used for header and key comparison
pub fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}
