//! Typed request records read from the store

use serde::Serialize;

use crate::columns::ColumnMap;
use crate::table::Table;

/// One row of the shared request table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestRecord {
    /// Tracking identifier as stored, trimmed
    pub id: String,

    /// Approval state exactly as stored; compare with `trim()`
    pub state: String,

    /// Per-row delivery URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorize: Option<String>,

    /// Free-text reason recorded by a reviewer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl RequestRecord {
    /// Build a record from a table row using resolved columns
    pub fn from_row(table: &Table, row: usize, columns: &ColumnMap) -> Self {
        Self {
            id: table.cell(row, columns.id).trim().to_string(),
            state: table.cell(row, columns.state).to_string(),
            authorize: optional_cell(table, row, columns.authorize),
            reason: optional_cell(table, row, columns.reason),
        }
    }
}

fn optional_cell(table: &Table, row: usize, column: Option<usize>) -> Option<String> {
    column
        .map(|c| table.cell(row, c).trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
