//! Logical column names and their resolution against a table header

use serde::{Deserialize, Serialize};

use crate::errors::{StoreError, StoreResult};
use crate::table::Table;

/// Candidate header names for each logical column, in priority order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnNames {
    pub id: Vec<String>,
    pub state: Vec<String>,
    pub authorize: Vec<String>,
    pub reason: Vec<String>,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            id: strings(&["id", "request_id", "ticket_id"]),
            state: strings(&["state"]),
            authorize: strings(&["authorize", "authorization", "webhook_url"]),
            reason: strings(&["reason", "reason_for_refusal"]),
        }
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

/// Column indexes resolved for one table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub id: usize,
    pub state: usize,
    pub authorize: Option<usize>,
    pub reason: Option<usize>,
}

impl ColumnMap {
    /// Resolve every logical column; identifier and state are required
    pub fn resolve(table: &Table, names: &ColumnNames) -> StoreResult<Self> {
        Ok(Self {
            id: required(table, "id", &names.id)?,
            state: required(table, "state", &names.state)?,
            authorize: table.column_index_any(&names.authorize),
            reason: table.column_index_any(&names.reason),
        })
    }
}

fn required(table: &Table, logical: &str, candidates: &[String]) -> StoreResult<usize> {
    table
        .column_index_any(candidates)
        .ok_or_else(|| StoreError::MissingColumn {
            logical: logical.to_string(),
            tried: candidates.join(", "),
            available: table.headers().join(", "),
        })
}
