//! Data models for the Google Sheets values API

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A range of cell values as returned by `spreadsheets.values.get`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    /// The A1 range the values cover
    #[serde(default)]
    pub range: String,

    /// `ROWS` or `COLUMNS`
    #[serde(default = "default_major_dimension")]
    pub major_dimension: String,

    /// Cell values; trailing empty cells and rows are omitted by the API
    #[serde(default)]
    pub values: Vec<Vec<Value>>,
}

fn default_major_dimension() -> String {
    "ROWS".to_string()
}

impl ValueRange {
    /// Build a range from string rows
    pub fn from_rows<R, C>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Self {
            range: String::new(),
            major_dimension: default_major_dimension(),
            values: rows
                .into_iter()
                .map(|row| row.into_iter().map(|cell| Value::String(cell.into())).collect())
                .collect(),
        }
    }

    /// Cells rendered as text, row by row
    ///
    /// Numbers and booleans use their JSON text form; nulls become empty.
    pub fn text_rows(&self) -> Vec<Vec<String>> {
        self.values
            .iter()
            .map(|row| row.iter().map(cell_text).collect())
            .collect()
    }
}

fn cell_text(cell: &Value) -> String {
    match cell {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
