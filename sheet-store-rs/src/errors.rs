//! Error handling for the sheet store

use std::path::PathBuf;

use relay_sdk::RelayError;
use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised while reading the shared request table
#[derive(Error, Debug)]
pub enum StoreError {
    /// A required logical column has no matching header
    #[error("Required column '{logical}' not found (tried {tried}); available headers: {available}")]
    MissingColumn {
        logical: String,
        tried: String,
        available: String,
    },

    /// The remote source could not be read
    #[error("Store unavailable: {0}")]
    Source(#[from] RelayError),

    /// A local table document could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A table document did not have the expected shape
    #[error("Malformed table document: {0}")]
    Malformed(String),

    /// The source has no table for the requested sheet
    #[error("Unknown sheet: {0}")]
    UnknownSheet(String),
}

impl StoreError {
    /// Whether the error points at store configuration rather than availability
    pub fn is_configuration(&self) -> bool {
        match self {
            StoreError::MissingColumn { .. } | StoreError::UnknownSheet(_) => true,
            StoreError::Source(err) => matches!(err.root(), RelayError::Configuration(_)),
            _ => false,
        }
    }
}
