//! State gate: a decision may only be submitted while the request is in one
//! of the allowed states

use sheet_store::RequestRecord;
use thiserror::Error;

/// Gating failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GateError {
    #[error("Request '{id}' was not found in the store")]
    NotFound { id: String },

    #[error("Request '{id}' is in state '{observed}'; decisions require one of: {allowed}")]
    Disallowed {
        id: String,
        /// The state exactly as stored
        observed: String,
        allowed: String,
    },
}

impl GateError {
    /// The observed state, when the row existed
    pub fn observed_state(&self) -> Option<&str> {
        match self {
            GateError::Disallowed { observed, .. } => Some(observed),
            GateError::NotFound { .. } => None,
        }
    }
}

/// Allowed-state check, compared case-insensitively after trimming
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateGate {
    allowed: Vec<String>,
}

impl StateGate {
    /// A gate over `allowed`; `None` when the list has no non-blank values
    pub fn new<I, S>(allowed: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed: Vec<String> = allowed
            .into_iter()
            .map(|s| s.as_ref().trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        if allowed.is_empty() {
            None
        } else {
            Some(Self { allowed })
        }
    }

    pub fn allowed(&self) -> &[String] {
        &self.allowed
    }

    pub fn permits(&self, state: &str) -> bool {
        let state = state.trim().to_lowercase();
        self.allowed.iter().any(|a| a.to_lowercase() == state)
    }

    /// Check the looked-up row; returns the trimmed state on success
    pub fn check(&self, id: &str, record: Option<&RequestRecord>) -> Result<String, GateError> {
        let record = record.ok_or_else(|| GateError::NotFound {
            id: id.to_string(),
        })?;

        if self.permits(&record.state) {
            Ok(record.state.trim().to_string())
        } else {
            Err(GateError::Disallowed {
                id: id.to_string(),
                observed: record.state.clone(),
                allowed: self.allowed.join(", "),
            })
        }
    }
}
