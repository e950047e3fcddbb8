//! Submission error taxonomy
//!
//! Every failure of a submission belongs to exactly one category. The
//! category decides how the failure is reported and which exit status the
//! command-line front end uses.

use std::fmt;

use relay_sdk::RelayError;
use sheet_store::StoreError;
use thiserror::Error;

use crate::gate::GateError;
use crate::validation::InputError;

/// Result type for submissions and lookups
pub type SubmissionResult<T> = Result<T, SubmissionError>;

/// Failure categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Input,
    Gate,
    Configuration,
    Delivery,
    Store,
}

impl ErrorCategory {
    /// Process exit status for this category
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorCategory::Input => 2,
            ErrorCategory::Gate => 3,
            ErrorCategory::Configuration => 4,
            ErrorCategory::Delivery => 5,
            ErrorCategory::Store => 6,
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCategory::Input => "input",
            ErrorCategory::Gate => "gate",
            ErrorCategory::Configuration => "configuration",
            ErrorCategory::Delivery => "delivery",
            ErrorCategory::Store => "store",
        };
        f.write_str(name)
    }
}

/// Failure of one submission or lookup
#[derive(Error, Debug)]
pub enum SubmissionError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Gate(#[from] GateError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Delivery to {target} failed after {attempts} attempt(s): {detail}")]
    Delivery {
        target: String,
        /// Last error text or response body, truncated
        detail: String,
        attempts: u32,
        status: Option<u16>,
        /// Whether the outbox kept a copy of the payload
        kept_in_outbox: bool,
        /// Why the outbox could not keep a copy, when it was enabled
        outbox_error: Option<String>,
    },

    #[error("Store read failed: {0}")]
    Store(StoreError),
}

impl SubmissionError {
    pub fn configuration(message: impl fmt::Display) -> Self {
        SubmissionError::Configuration(message.to_string())
    }

    pub fn no_destination() -> Self {
        SubmissionError::Configuration("no destination configured".to_string())
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            SubmissionError::Input(_) => ErrorCategory::Input,
            SubmissionError::Gate(_) => ErrorCategory::Gate,
            SubmissionError::Configuration(_) => ErrorCategory::Configuration,
            SubmissionError::Delivery { .. } => ErrorCategory::Delivery,
            SubmissionError::Store(_) => ErrorCategory::Store,
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.category().exit_code()
    }
}

impl From<StoreError> for SubmissionError {
    fn from(err: StoreError) -> Self {
        if err.is_configuration() {
            SubmissionError::Configuration(err.to_string())
        } else {
            SubmissionError::Store(err)
        }
    }
}

impl From<RelayError> for SubmissionError {
    /// Client construction and config loading failures
    fn from(err: RelayError) -> Self {
        SubmissionError::Configuration(err.to_string())
    }
}
