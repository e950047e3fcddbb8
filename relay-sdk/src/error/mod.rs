//! Error handling for the Relay SDK
//!
//! This module provides the error system shared by the webhook and sheets
//! clients:
//! - Categorizes errors by type (network, timeout, HTTP status, etc.)
//! - Carries context (status code, endpoint, attempts) alongside the error
//! - Maps HTTP responses to normalized errors
//! - Provides convenient Result type alias

use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

pub mod mapping;

/// Result type for Relay SDK operations
pub type Result<T> = std::result::Result<T, RelayError>;

/// Main error type for the Relay SDK
#[derive(Error, Debug)]
pub enum RelayError {
    /// Network or connection errors
    #[error("Network error: {0}")]
    Network(String),

    /// Timeout errors
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// The endpoint answered with a non-2xx status
    #[error("HTTP status error: {0}")]
    HttpStatus(String),

    /// Request could not be built (bad URL, bad header)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Response parsing errors
    #[error("Parsing error: {0}")]
    Parsing(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Unexpected or internal errors
    #[error("Internal error: {0}")]
    Internal(String),

    /// Errors with additional context
    #[error("{inner}")]
    WithContext {
        inner: Box<RelayError>,
        context: ErrorContext,
    },
}

impl RelayError {
    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        RelayError::Network(message.into())
    }

    /// Create a timeout error
    pub fn timeout(message: impl Into<String>) -> Self {
        RelayError::Timeout(message.into())
    }

    /// Create an HTTP status error
    pub fn http_status(message: impl Into<String>) -> Self {
        RelayError::HttpStatus(message.into())
    }

    /// Create an invalid request error
    pub fn invalid_request(message: impl Into<String>) -> Self {
        RelayError::InvalidRequest(message.into())
    }

    /// Create a parsing error
    pub fn parsing(message: impl Into<String>) -> Self {
        RelayError::Parsing(message.into())
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        RelayError::Configuration(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        RelayError::Internal(message.into())
    }

    /// Add context to an existing error
    pub fn with_context(self, context: ErrorContext) -> Self {
        RelayError::WithContext {
            inner: Box::new(self),
            context,
        }
    }

    /// Add a single context key/value to an existing error
    pub fn with_context_value(self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        match self {
            RelayError::WithContext { inner, mut context } => {
                context.add(key, value);
                RelayError::WithContext { inner, context }
            }
            other => {
                let mut context = ErrorContext::new();
                context.add(key, value);
                other.with_context(context)
            }
        }
    }

    /// The error without any context wrappers
    pub fn root(&self) -> &RelayError {
        match self {
            RelayError::WithContext { inner, .. } => inner.root(),
            other => other,
        }
    }

    /// The context attached to this error, if any
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            RelayError::WithContext { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Get the service name if available
    pub fn service_name(&self) -> Option<&str> {
        self.context().map(|c| c.service.as_str())
    }

    /// Get the HTTP status code if available
    pub fn status_code(&self) -> Option<u16> {
        match self {
            RelayError::WithContext { inner, context } => {
                context.status_code.or_else(|| inner.status_code())
            }
            _ => None,
        }
    }

    /// Get a context data value if available
    pub fn context_value(&self, key: &str) -> Option<&str> {
        match self {
            RelayError::WithContext { inner, context } => context
                .data
                .get(key)
                .map(String::as_str)
                .or_else(|| inner.context_value(key)),
            _ => None,
        }
    }

    /// The message of the underlying error, without the category prefix
    pub fn detail(&self) -> &str {
        match self.root() {
            RelayError::Network(m)
            | RelayError::Timeout(m)
            | RelayError::HttpStatus(m)
            | RelayError::InvalidRequest(m)
            | RelayError::Parsing(m)
            | RelayError::Configuration(m)
            | RelayError::Internal(m) => m,
            RelayError::WithContext { .. } => "",
        }
    }

    /// Check if this is a retryable error
    ///
    /// Every delivery failure counts: connection problems, timeouts and any
    /// non-2xx answer.
    pub fn is_retryable(&self) -> bool {
        match self {
            RelayError::Network(_) => true,
            RelayError::Timeout(_) => true,
            RelayError::HttpStatus(_) => true,
            RelayError::WithContext { inner, .. } => inner.is_retryable(),
            _ => false,
        }
    }
}

/// Error context information
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// Service that generated the error
    pub service: String,

    /// Time the error was recorded
    pub timestamp: Option<chrono::DateTime<chrono::Utc>>,

    /// HTTP status code if applicable
    pub status_code: Option<u16>,

    /// Request ID sent with the request
    pub request_id: Option<String>,

    /// Endpoint that was called
    pub endpoint: Option<String>,

    /// Additional context data
    pub data: HashMap<String, String>,
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self {
            service: "unknown".to_string(),
            timestamp: Some(chrono::Utc::now()),
            status_code: None,
            request_id: None,
            endpoint: None,
            data: HashMap::new(),
        }
    }
}

impl ErrorContext {
    /// Create a new error context
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new error context for a specific service
    pub fn for_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            ..Self::default()
        }
    }

    /// Add an HTTP status code
    pub fn status_code(mut self, code: u16) -> Self {
        self.status_code = Some(code);
        self
    }

    /// Add a request ID
    pub fn request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    /// Add an endpoint
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Add a context value
    pub fn add<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: fmt::Display,
    {
        self.data.insert(key.into(), value.to_string());
    }
}

/// Convert reqwest errors to RelayError
impl From<reqwest::Error> for RelayError {
    fn from(err: reqwest::Error) -> Self {
        let context = ErrorContext::for_service("http_client");

        let relay_error = if err.is_timeout() {
            RelayError::timeout(format!("Request timed out: {}", err))
        } else if err.is_connect() {
            RelayError::network(format!("Connection error: {}", err))
        } else if err.is_builder() {
            RelayError::invalid_request(format!("Invalid request: {}", err))
        } else if err.is_redirect() {
            RelayError::network(format!("Too many redirects: {}", err))
        } else if err.is_decode() {
            RelayError::parsing(format!("Response decode error: {}", err))
        } else if err.is_request() || err.is_body() {
            RelayError::network(format!("Request failed: {}", err))
        } else {
            RelayError::internal(format!("HTTP client error: {}", err))
        };

        if let Some(status) = err.status() {
            relay_error.with_context(context.status_code(status.as_u16()))
        } else {
            relay_error.with_context(context)
        }
    }
}

/// Convert serde_json errors to RelayError
impl From<serde_json::Error> for RelayError {
    fn from(err: serde_json::Error) -> Self {
        RelayError::parsing(format!("JSON error: {}", err))
            .with_context(ErrorContext::for_service("json"))
    }
}
