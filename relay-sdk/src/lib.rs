//! # Relay SDK
//!
//! External service plumbing for the decision relay.
//!
//! This crate provides:
//!
//! - A webhook client that posts JSON documents with bounded retries
//! - A Google Sheets values client for the shared request table
//! - An error system with HTTP response mapping and attached context
//! - Retry with exponential backoff
//! - Configuration providers (environment, in-memory, composite)
//!
//! ## Architecture
//!
//! - `WebhookTransport`: delivers a decision document to a URL
//! - `ValuesReader`: reads worksheet cells
//! - `RetryExecutor`: bounded retry with `factor^n` second delays
//! - `RelayError`: error taxonomy shared by every client

pub mod core;
pub use crate::core::{ClientBuilder, ServiceClient, ValuesReader, WebhookTransport};

pub mod services;
pub use crate::services::{sheets, webhook};

pub mod error;
pub use crate::error::{ErrorContext, RelayError, Result};

pub mod resilience;
pub use crate::resilience::{RetryConfig, RetryExecutor, Sleeper, TokioSleeper};

pub mod config;
pub use crate::config::{ConfigProvider, ConfigProviderExt, ServiceConfig};

pub mod util;

#[cfg(test)]
mod tests;

/// Create a webhook client from configuration
pub fn webhook_client(config: config::WebhookConfig) -> Result<webhook::WebhookClient> {
    webhook::WebhookClient::new(config)
}

/// Create a sheets client from configuration
pub fn sheets_client(config: config::SheetsConfig) -> Result<sheets::SheetsClient> {
    sheets::SheetsClient::new(config)
}
