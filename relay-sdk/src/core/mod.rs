//! Core abstractions for the Relay SDK
//!
//! - `ServiceClient`: naming and health for every external client
//! - `WebhookTransport`: delivers a JSON document to a URL
//! - `ValuesReader`: reads a rectangular range of cells from a spreadsheet
//! - `ClientBuilder`: builder for the underlying HTTP client

pub mod builder;
pub use builder::ClientBuilder;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::services::sheets::ValueRange;
use crate::services::webhook::DeliveryReceipt;

/// Base trait for all service clients
pub trait ServiceClient: Send + Sync {
    /// The client name/identifier
    fn name(&self) -> &str;

    /// The base URL for the service, if it has a fixed one
    fn base_url(&self) -> Option<&str>;
}

/// Delivers JSON documents to webhook endpoints
#[async_trait]
pub trait WebhookTransport: Send + Sync {
    /// POST `body` to `url`, retrying within the configured bound
    ///
    /// Succeeds on the first 2xx answer. On final failure the error carries
    /// the truncated detail and an `attempts` context value.
    async fn deliver(&self, url: &str, body: &Value) -> Result<DeliveryReceipt>;
}

/// Reads cell ranges from a spreadsheet
#[async_trait]
pub trait ValuesReader: Send + Sync {
    /// Read every populated row of `worksheet` in `spreadsheet_id`
    async fn read_values(&self, spreadsheet_id: &str, worksheet: &str) -> Result<ValueRange>;
}
