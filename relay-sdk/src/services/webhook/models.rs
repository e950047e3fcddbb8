//! Data models for webhook delivery

use serde::{Deserialize, Serialize};

/// Outcome of a successful delivery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReceipt {
    /// HTTP status of the accepting response
    pub status: u16,

    /// Attempts used, including the successful one
    pub attempts: u32,

    /// Response body cut to the configured detail limit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_excerpt: Option<String>,

    /// `X-Request-Id` sent with every attempt of this delivery
    pub request_id: String,
}
