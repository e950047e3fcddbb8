//! Client builder implementation
//!
//! Provides a unified builder for the HTTP client shared by the webhook and
//! sheets clients.

use std::time::Duration;

use reqwest::Client as ReqwestClient;

use crate::error::{RelayError, Result};
use crate::resilience::{RetryConfig, RetryExecutor};

/// Unified client builder for all service clients
pub struct ClientBuilder {
    /// Request timeout
    timeout: Option<Duration>,

    /// Retry configuration
    retry_config: Option<RetryConfig>,

    /// User agent
    user_agent: Option<String>,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(8)),
            retry_config: Some(RetryConfig::default()),
            user_agent: Some(format!("decision-relay/{}", env!("CARGO_PKG_VERSION"))),
        }
    }
}

impl ClientBuilder {
    /// Create a new client builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Configure retry behavior
    pub fn retry_config(mut self, config: RetryConfig) -> Self {
        self.retry_config = Some(config);
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Build an HTTP client with the configured settings
    pub fn build_http_client(&self) -> Result<ReqwestClient> {
        let mut builder = ReqwestClient::builder();

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(ref user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent);
        }

        builder
            .build()
            .map_err(|e| RelayError::configuration(format!("Failed to build HTTP client: {}", e)))
    }

    /// Build a retry executor with the configured settings
    pub fn build_retry(&self) -> RetryExecutor {
        RetryExecutor::new(self.retry_config.clone().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_builds_client() {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(3))
            .user_agent("decision-relay/test")
            .build_http_client();
        assert!(client.is_ok());
    }

    #[test]
    fn test_build_retry_uses_config() {
        let retry = ClientBuilder::new()
            .retry_config(RetryConfig::with_factor(5, 2.0))
            .build_retry();
        assert_eq!(retry.config().max_attempts, 5);
    }
}
