//! Webhook client implementation
//!
//! Posts decision documents to automation endpoints. Each attempt uses the
//! same timeout; failures are retried with exponential backoff up to the
//! configured bound.

mod models;
pub use models::*;

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::Client;
use serde_json::Value;
use url::Url;

use crate::config::{ServiceConfig, WebhookConfig};
use crate::core::{ClientBuilder, ServiceClient, WebhookTransport};
use crate::error::{RelayError, Result};
use crate::resilience::{RetryExecutor, Sleeper};
use crate::services::common::{body_excerpt, parse_error_response};
use crate::util::{generate_request_id, sanitize_for_logging};

/// Header carrying the delivery id, constant across attempts
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Header carrying the 1-based attempt number
pub const ATTEMPT_HEADER: &str = "X-Delivery-Attempt";

/// Webhook client
#[derive(Debug, Clone)]
pub struct WebhookClient {
    http_client: Client,
    config: WebhookConfig,
    retry: RetryExecutor,
}

impl WebhookClient {
    /// Create a new webhook client from configuration
    pub fn new(config: WebhookConfig) -> Result<Self> {
        config.validate()?;

        let builder = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.clone())
            .retry_config(config.retry_config());

        Ok(Self {
            http_client: builder.build_http_client()?,
            retry: builder.build_retry(),
            config,
        })
    }

    /// Replace the sleeper used between attempts
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.retry = self.retry.with_sleeper(sleeper);
        self
    }

    /// The active configuration
    pub fn config(&self) -> &WebhookConfig {
        &self.config
    }

    async fn post_once(
        &self,
        url: &Url,
        body: &Value,
        request_id: &str,
        attempt: u32,
    ) -> Result<DeliveryReceipt> {
        let endpoint = sanitize_for_logging(url.as_str());
        debug!("POST {} (attempt {}, request {})", endpoint, attempt, request_id);

        let start_time = Instant::now();
        let response = self
            .http_client
            .post(url.clone())
            .header(REQUEST_ID_HEADER, request_id)
            .header(ATTEMPT_HEADER, attempt.to_string())
            .json(body)
            .send()
            .await
            .map_err(RelayError::from)?;

        let status = response.status();
        debug!(
            "Webhook answered {} in {:.2}ms",
            status,
            start_time.elapsed().as_secs_f64() * 1000.0
        );

        if status.is_success() {
            Ok(DeliveryReceipt {
                status: status.as_u16(),
                attempts: attempt,
                body_excerpt: body_excerpt(response, self.config.detail_limit).await,
                request_id: request_id.to_string(),
            })
        } else {
            Err(parse_error_response(
                self.name(),
                &endpoint,
                response,
                Some(request_id),
                self.config.detail_limit,
            )
            .await)
        }
    }
}

impl ServiceClient for WebhookClient {
    fn name(&self) -> &str {
        "webhook"
    }

    fn base_url(&self) -> Option<&str> {
        None
    }
}

#[async_trait]
impl WebhookTransport for WebhookClient {
    async fn deliver(&self, url: &str, body: &Value) -> Result<DeliveryReceipt> {
        let parsed = Url::parse(url.trim()).map_err(|e| {
            RelayError::invalid_request(format!("Invalid webhook URL: {}", e))
        })?;

        let request_id = generate_request_id();
        let result = self
            .retry
            .execute(|attempt| self.post_once(&parsed, body, &request_id, attempt))
            .await;

        match &result {
            Ok(receipt) => info!(
                "Delivered to {} with status {} after {} attempt(s)",
                sanitize_for_logging(parsed.as_str()),
                receipt.status,
                receipt.attempts
            ),
            Err(e) => warn!(
                "{} delivery to {} failed: {}",
                self.name(),
                sanitize_for_logging(parsed.as_str()),
                e
            ),
        }

        result
    }
}
