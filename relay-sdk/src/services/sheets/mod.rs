//! Google Sheets values client
//!
//! Reads whole worksheets through
//! `GET {base}/v4/spreadsheets/{id}/values/{worksheet}`.

mod models;
pub use models::*;

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use url::Url;

use crate::config::{ServiceConfig, SheetsConfig, DEFAULT_DETAIL_LIMIT};
use crate::core::{ClientBuilder, ServiceClient, ValuesReader};
use crate::error::{RelayError, Result};
use crate::services::common::parse_error_response;
use crate::util::sanitize_for_logging;

/// Sheets values client
#[derive(Debug, Clone)]
pub struct SheetsClient {
    http_client: Client,
    config: SheetsConfig,
}

impl SheetsClient {
    /// Create a new sheets client from configuration
    pub fn new(config: SheetsConfig) -> Result<Self> {
        config.validate()?;

        let http_client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build_http_client()?;

        Ok(Self {
            http_client,
            config,
        })
    }

    /// Build the values URL for a worksheet
    pub fn values_url(&self, spreadsheet_id: &str, worksheet: &str) -> Result<Url> {
        let mut url = Url::parse(&self.config.base_url).map_err(|e| {
            RelayError::configuration(format!("Invalid Sheets base URL: {}", e))
        })?;

        url.path_segments_mut()
            .map_err(|_| RelayError::configuration("Sheets base URL cannot be a base"))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", spreadsheet_id, "values", worksheet]);

        if let Some(ref key) = self.config.api_key {
            url.query_pairs_mut().append_pair("key", key);
        }

        Ok(url)
    }
}

impl ServiceClient for SheetsClient {
    fn name(&self) -> &str {
        "sheets"
    }

    fn base_url(&self) -> Option<&str> {
        Some(&self.config.base_url)
    }
}

#[async_trait]
impl ValuesReader for SheetsClient {
    async fn read_values(&self, spreadsheet_id: &str, worksheet: &str) -> Result<ValueRange> {
        if spreadsheet_id.trim().is_empty() || worksheet.trim().is_empty() {
            return Err(RelayError::configuration(
                "Spreadsheet id and worksheet name are required",
            ));
        }

        let url = self.values_url(spreadsheet_id, worksheet)?;
        let endpoint = sanitize_for_logging(url.as_str());
        debug!("Reading sheet values: GET {}", endpoint);

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(RelayError::from)?;

        if !response.status().is_success() {
            return Err(parse_error_response(
                self.name(),
                &endpoint,
                response,
                None,
                DEFAULT_DETAIL_LIMIT,
            )
            .await);
        }

        response
            .json::<ValueRange>()
            .await
            .map_err(|e| RelayError::parsing(format!("Failed to parse sheet values: {}", e)))
    }
}
