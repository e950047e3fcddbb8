//! Configuration management for service clients
//!
//! This module provides utilities for loading and validating configuration
//! for the webhook and sheets clients, with support for environment variables
//! and `.env` files.

use std::collections::HashMap;
use std::env;
use std::fmt::Debug;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{RelayError, Result};
use crate::resilience::{RetryConfig, DEFAULT_BACKOFF_FACTOR, DEFAULT_MAX_ATTEMPTS};

/// Environment variable prefix used by the default provider
pub const ENV_PREFIX: &str = "DECISION_RELAY";

/// Default number of characters of diagnostic detail surfaced to callers
pub const DEFAULT_DETAIL_LIMIT: usize = 200;

/// Base trait for configuration providers
pub trait ConfigProvider: Send + Sync {
    /// Get a string configuration value
    fn get_string(&self, key: &str) -> Result<String>;

    /// Get a string configuration value, `None` when the key is absent or blank
    fn get_optional(&self, key: &str) -> Option<String> {
        self.get_string(key)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

/// Extension methods for configuration providers
pub trait ConfigProviderExt: ConfigProvider {
    /// Get a typed configuration value by parsing from string
    fn get_parsed<T>(&self, key: &str) -> Result<T>
    where
        T: FromStr,
        <T as FromStr>::Err: std::fmt::Display,
    {
        let value = self.get_string(key)?;
        value.trim().parse::<T>().map_err(|e| {
            RelayError::configuration(format!("Invalid value for key {}: {}", key, e))
        })
    }

    /// Get a typed value, falling back to `default` only when the key is absent
    ///
    /// A present but malformed value is an error.
    fn get_parsed_or<T>(&self, key: &str, default: T) -> Result<T>
    where
        T: FromStr,
        <T as FromStr>::Err: std::fmt::Display,
    {
        match self.get_optional(key) {
            Some(_) => self.get_parsed(key),
            None => Ok(default),
        }
    }

    /// Get a string configuration value with a default
    fn get_string_or(&self, key: &str, default: &str) -> String {
        self.get_optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Get a comma-separated list, trimmed, blanks dropped
    fn get_list(&self, key: &str) -> Option<Vec<String>> {
        self.get_optional(key).map(|value| {
            value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
    }
}

impl<T: ConfigProvider + ?Sized> ConfigProviderExt for T {}

/// Environment variable based configuration provider
#[derive(Debug, Clone, Default)]
pub struct EnvConfigProvider {
    /// Optional prefix for environment variables
    prefix: Option<String>,

    /// Optional namespace for variables (e.g., "OWNER", "ADMIN")
    namespace: Option<String>,
}

impl EnvConfigProvider {
    /// Create a new environment variable config provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a prefix for environment variables
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Set a namespace for environment variables
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Format a configuration key as an environment variable
    pub fn format_key(&self, key: &str) -> String {
        let mut env_key = String::new();

        if let Some(ref prefix) = self.prefix {
            env_key.push_str(&normalize_key(prefix));
            env_key.push('_');
        }

        if let Some(ref namespace) = self.namespace {
            env_key.push_str(&normalize_key(namespace));
            env_key.push('_');
        }

        env_key.push_str(&normalize_key(key));
        env_key
    }
}

fn normalize_key(key: &str) -> String {
    key.to_uppercase()
        .replace(|c: char| !c.is_ascii_alphanumeric(), "_")
}

impl ConfigProvider for EnvConfigProvider {
    fn get_string(&self, key: &str) -> Result<String> {
        let env_key = self.format_key(key);

        env::var(&env_key).map_err(|e| match e {
            env::VarError::NotPresent => RelayError::configuration(format!(
                "Environment variable not set: {}",
                env_key
            )),
            env::VarError::NotUnicode(_) => RelayError::configuration(format!(
                "Environment variable is not valid unicode: {}",
                env_key
            )),
        })
    }
}

/// In-memory config provider for testing or static configuration
#[derive(Debug, Clone, Default)]
pub struct MemoryConfigProvider {
    values: HashMap<String, String>,
}

impl MemoryConfigProvider {
    /// Create a new empty memory config provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a configuration value
    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: ToString,
    {
        self.values.insert(key.into(), value.to_string());
    }
}

impl ConfigProvider for MemoryConfigProvider {
    fn get_string(&self, key: &str) -> Result<String> {
        self.values.get(key).cloned().ok_or_else(|| {
            RelayError::configuration(format!("Configuration key not found: {}", key))
        })
    }
}

/// A composite config provider that tries multiple providers in order
#[derive(Default)]
pub struct CompositeConfigProvider {
    providers: Vec<Box<dyn ConfigProvider>>,
}

impl CompositeConfigProvider {
    /// Create a new composite config provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a provider to the end of the chain
    pub fn add_provider(&mut self, provider: impl ConfigProvider + 'static) {
        self.providers.push(Box::new(provider));
    }

    /// Add a provider and return self (builder pattern)
    pub fn with_provider(mut self, provider: impl ConfigProvider + 'static) -> Self {
        self.add_provider(provider);
        self
    }
}

impl ConfigProvider for CompositeConfigProvider {
    fn get_string(&self, key: &str) -> Result<String> {
        self.providers
            .iter()
            .find_map(|provider| provider.get_string(key).ok())
            .ok_or_else(|| {
                RelayError::configuration(format!(
                    "Configuration key not found in any provider: {}",
                    key
                ))
            })
    }
}

/// Load a `.env` file from the working directory if one exists
pub fn load_dotenv() {
    match dotenv::dotenv() {
        Ok(path) => log::debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => log::warn!("Failed to load .env file: {}", e),
    }
}

/// Trait for service-specific configuration
pub trait ServiceConfig: Debug + Send + Sync {
    /// Validate this configuration
    fn validate(&self) -> Result<()>;

    /// Service name
    fn service_name(&self) -> &str;
}

/// Configuration for webhook delivery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// Per-attempt timeout in seconds
    pub timeout_seconds: u64,

    /// Maximum attempts, including the first
    pub max_attempts: u32,

    /// Exponential backoff factor; the delay before retry n is factor^n seconds
    pub backoff_factor: f64,

    /// Characters of response body or error text kept as diagnostic detail
    pub detail_limit: usize,

    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 8,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_factor: DEFAULT_BACKOFF_FACTOR,
            detail_limit: DEFAULT_DETAIL_LIMIT,
            user_agent: format!("decision-relay/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl WebhookConfig {
    /// Load configuration from a config provider, starting from `base`
    pub fn from_provider<P: ConfigProvider + ?Sized>(provider: &P, base: Self) -> Result<Self> {
        let config = Self {
            timeout_seconds: provider.get_parsed_or("timeout_seconds", base.timeout_seconds)?,
            max_attempts: provider.get_parsed_or("max_attempts", base.max_attempts)?,
            backoff_factor: provider.get_parsed_or("backoff_factor", base.backoff_factor)?,
            detail_limit: provider.get_parsed_or("detail_limit", base.detail_limit)?,
            user_agent: provider.get_string_or("user_agent", &base.user_agent),
        };

        config.validate()?;
        Ok(config)
    }

    /// The retry policy described by this configuration
    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::with_factor(self.max_attempts, self.backoff_factor)
    }
}

impl ServiceConfig for WebhookConfig {
    fn validate(&self) -> Result<()> {
        if self.timeout_seconds == 0 {
            return Err(RelayError::configuration("Webhook timeout must be positive"));
        }

        if self.max_attempts == 0 {
            return Err(RelayError::configuration("At least one delivery attempt is required"));
        }

        if !(self.backoff_factor.is_finite() && self.backoff_factor >= 1.0) {
            return Err(RelayError::configuration(format!(
                "Backoff factor must be a finite number >= 1.0, got {}",
                self.backoff_factor
            )));
        }

        if self.detail_limit == 0 {
            return Err(RelayError::configuration("Detail limit must be positive"));
        }

        Ok(())
    }

    fn service_name(&self) -> &str {
        "webhook"
    }
}

/// Configuration for the Google Sheets values API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetsConfig {
    /// Base URL (can be changed for proxies and tests)
    pub base_url: String,

    /// API key sent as the `key` query parameter
    pub api_key: Option<String>,

    /// Timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://sheets.googleapis.com".to_string(),
            api_key: None,
            timeout_seconds: 15,
        }
    }
}

impl SheetsConfig {
    /// Load configuration from a config provider
    pub fn from_provider<P: ConfigProvider + ?Sized>(provider: &P) -> Result<Self> {
        let defaults = Self::default();
        let config = Self {
            base_url: provider.get_string_or("sheets_base_url", &defaults.base_url),
            api_key: provider.get_optional("sheets_api_key"),
            timeout_seconds: provider
                .get_parsed_or("sheets_timeout_seconds", defaults.timeout_seconds)?,
        };

        config.validate()?;
        Ok(config)
    }
}

impl ServiceConfig for SheetsConfig {
    fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(RelayError::configuration("Sheets base URL is required"));
        }

        url::Url::parse(&self.base_url).map_err(|e| {
            RelayError::configuration(format!("Invalid Sheets base URL {}: {}", self.base_url, e))
        })?;

        if self.timeout_seconds == 0 {
            return Err(RelayError::configuration("Sheets timeout must be positive"));
        }

        Ok(())
    }

    fn service_name(&self) -> &str {
        "sheets"
    }
}
