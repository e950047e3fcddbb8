//! Relay configuration
//!
//! Keys are read through a `ConfigProvider`. With the default environment
//! provider every key carries the `DECISION_RELAY_` prefix, and a flow
//! namespace (`DECISION_RELAY_OWNER_MAX_ATTEMPTS`) takes precedence over the
//! shared key (`DECISION_RELAY_MAX_ATTEMPTS`).

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use decision_outbox::{Outbox, OutboxConfig};
use log::{debug, info};
use relay_sdk::config::{
    CompositeConfigProvider, EnvConfigProvider, SheetsConfig, WebhookConfig, ENV_PREFIX,
};
use relay_sdk::{ConfigProvider, ConfigProviderExt, ServiceConfig};
use sheet_store::{
    ColumnNames, JsonFileSource, SheetKey, SheetStore, SheetsApiSource, TableSource,
    DEFAULT_CACHE_TTL,
};

use crate::error::{SubmissionError, SubmissionResult};
use crate::flow::{FlowKind, FlowProfile};

/// Where the request table lives and how it is read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSettings {
    pub key: SheetKey,
    pub cache_ttl: Duration,
    pub columns: ColumnNames,
    /// Read values documents from this directory instead of the Sheets API
    pub table_dir: Option<PathBuf>,
}

impl StoreSettings {
    /// Store settings, or `None` when no spreadsheet is configured
    pub fn from_provider<P: ConfigProvider + ?Sized>(
        provider: &P,
    ) -> SubmissionResult<Option<Self>> {
        let spreadsheet_id = provider.get_optional("spreadsheet_id");
        let worksheet = provider.get_optional("worksheet");

        let (spreadsheet_id, worksheet) = match (spreadsheet_id, worksheet) {
            (Some(id), Some(ws)) => (id, ws),
            (None, None) => return Ok(None),
            (Some(_), None) => {
                return Err(SubmissionError::configuration(
                    "spreadsheet_id is set but worksheet is missing",
                ))
            }
            (None, Some(_)) => {
                return Err(SubmissionError::configuration(
                    "worksheet is set but spreadsheet_id is missing",
                ))
            }
        };

        let defaults = ColumnNames::default();
        let columns = ColumnNames {
            id: provider.get_list("id_columns").unwrap_or(defaults.id),
            state: provider.get_list("state_columns").unwrap_or(defaults.state),
            authorize: provider
                .get_list("authorize_columns")
                .unwrap_or(defaults.authorize),
            reason: provider.get_list("reason_columns").unwrap_or(defaults.reason),
        };

        let cache_ttl = Duration::from_secs(
            provider.get_parsed_or("cache_ttl_seconds", DEFAULT_CACHE_TTL.as_secs())?,
        );

        Ok(Some(Self {
            key: SheetKey::new(spreadsheet_id, worksheet),
            cache_ttl,
            columns,
            table_dir: provider.get_optional("table_dir").map(PathBuf::from),
        }))
    }
}

/// Complete configuration for one flow
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub profile: FlowProfile,
    pub webhook: WebhookConfig,
    pub sheets: SheetsConfig,
    pub store: Option<StoreSettings>,
    /// Used verbatim when no other destination resolves
    pub fallback_url: Option<String>,
    /// `None` disables the outbox
    pub outbox: Option<OutboxConfig>,
}

impl RelayConfig {
    /// Load configuration for `kind` from `provider`
    pub fn from_provider<P: ConfigProvider + ?Sized>(
        kind: FlowKind,
        provider: &P,
    ) -> SubmissionResult<Self> {
        let profile = FlowProfile::from_provider(kind, provider)?;

        let webhook = WebhookConfig::from_provider(
            provider,
            WebhookConfig {
                timeout_seconds: profile.timeout_seconds,
                ..WebhookConfig::default()
            },
        )?;

        let config = Self {
            webhook,
            sheets: SheetsConfig::from_provider(provider)?,
            store: StoreSettings::from_provider(provider)?,
            fallback_url: provider.get_optional("fallback_webhook_url"),
            outbox: OutboxConfig::from_provider(provider),
            profile,
        };

        config.validate()?;
        debug!("Loaded {} flow configuration", kind);
        Ok(config)
    }

    /// Load from the environment: flow namespace first, then shared keys
    pub fn from_env(kind: FlowKind) -> SubmissionResult<Self> {
        Self::from_provider(kind, &env_provider(kind))
    }

    /// Cross-field checks
    pub fn validate(&self) -> SubmissionResult<()> {
        if self.profile.gate().is_some() && self.store.is_none() {
            return Err(SubmissionError::configuration(format!(
                "the {} flow gates on state but no spreadsheet_id/worksheet is configured",
                self.profile.kind
            )));
        }

        if let Some(fallback) = &self.fallback_url {
            url::Url::parse(fallback).map_err(|e| {
                SubmissionError::configuration(format!(
                    "fallback_webhook_url is not a valid URL: {}",
                    e
                ))
            })?;
        }

        Ok(())
    }

    /// Build the store described by this configuration
    pub fn build_store(&self) -> SubmissionResult<Option<Arc<SheetStore>>> {
        let settings = match &self.store {
            Some(settings) => settings,
            None => return Ok(None),
        };

        let source: Arc<dyn TableSource> = match &settings.table_dir {
            Some(dir) => {
                info!("Reading request table from {}", dir.display());
                Arc::new(JsonFileSource::new(dir.clone()))
            }
            None => {
                self.sheets.validate()?;
                let client = relay_sdk::sheets_client(self.sheets.clone())?;
                Arc::new(SheetsApiSource::new(Arc::new(client)))
            }
        };

        let store = SheetStore::new(source, settings.key.clone(), settings.cache_ttl)
            .with_columns(settings.columns.clone());
        Ok(Some(Arc::new(store)))
    }

    /// Build the outbox, if enabled
    pub fn build_outbox(&self) -> Option<Arc<Outbox>> {
        self.outbox.clone().map(|cfg| Arc::new(Outbox::new(cfg)))
    }
}

/// Environment provider chain for `kind`
pub fn env_provider(kind: FlowKind) -> CompositeConfigProvider {
    CompositeConfigProvider::new()
        .with_provider(
            EnvConfigProvider::new()
                .with_prefix(ENV_PREFIX)
                .with_namespace(kind.as_str()),
        )
        .with_provider(EnvConfigProvider::new().with_prefix(ENV_PREFIX))
}
