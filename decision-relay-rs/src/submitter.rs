//! Decision submitter
//!
//! One call to [`DecisionSubmitter::submit`] runs the whole flow:
//! validate, look up the row, gate on its state, resolve the destination,
//! build the decision document and deliver it. Nothing is retained between
//! calls apart from the store's table cache.

use std::sync::Arc;

use chrono::Utc;
use decision_outbox::{Outbox, OutboxEntry};
use log::{error, info, warn};
use relay_sdk::config::DEFAULT_DETAIL_LIMIT;
use relay_sdk::util::{sanitize_for_logging, truncate_string};
use relay_sdk::webhook::DeliveryReceipt;
use relay_sdk::{RelayError, WebhookTransport};
use serde::Serialize;
use serde_json::Value;
use sheet_store::{RequestRecord, SheetStore};

use crate::config::RelayConfig;
use crate::error::{SubmissionError, SubmissionResult};
use crate::flow::FlowProfile;
use crate::form::FormState;
use crate::record::DecisionRecord;
use crate::target::{ResolvedTarget, TargetCandidates};
use crate::validation::validate;

/// A delivered decision
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionOutcome {
    pub id: String,
    /// Label of the chosen verdict
    pub decision: String,
    pub target: ResolvedTarget,
    pub status: u16,
    pub attempts: u32,
    /// Response body, truncated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_excerpt: Option<String>,
    /// The document that was posted
    pub payload: Value,
}

/// Validates, gates, routes and delivers decisions for one flow
pub struct DecisionSubmitter {
    profile: FlowProfile,
    transport: Arc<dyn WebhookTransport>,
    store: Option<Arc<SheetStore>>,
    fallback_url: Option<String>,
    outbox: Option<Arc<Outbox>>,
    detail_limit: usize,
}

impl DecisionSubmitter {
    pub fn new(profile: FlowProfile, transport: Arc<dyn WebhookTransport>) -> Self {
        Self {
            profile,
            transport,
            store: None,
            fallback_url: None,
            outbox: None,
            detail_limit: DEFAULT_DETAIL_LIMIT,
        }
    }

    /// Wire a submitter from loaded configuration
    pub fn from_config(config: &RelayConfig) -> SubmissionResult<Self> {
        let transport = Arc::new(relay_sdk::webhook_client(config.webhook.clone())?);

        let mut submitter = Self::new(config.profile.clone(), transport)
            .with_detail_limit(config.webhook.detail_limit);

        if let Some(store) = config.build_store()? {
            submitter = submitter.with_store(store);
        }
        if let Some(url) = &config.fallback_url {
            submitter = submitter.with_fallback(url.clone());
        }
        if let Some(outbox) = config.build_outbox() {
            submitter = submitter.with_outbox(outbox);
        }

        Ok(submitter)
    }

    pub fn with_store(mut self, store: Arc<SheetStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_fallback(mut self, url: impl Into<String>) -> Self {
        self.fallback_url = Some(url.into());
        self
    }

    pub fn with_outbox(mut self, outbox: Arc<Outbox>) -> Self {
        self.outbox = Some(outbox);
        self
    }

    pub fn with_detail_limit(mut self, limit: usize) -> Self {
        self.detail_limit = limit;
        self
    }

    pub fn profile(&self) -> &FlowProfile {
        &self.profile
    }

    /// Run validate → lookup/gate → resolve → deliver for one form
    pub async fn submit(&self, form: &FormState) -> SubmissionResult<SubmissionOutcome> {
        let valid = validate(form, &self.profile.labels)?;

        let row = self.lookup_row(&valid.id).await?;

        let state_checked = match self.profile.gate() {
            Some(gate) => {
                if self.store.is_none() {
                    return Err(SubmissionError::configuration(
                        "state gate configured without a request store",
                    ));
                }
                Some(gate.check(&valid.id, row.as_ref())?)
            }
            None => None,
        };

        let authorize = row.as_ref().and_then(|r| r.authorize.clone());
        let candidates = TargetCandidates {
            authorize: authorize.as_deref(),
            resume: form.resume_url.as_deref(),
            fallback: self.fallback_url.as_deref(),
        };
        let target = self
            .profile
            .target_policy
            .resolve(&candidates)
            .ok_or_else(SubmissionError::no_destination)?;

        let record = DecisionRecord::new(&valid, &self.profile.labels, Utc::now())
            .with_authorize(authorize)
            .with_state_checked(state_checked);
        let payload = record.to_payload(&self.profile.fields);

        info!(
            "Submitting {} decision '{}' for {} to {} ({})",
            self.profile.kind,
            record.label,
            record.id,
            sanitize_for_logging(&target.url),
            target.source
        );

        match self.transport.deliver(&target.url, &payload).await {
            Ok(receipt) => Ok(self.outcome(record, target, receipt, payload)),
            // Never sent: the URL itself was refused
            Err(err) if matches!(err.root(), RelayError::InvalidRequest(_)) => {
                Err(SubmissionError::configuration(format!(
                    "{} destination {} is unusable: {}",
                    target.source,
                    sanitize_for_logging(&target.url),
                    err
                )))
            }
            Err(err) => Err(self.delivery_failed(&target, &payload, err)),
        }
    }

    async fn lookup_row(&self, id: &str) -> SubmissionResult<Option<RequestRecord>> {
        match &self.store {
            Some(store) => Ok(store.lookup(id).await?),
            None => Ok(None),
        }
    }

    fn outcome(
        &self,
        record: DecisionRecord,
        target: ResolvedTarget,
        receipt: DeliveryReceipt,
        payload: Value,
    ) -> SubmissionOutcome {
        SubmissionOutcome {
            id: record.id,
            decision: record.label,
            target,
            status: receipt.status,
            attempts: receipt.attempts,
            response_excerpt: receipt
                .body_excerpt
                .map(|body| truncate_string(&body, self.detail_limit)),
            payload,
        }
    }

    fn delivery_failed(
        &self,
        target: &ResolvedTarget,
        payload: &Value,
        err: RelayError,
    ) -> SubmissionError {
        let detail = truncate_string(err.detail(), self.detail_limit);
        let attempts = err
            .context_value("attempts")
            .and_then(|a| a.parse().ok())
            .unwrap_or(0);

        let (kept_in_outbox, outbox_error) = match &self.outbox {
            Some(outbox) => {
                let entry = OutboxEntry::new(
                    self.profile.kind.as_str(),
                    Some(target.url.clone()),
                    payload.clone(),
                    detail.clone(),
                    attempts,
                );
                match outbox.append(&entry) {
                    Ok(()) => (true, None),
                    Err(e) => {
                        error!("Failed to keep undelivered decision in outbox: {}", e);
                        (false, Some(e.to_string()))
                    }
                }
            }
            None => (false, None),
        };

        warn!(
            "Delivery of {} decision failed after {} attempt(s): {}",
            self.profile.kind, attempts, detail
        );

        SubmissionError::Delivery {
            target: sanitize_for_logging(&target.url),
            detail,
            attempts,
            status: err.status_code(),
            kept_in_outbox,
            outbox_error,
        }
    }
}

impl std::fmt::Debug for DecisionSubmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecisionSubmitter")
            .field("flow", &self.profile.kind)
            .field("store", &self.store)
            .field("fallback_url", &self.fallback_url)
            .field("outbox", &self.outbox)
            .finish()
    }
}
