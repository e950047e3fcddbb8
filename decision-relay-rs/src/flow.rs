//! Flow profiles
//!
//! The requester, admin and owner flows share one submitter and differ only
//! in labels, payload field names, gating, timeout and target priority.

use std::fmt;
use std::str::FromStr;

use relay_sdk::{ConfigProvider, ConfigProviderExt, RelayError};
use serde::{Deserialize, Serialize};

use crate::form::Verdict;
use crate::gate::StateGate;
use crate::target::TargetPolicy;

/// The built-in flows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowKind {
    Requester,
    Admin,
    Owner,
}

impl FlowKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FlowKind::Requester => "requester",
            FlowKind::Admin => "admin",
            FlowKind::Owner => "owner",
        }
    }
}

impl fmt::Display for FlowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlowKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "requester" | "citizen" => Ok(FlowKind::Requester),
            "admin" => Ok(FlowKind::Admin),
            "owner" | "business-owner" => Ok(FlowKind::Owner),
            other => Err(format!(
                "unknown flow '{}' (expected requester, admin or owner)",
                other
            )),
        }
    }
}

/// Labels for the two choices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceLabels {
    pub positive: String,
    pub negative: String,
}

impl ChoiceLabels {
    pub fn new(positive: impl Into<String>, negative: impl Into<String>) -> Self {
        Self {
            positive: positive.into(),
            negative: negative.into(),
        }
    }

    pub fn label(&self, verdict: Verdict) -> &str {
        match verdict {
            Verdict::Positive => &self.positive,
            Verdict::Negative => &self.negative,
        }
    }
}

/// JSON field names for the decision and the reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadFields {
    pub decision: String,
    pub reason: String,
}

impl PayloadFields {
    pub fn new(decision: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            decision: decision.into(),
            reason: reason.into(),
        }
    }
}

/// Everything that distinguishes one flow from another
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowProfile {
    pub kind: FlowKind,
    pub labels: ChoiceLabels,
    pub fields: PayloadFields,
    /// Empty means no gate
    pub allowed_states: Vec<String>,
    pub timeout_seconds: u64,
    pub target_policy: TargetPolicy,
}

impl FlowProfile {
    /// Built-in defaults for `kind`
    pub fn preset(kind: FlowKind) -> Self {
        match kind {
            FlowKind::Requester => Self {
                kind,
                labels: ChoiceLabels::new("agree", "disagree"),
                fields: PayloadFields::new("choice", "reason"),
                allowed_states: Vec::new(),
                timeout_seconds: 8,
                target_policy: TargetPolicy::default(),
            },
            FlowKind::Admin => Self {
                kind,
                labels: ChoiceLabels::new("approve", "decline"),
                fields: PayloadFields::new("decision", "reason_for_refusal"),
                allowed_states: Vec::new(),
                timeout_seconds: 15,
                target_policy: TargetPolicy::default(),
            },
            FlowKind::Owner => Self {
                kind,
                labels: ChoiceLabels::new("approve", "decline"),
                fields: PayloadFields::new("decision", "reason_for_refusal"),
                allowed_states: vec!["approved".to_string(), "declined".to_string()],
                timeout_seconds: 15,
                target_policy: TargetPolicy::default(),
            },
        }
    }

    /// The preset for `kind` with any configured overrides applied
    pub fn from_provider<P: ConfigProvider + ?Sized>(
        kind: FlowKind,
        provider: &P,
    ) -> Result<Self, RelayError> {
        let preset = Self::preset(kind);

        let target_policy = match provider.get_list("target_priority") {
            Some(names) => TargetPolicy::parse(&names).map_err(|e| {
                RelayError::configuration(format!("Invalid target_priority: {}", e))
            })?,
            None => preset.target_policy,
        };

        let timeout_seconds = provider.get_parsed_or("timeout_seconds", preset.timeout_seconds)?;
        if timeout_seconds == 0 {
            return Err(RelayError::configuration("timeout_seconds must be positive"));
        }

        Ok(Self {
            kind,
            labels: ChoiceLabels::new(
                provider.get_string_or("positive_label", &preset.labels.positive),
                provider.get_string_or("negative_label", &preset.labels.negative),
            ),
            fields: PayloadFields::new(
                provider.get_string_or("decision_field", &preset.fields.decision),
                provider.get_string_or("reason_field", &preset.fields.reason),
            ),
            allowed_states: provider
                .get_list("allowed_states")
                .unwrap_or(preset.allowed_states),
            timeout_seconds,
            target_policy,
        })
    }

    /// The state gate, if this flow has one
    pub fn gate(&self) -> Option<StateGate> {
        StateGate::new(&self.allowed_states)
    }
}
