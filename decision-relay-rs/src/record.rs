//! The decision document sent to the webhook

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::flow::{ChoiceLabels, PayloadFields};
use crate::form::Verdict;
use crate::validation::ValidatedForm;

/// A decision, created at submission time and never mutated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionRecord {
    pub id: String,
    pub verdict: Verdict,
    /// Label for the verdict, e.g. "agree" or "decline"
    pub label: String,
    /// Present only for negative verdicts
    pub reason: Option<String>,
    pub timestamp_utc: DateTime<Utc>,
    /// Echoed authorization value from the looked-up row
    pub authorize: Option<String>,
    /// State that gated the submission
    pub state_checked: Option<String>,
}

impl DecisionRecord {
    pub fn new(form: &ValidatedForm, labels: &ChoiceLabels, timestamp_utc: DateTime<Utc>) -> Self {
        Self {
            id: form.id.clone(),
            verdict: form.verdict,
            label: labels.label(form.verdict).to_string(),
            reason: if form.verdict.is_negative() {
                form.reason.clone()
            } else {
                None
            },
            timestamp_utc,
            authorize: None,
            state_checked: None,
        }
    }

    pub fn with_authorize(mut self, authorize: Option<String>) -> Self {
        self.authorize = authorize;
        self
    }

    pub fn with_state_checked(mut self, state: Option<String>) -> Self {
        self.state_checked = state;
        self
    }

    /// JSON body laid out with the flow's field names
    pub fn to_payload(&self, fields: &PayloadFields) -> Value {
        let mut body = Map::new();
        body.insert("id".to_string(), Value::String(self.id.clone()));
        body.insert(fields.decision.clone(), Value::String(self.label.clone()));

        if let (Verdict::Negative, Some(reason)) = (self.verdict, &self.reason) {
            body.insert(fields.reason.clone(), Value::String(reason.clone()));
        }

        body.insert(
            "timestamp_utc".to_string(),
            Value::String(self.timestamp_utc.to_rfc3339()),
        );

        if let Some(authorize) = &self.authorize {
            body.insert("authorize".to_string(), Value::String(authorize.clone()));
        }
        if let Some(state) = &self.state_checked {
            body.insert("state_checked".to_string(), Value::String(state.clone()));
        }

        Value::Object(body)
    }
}
