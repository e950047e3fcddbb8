//! Form state for one submission
//!
//! A `FormState` is built fresh for every submission and handed to the
//! submitter by reference. Nothing in it survives past that call.

use serde::{Deserialize, Serialize};

/// The two possible outcomes of a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// agree / approve
    Positive,
    /// disagree / decline
    Negative,
}

impl Verdict {
    pub fn is_negative(self) -> bool {
        matches!(self, Verdict::Negative)
    }
}

/// How the decision was captured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Two independent checkboxes
    Pair { positive: bool, negative: bool },
    /// One enumerated choice, possibly unset
    Single(Option<Verdict>),
}

impl Selection {
    /// The chosen verdict when exactly one was selected
    pub fn verdict(&self) -> Option<Verdict> {
        match *self {
            Selection::Pair {
                positive: true,
                negative: false,
            } => Some(Verdict::Positive),
            Selection::Pair {
                positive: false,
                negative: true,
            } => Some(Verdict::Negative),
            Selection::Pair { .. } => None,
            Selection::Single(choice) => choice,
        }
    }
}

impl Default for Selection {
    fn default() -> Self {
        Selection::Pair {
            positive: false,
            negative: false,
        }
    }
}

/// Everything the user entered for one submission
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub id: String,
    pub selection: Selection,
    pub reason: Option<String>,
    /// Callback URL carried in from inbound parameters
    pub resume_url: Option<String>,
}

impl FormState {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Set both checkboxes
    pub fn with_flags(mut self, positive: bool, negative: bool) -> Self {
        self.selection = Selection::Pair { positive, negative };
        self
    }

    /// Set a single enumerated choice
    pub fn choose(mut self, verdict: Verdict) -> Self {
        self.selection = Selection::Single(Some(verdict));
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_resume_url(mut self, url: impl Into<String>) -> Self {
        self.resume_url = Some(url.into());
        self
    }
}
