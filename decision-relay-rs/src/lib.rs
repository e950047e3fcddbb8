//! # Decision Relay
//!
//! Relays requester and reviewer decisions to automation webhooks.
//!
//! A submission runs once, start to finish:
//!
//! 1. validate the form (`validation`)
//! 2. look up the request row and check its state (`gate`)
//! 3. pick the destination (`target`)
//! 4. build the decision document (`record`) and deliver it (`submitter`)
//!
//! Flow-specific labels, field names and gating live in `flow`; loading from
//! the environment lives in `config`.

pub mod config;
pub mod error;
pub mod flow;
pub mod form;
pub mod gate;
pub mod params;
pub mod record;
pub mod review;
pub mod submitter;
pub mod target;
pub mod validation;

pub use config::{RelayConfig, StoreSettings};
pub use error::{ErrorCategory, SubmissionError, SubmissionResult};
pub use flow::{ChoiceLabels, FlowKind, FlowProfile, PayloadFields};
pub use form::{FormState, Selection, Verdict};
pub use gate::{GateError, StateGate};
pub use params::InboundParams;
pub use record::DecisionRecord;
pub use review::lookup_request;
pub use submitter::{DecisionSubmitter, SubmissionOutcome};
pub use target::{ResolvedTarget, TargetCandidates, TargetPolicy, TargetSource};
pub use validation::{validate, InputError, ValidatedForm};

#[cfg(test)]
mod tests;
