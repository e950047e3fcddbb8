//! Input validation for decision forms
//!
//! Rules run in a fixed order and the first failure wins:
//!
//! 1. identifier is non-empty after trimming
//! 2. exactly one of the two choices is selected
//! 3. a negative choice carries a non-empty reason
//!
//! Validation never touches the network or the store.

use thiserror::Error;

use crate::flow::ChoiceLabels;
use crate::form::{FormState, Verdict};

/// Result type for form validation
pub type ValidationResult<T> = Result<T, InputError>;

/// Input validation failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("Tracking identifier (ID) is required")]
    MissingIdentifier,

    #[error("Choose exactly one of '{positive}' or '{negative}'")]
    ChooseExactlyOne { positive: String, negative: String },

    #[error("A reason is required when choosing '{negative}'")]
    MissingReason { negative: String },
}

/// A form that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedForm {
    /// Identifier, trimmed
    pub id: String,
    pub verdict: Verdict,
    /// Trimmed reason; always `None` for a positive verdict
    pub reason: Option<String>,
}

/// Chains validation rules over a form, keeping the first failure
#[derive(Debug)]
pub struct FormValidator<'a> {
    form: &'a FormState,
    labels: &'a ChoiceLabels,
    verdict: Option<Verdict>,
    error: Option<InputError>,
}

impl<'a> FormValidator<'a> {
    pub fn new(form: &'a FormState, labels: &'a ChoiceLabels) -> Self {
        Self {
            form,
            labels,
            verdict: None,
            error: None,
        }
    }

    fn check<F>(mut self, rule: F) -> Self
    where
        F: FnOnce(&mut Self) -> ValidationResult<()>,
    {
        if self.error.is_none() {
            if let Err(err) = rule(&mut self) {
                self.error = Some(err);
            }
        }
        self
    }

    /// Identifier must be non-empty after trimming
    pub fn identifier(self) -> Self {
        self.check(|v| {
            if v.form.id.trim().is_empty() {
                Err(InputError::MissingIdentifier)
            } else {
                Ok(())
            }
        })
    }

    /// Exactly one choice must be selected
    pub fn exactly_one(self) -> Self {
        self.check(|v| match v.form.selection.verdict() {
            Some(verdict) => {
                v.verdict = Some(verdict);
                Ok(())
            }
            None => Err(InputError::ChooseExactlyOne {
                positive: v.labels.positive.clone(),
                negative: v.labels.negative.clone(),
            }),
        })
    }

    /// A negative choice needs a reason
    pub fn reason_when_negative(self) -> Self {
        self.check(|v| {
            let negative = v.verdict.map(Verdict::is_negative).unwrap_or(false);
            if negative && trimmed_reason(v.form).is_none() {
                Err(InputError::MissingReason {
                    negative: v.labels.negative.clone(),
                })
            } else {
                Ok(())
            }
        })
    }

    /// Finish validation and return the accepted form
    pub fn finish(self) -> ValidationResult<ValidatedForm> {
        if let Some(err) = self.error {
            return Err(err);
        }

        let verdict = self.verdict.ok_or_else(|| InputError::ChooseExactlyOne {
            positive: self.labels.positive.clone(),
            negative: self.labels.negative.clone(),
        })?;

        let reason = if verdict.is_negative() {
            trimmed_reason(self.form)
        } else {
            None
        };

        Ok(ValidatedForm {
            id: self.form.id.trim().to_string(),
            verdict,
            reason,
        })
    }
}

fn trimmed_reason(form: &FormState) -> Option<String> {
    form.reason
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string)
}

/// Run every rule in order
pub fn validate(form: &FormState, labels: &ChoiceLabels) -> ValidationResult<ValidatedForm> {
    FormValidator::new(form, labels)
        .identifier()
        .exactly_one()
        .reason_when_negative()
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> ChoiceLabels {
        ChoiceLabels::new("agree", "disagree")
    }

    #[test]
    fn test_blank_identifiers_rejected() {
        for id in ["", "   ", "\t\n"] {
            let form = FormState::new(id).with_flags(true, false);
            assert_eq!(validate(&form, &labels()), Err(InputError::MissingIdentifier));
        }
    }

    #[test]
    fn test_identifier_checked_before_choice() {
        let form = FormState::new(" ").with_flags(true, true);
        assert_eq!(validate(&form, &labels()), Err(InputError::MissingIdentifier));
    }

    #[test]
    fn test_both_or_neither_rejected() {
        for (positive, negative) in [(true, true), (false, false)] {
            let form = FormState::new("REQ-1").with_flags(positive, negative);
            let err = validate(&form, &labels()).unwrap_err();
            assert!(matches!(err, InputError::ChooseExactlyOne { .. }));
            assert_eq!(err.to_string(), "Choose exactly one of 'agree' or 'disagree'");
        }
    }

    #[test]
    fn test_negative_requires_reason() {
        let form = FormState::new("REQ-1")
            .with_flags(false, true)
            .with_reason("   ");
        assert_eq!(
            validate(&form, &labels()),
            Err(InputError::MissingReason {
                negative: "disagree".to_string()
            })
        );
    }

    #[test]
    fn test_negative_reason_trimmed() {
        let form = FormState::new(" REQ-1 ")
            .choose(Verdict::Negative)
            .with_reason("  out of scope ");
        let valid = validate(&form, &labels()).unwrap();

        assert_eq!(valid.id, "REQ-1");
        assert_eq!(valid.reason.as_deref(), Some("out of scope"));
    }

    #[test]
    fn test_positive_ignores_reason() {
        let form = FormState::new("REQ-1")
            .with_flags(true, false)
            .with_reason("not needed");
        let valid = validate(&form, &labels()).unwrap();

        assert_eq!(valid.verdict, Verdict::Positive);
        assert_eq!(valid.reason, None);
    }
}
