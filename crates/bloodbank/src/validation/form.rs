//! Rule-table driven form validation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::patterns::{is_email, is_phone, leading_integer};
use crate::model::FormData;

/// Field name to the message of the rule that rejected it.
///
/// An empty map means the form is valid.
pub type ValidationErrors = BTreeMap<String, String>;

/// Field name to the rules applied to it.
pub type RuleTable = BTreeMap<String, FieldRule>;

/// Rules for one form field.
///
/// Zero thresholds are treated as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldRule {
    /// Name shown to the user in messages.
    pub label: String,
    /// Reject an absent or blank value.
    pub required: bool,
    /// Minimum length in characters.
    pub min_length: Option<usize>,
    /// Value must look like an email address.
    pub email: bool,
    /// Value must look like a phone number.
    pub phone: bool,
    /// Lower bound on the value's leading integer.
    pub min: Option<i64>,
    /// Upper bound on the value's leading integer.
    pub max: Option<i64>,
}

impl FieldRule {
    /// A rule with only a label; chain the builder methods to add checks.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    /// Reject an absent or blank value.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Require at least `n` characters.
    #[must_use]
    pub fn min_length(mut self, n: usize) -> Self {
        self.min_length = Some(n);
        self
    }

    /// Require an email address shape.
    #[must_use]
    pub fn email(mut self) -> Self {
        self.email = true;
        self
    }

    /// Require a phone number shape.
    #[must_use]
    pub fn phone(mut self) -> Self {
        self.phone = true;
        self
    }

    /// Require the leading integer to be at least `n`.
    #[must_use]
    pub fn min(mut self, n: i64) -> Self {
        self.min = Some(n);
        self
    }

    /// Require the leading integer to be at most `n`.
    #[must_use]
    pub fn max(mut self, n: i64) -> Self {
        self.max = Some(n);
        self
    }

    /// Check one value. Returns the message of the last violated rule.
    ///
    /// A failed `required` check stops evaluation. Otherwise the rules run in
    /// order (length, email, phone, min, max) and a later violation replaces
    /// an earlier message. Every rule but `required` ignores an empty value.
    #[must_use]
    pub fn check(&self, value: Option<&str>) -> Option<String> {
        let value = value.unwrap_or_default();

        if self.required && value.trim().is_empty() {
            return Some(format!("{} is required", self.label));
        }
        if value.is_empty() {
            return None;
        }

        let mut message = None;

        if let Some(n) = self.min_length.filter(|&n| n > 0) {
            if value.chars().count() < n {
                message = Some(format!("{} must be at least {n} characters", self.label));
            }
        }

        if self.email && !is_email(value) {
            message = Some("Please enter a valid email address".to_string());
        }

        if self.phone && !is_phone(value) {
            message = Some("Please enter a valid phone number".to_string());
        }

        let number = leading_integer(value);

        if let (Some(min), Some(n)) = (self.min.filter(|&m| m != 0), number) {
            if n < min {
                message = Some(format!("{} must be at least {min}", self.label));
            }
        }

        if let (Some(max), Some(n)) = (self.max.filter(|&m| m != 0), number) {
            if n > max {
                message = Some(format!("{} must not exceed {max}", self.label));
            }
        }

        message
    }
}

/// Validate `input` against `rules`.
///
/// Fields present in `input` but absent from `rules` are not checked.
#[must_use]
pub fn validate_form(input: &FormData, rules: &RuleTable) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    for (field, rule) in rules {
        if let Some(message) = rule.check(input.get(field).map(String::as_str)) {
            trace!(field = %field, message = %message, "field rejected");
            errors.insert(field.clone(), message);
        }
    }

    errors
}
