//! Name canonicalization and validation.
//!
//! A label is valid when, after trimming and lowercasing, it is 3 to 32
//! characters of `[a-z0-9]`. Invalid input is a normal outcome reported in the
//! verdict, never an error.

use serde::{Deserialize, Serialize};

use crate::constants::{NAME_MAX_LEN, NAME_MIN_LEN};

/// Reason reported for input that is empty after trimming.
pub const REASON_EMPTY: &str = "empty name";

/// Reason reported for labels outside the length bounds.
pub const REASON_LENGTH: &str = "Name must be 3-32 chars";

/// Reason reported for labels with characters outside `[a-z0-9]`.
pub const REASON_CHARSET: &str = "Only lowercase letters and numbers";

/// Outcome of validating a candidate name.
///
/// Serializes to `{name, is_valid, reason}`, plus `available` once an
/// availability check has been attached.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameVerdict {
    /// Canonical form of the input (the raw input when it was empty)
    #[serde(rename = "name")]
    pub validated_name: String,
    /// Whether the canonical form satisfies the name rules
    pub is_valid: bool,
    /// Human-readable reason; empty when valid
    pub reason: String,
    /// Availability, only present for valid names that were checked
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available: Option<bool>,
}

impl NameVerdict {
    fn valid(name: String) -> Self {
        Self {
            validated_name: name,
            is_valid: true,
            reason: String::new(),
            available: None,
        }
    }

    fn invalid(name: String, reason: &str) -> Self {
        Self {
            validated_name: name,
            is_valid: false,
            reason: reason.to_string(),
            available: None,
        }
    }

    /// Attaches the result of an availability check.
    pub fn with_availability(mut self, available: bool) -> Self {
        self.available = Some(available);
        self
    }
}

/// Trims surrounding whitespace and lowercases.
pub fn canonicalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Validates a candidate name.
pub fn validate_name(raw: &str) -> NameVerdict {
    let name = canonicalize(raw);

    if name.is_empty() {
        return NameVerdict::invalid(raw.to_string(), REASON_EMPTY);
    }

    let len = name.chars().count();
    if !(NAME_MIN_LEN..=NAME_MAX_LEN).contains(&len) {
        return NameVerdict::invalid(name, REASON_LENGTH);
    }

    if !name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()) {
        return NameVerdict::invalid(name, REASON_CHARSET);
    }

    NameVerdict::valid(name)
}
