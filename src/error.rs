//! Error types for form validation
//!
//! `ValidationError` is what a user sees after pressing submit: every variant
//! renders to a single human-readable message. `SchemaError` covers
//! precondition violations (bad schema, bad rule wiring, mutating a field that
//! does not exist) and is raised at construction or mutation time.

use thiserror::Error;

/// A submit-time validation failure.
///
/// The pipeline stops at the first failing stage, so a submission produces at
/// most one of these. Only `MissingRequiredFields` aggregates, across fields.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Identity value already present in the people index during create.
    #[error("User \"{identity}\" already exists.")]
    DuplicateIdentity { identity: String },

    /// One or more required fields were left empty.
    #[error("Missing required fields: {}", quote_join(labels))]
    MissingRequiredFields { labels: Vec<String> },

    /// A field failed a type-specific format check.
    #[error("{label} must be a valid number")]
    InvalidFormat { field: String, label: String },

    /// A dependent field is empty given another field's value.
    #[error("{message}")]
    ConditionalRuleViolation {
        trigger_field: String,
        dependent_field: String,
        message: String,
    },

    /// Email is not an address on one of the organization's domains.
    #[error("{value} should be a valid {} email", format_domains(domains))]
    InvalidEmailDomain { value: String, domains: Vec<String> },

    /// Delete confirmation text did not match the stored identity.
    #[error("{label} was not entered correctly.")]
    ConfirmationMismatch { label: String },
}

fn quote_join(labels: &[String]) -> String {
    labels
        .iter()
        .map(|label| format!("\"{}\"", label))
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_domains(domains: &[String]) -> String {
    domains
        .iter()
        .map(|domain| format!("@{}", domain))
        .collect::<Vec<_>>()
        .join(" or ")
}

impl ValidationError {
    /// Stable error code for this failure.
    pub fn code(&self) -> &'static str {
        match self {
            Self::DuplicateIdentity { .. } => "DUPLICATE_IDENTITY",
            Self::MissingRequiredFields { .. } => "MISSING_REQUIRED_FIELDS",
            Self::InvalidFormat { .. } => "INVALID_FORMAT",
            Self::ConditionalRuleViolation { .. } => "CONDITIONAL_RULE_VIOLATION",
            Self::InvalidEmailDomain { .. } => "INVALID_EMAIL_DOMAIN",
            Self::ConfirmationMismatch { .. } => "CONFIRMATION_MISMATCH",
        }
    }

    /// The message handed to the error display.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

/// Structural problems with a schema, its rules, or a field mutation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Duplicate field key '{key}' (sections '{first_section}' and '{second_section}')")]
    DuplicateFieldKey {
        key: String,
        first_section: String,
        second_section: String,
    },

    #[error("Field '{key}' is a {field_type} field but declares no options")]
    MissingOptions { key: String, field_type: String },

    #[error("Rule setting '{setting}' references unknown field '{key}'")]
    UnknownRuleField { setting: String, key: String },

    #[error("Unknown field '{key}'")]
    UnknownField { key: String },

    #[error("Field '{key}' is a {actual} field, expected {expected}")]
    FieldKindMismatch {
        key: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Row {row} out of range for field '{key}' ({len} rows)")]
    RowOutOfRange { key: String, row: usize, len: usize },
}
