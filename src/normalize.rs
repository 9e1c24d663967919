//! Value normalization
//!
//! Pure string normalizers plus the record-level pass that runs once every
//! validation stage has passed:
//! - the mobile field is reduced to a canonical telephone form
//! - the identity field is lower-cased
//! - every scalar is trimmed and loses one leading `@`
//! - checkbox selections lose empty entries, add-groups lose blank rows
//! - anything left empty is dropped from the record
//!
//! The pass is idempotent for values that do not start with repeated `@`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::value::FieldValue;

/// Canonical form of a free-form phone number.
///
/// Keeps digits only, with a single leading `+` when the number carries an
/// international prefix (`+` or `00`).
///
/// ```
/// use roster_form::normalize::normalize_tel;
///
/// assert_eq!(normalize_tel("+1 (555) 010-9999"), "+15550109999");
/// assert_eq!(normalize_tel("0051 987 654 321"), "+51987654321");
/// assert_eq!(normalize_tel("555.0199"), "5550199");
/// ```
pub fn normalize_tel(raw: &str) -> String {
    let trimmed = raw.trim();
    let digits: String = trimmed.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.is_empty() {
        return String::new();
    }

    if trimmed.starts_with('+') {
        format!("+{}", digits)
    } else if let Some(rest) = digits.strip_prefix("00").filter(|rest| !rest.is_empty()) {
        format!("+{}", rest)
    } else {
        digits
    }
}

/// Identity keys are case-insensitive; store them lower-cased.
pub fn normalize_identity(raw: &str) -> String {
    raw.to_lowercase()
}

/// Trim whitespace and drop a single leading `@`.
pub fn trim_sentinel(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix('@')
        .map(str::trim_start)
        .unwrap_or(trimmed)
        .to_string()
}

/// A validated, cleaned record ready for the submission sink.
///
/// Empty fields are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedRecord {
    values: BTreeMap<String, FieldValue>,
}

impl NormalizedRecord {
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.values.get(key)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(FieldValue::as_text)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.values.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn into_inner(self) -> BTreeMap<String, FieldValue> {
        self.values
    }
}

impl IntoIterator for NormalizedRecord {
    type Item = (String, FieldValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

/// Record-level normalization pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalizer {
    identity_field: String,
    mobile_field: String,
}

impl Normalizer {
    pub fn new(identity_field: impl Into<String>, mobile_field: impl Into<String>) -> Self {
        Self {
            identity_field: identity_field.into(),
            mobile_field: mobile_field.into(),
        }
    }

    pub fn normalize<I>(&self, values: I) -> NormalizedRecord
    where
        I: IntoIterator<Item = (String, FieldValue)>,
    {
        let values = values
            .into_iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(key, value)| {
                let value = self.normalize_value(&key, value);
                (key, value)
            })
            .filter(|(_, value)| !value.is_empty())
            .collect();

        NormalizedRecord { values }
    }

    fn normalize_value(&self, key: &str, value: FieldValue) -> FieldValue {
        match value {
            FieldValue::Text(text) => {
                let mut text = if key == self.mobile_field {
                    normalize_tel(&text)
                } else {
                    text
                };
                if key == self.identity_field {
                    text = normalize_identity(&text);
                }
                FieldValue::Text(trim_sentinel(&text))
            }
            FieldValue::Choices(choices) => {
                FieldValue::Choices(choices.into_iter().filter(|c| !c.is_empty()).collect())
            }
            FieldValue::Pairs(rows) => {
                FieldValue::Pairs(rows.into_iter().filter(|row| !row.is_blank()).collect())
            }
        }
    }
}
