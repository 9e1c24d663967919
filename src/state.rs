//! Form state: the record being built during a form session.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::groups::FieldGroupState;
use crate::schema::{FieldKind, FormSchema};
use crate::value::FieldValue;

static EMPTY: FieldValue = FieldValue::Text(String::new());

/// A previously saved record, used to seed edit-mode state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExistingRecord {
    values: BTreeMap<String, FieldValue>,
}

impl ExistingRecord {
    pub fn new(values: BTreeMap<String, FieldValue>) -> Self {
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.values.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.values.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Text of the identity field, if the record has one.
    pub fn identity(&self, identity_field: &str) -> Option<&str> {
        self.get(identity_field)
            .and_then(FieldValue::as_text)
            .filter(|identity| !identity.is_empty())
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for ExistingRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

/// One value per schema field, keyed by field key.
///
/// Only keys declared in the schema are ever stored; reading a key that is
/// absent yields the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormState {
    values: BTreeMap<String, FieldValue>,
}

impl FormState {
    /// Empty state: every schema field holds the empty string.
    pub fn new(schema: &FormSchema) -> Self {
        Self::seeded(schema, None)
    }

    /// State seeded from an existing record, field by field.
    ///
    /// Fields the record lacks start as the empty string. Keys in the record
    /// that the schema does not declare are ignored.
    pub fn seeded(schema: &FormSchema, existing: Option<&ExistingRecord>) -> Self {
        let values = schema
            .fields()
            .map(|field| {
                let value = existing
                    .and_then(|record| record.get(&field.key))
                    .cloned()
                    .unwrap_or_default();
                (field.key.clone(), value)
            })
            .collect();

        Self { values }
    }

    pub fn get(&self, key: &str) -> &FieldValue {
        self.values.get(key).unwrap_or(&EMPTY)
    }

    /// Text of a field; composite values read as empty.
    pub fn text(&self, key: &str) -> &str {
        self.get(key).text_or_empty()
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

    /// Set the text of a scalar field (text, textarea, date, hidden).
    pub fn set_text(
        &mut self,
        schema: &FormSchema,
        key: &str,
        text: impl Into<String>,
    ) -> Result<(), SchemaError> {
        schema.field_of_kind(key, FieldKind::Scalar)?;
        self.values
            .insert(key.to_string(), FieldValue::Text(text.into()));
        Ok(())
    }

    /// Overwrite fields with the values of a record.
    ///
    /// Every key must be declared in the schema; nothing is written otherwise.
    pub fn merge(&mut self, schema: &FormSchema, record: &ExistingRecord) -> Result<(), SchemaError> {
        if let Some((key, _)) = record.iter().find(|(key, _)| !schema.contains(key)) {
            return Err(SchemaError::UnknownField {
                key: key.to_string(),
            });
        }
        for (key, value) in record.iter() {
            self.values.insert(key.to_string(), value.clone());
        }
        Ok(())
    }

    /// Mutable view over the radio, checkbox and add-group fields.
    pub fn groups<'a>(&'a mut self, schema: &'a FormSchema) -> FieldGroupState<'a> {
        FieldGroupState::new(schema, self)
    }

    pub(crate) fn slot_mut(&mut self, key: &str) -> &mut FieldValue {
        self.values.entry(key.to_string()).or_default()
    }

    pub(crate) fn into_values(self) -> BTreeMap<String, FieldValue> {
        self.values
    }
}
