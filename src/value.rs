//! Field values held in form state.

use serde::{Deserialize, Serialize};

/// The value of one field.
///
/// Text, textarea, date and hidden fields hold `Text`; so does a radio field,
/// whose text is the selected option key. Checkbox fields hold `Choices` in
/// the order the options were checked, and add-groups hold `Pairs`.
///
/// Serialized untagged: a string, a list of strings, or a list of
/// `{name, value}` objects. An empty list deserializes as `Choices`; the
/// group mutators convert it when a pair row is first added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Choices(Vec<String>),
    Pairs(Vec<PairRow>),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    /// True for the empty string and for empty sequences.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(text) => text.is_empty(),
            FieldValue::Choices(choices) => choices.is_empty(),
            FieldValue::Pairs(rows) => rows.is_empty(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_choices(&self) -> Option<&[String]> {
        match self {
            FieldValue::Choices(choices) => Some(choices),
            _ => None,
        }
    }

    pub fn as_pairs(&self) -> Option<&[PairRow]> {
        match self {
            FieldValue::Pairs(rows) => Some(rows),
            _ => None,
        }
    }

    /// Text content, treating non-text values as empty.
    pub fn text_or_empty(&self) -> &str {
        self.as_text().unwrap_or("")
    }
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Text(String::new())
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<Vec<PairRow>> for FieldValue {
    fn from(rows: Vec<PairRow>) -> Self {
        FieldValue::Pairs(rows)
    }
}

/// One row of a repeatable name/value group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairRow {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: String,
}

impl PairRow {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// A row with neither a name nor a value.
    pub fn is_blank(&self) -> bool {
        self.name.is_empty() && self.value.is_empty()
    }

    pub fn cell_mut(&mut self, column: PairColumn) -> &mut String {
        match column {
            PairColumn::Name => &mut self.name,
            PairColumn::Value => &mut self.value,
        }
    }
}

/// Column of a pair row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PairColumn {
    Name,
    Value,
}
