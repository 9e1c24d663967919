//! Form schema
//!
//! A schema is an ordered list of sections, each holding an ordered list of
//! field definitions. Field keys are unique across the whole schema; that is
//! checked once, when the schema is built.
//!
//! Schemas are usually loaded from YAML:
//!
//! ```
//! use roster_form::FormSchema;
//!
//! let yaml = r#"
//! - name: Basics
//!   fields:
//!     - key: name
//!       label: Name
//!       required: true
//!     - key: office
//!       label: Office
//!       type: radio
//!       fields:
//!         - { key: dc, label: Washington DC }
//!         - { key: other, label: Other }
//! "#;
//!
//! let schema = FormSchema::from_yaml_str(yaml).unwrap();
//! assert_eq!(schema.fields().count(), 2);
//! assert_eq!(schema.label_for("office"), "Office");
//! ```

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

/// Input type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    Text,
    Textarea,
    Date,
    Hidden,
    Radio,
    Checkbox,
    /// Repeatable name/value pair group.
    Add,
}

/// How a field's value is held in form state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Scalar,
    SingleSelect,
    MultiSelect,
    PairList,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Scalar => "scalar",
            FieldKind::SingleSelect => "single-select",
            FieldKind::MultiSelect => "multi-select",
            FieldKind::PairList => "pair-list",
        }
    }
}

impl FieldType {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldType::Text | FieldType::Textarea | FieldType::Date | FieldType::Hidden => {
                FieldKind::Scalar
            }
            FieldType::Radio => FieldKind::SingleSelect,
            FieldType::Checkbox => FieldKind::MultiSelect,
            FieldType::Add => FieldKind::PairList,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Textarea => "textarea",
            FieldType::Date => "date",
            FieldType::Hidden => "hidden",
            FieldType::Radio => "radio",
            FieldType::Checkbox => "checkbox",
            FieldType::Add => "add",
        }
    }

    fn has_options(&self) -> bool {
        matches!(self, FieldType::Radio | FieldType::Checkbox)
    }
}

/// One selectable option of a radio or checkbox field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    pub key: String,
    pub label: String,
}

/// Describes one input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub key: String,
    pub label: String,
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    /// Options for radio and checkbox fields, in display order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldOption>,
}

impl FieldDefinition {
    pub fn new(key: impl Into<String>, label: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            field_type,
            required: false,
            fields: Vec::new(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, label: impl Into<String>) -> Self {
        self.fields.push(FieldOption {
            key: key.into(),
            label: label.into(),
        });
        self
    }

    pub fn kind(&self) -> FieldKind {
        self.field_type.kind()
    }

    /// Label of a declared option, if the key is one of them.
    pub fn option_label(&self, option_key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|opt| opt.key == option_key)
            .map(|opt| opt.label.as_str())
    }
}

/// A titled group of fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    #[serde(alias = "section")]
    pub name: String,
    #[serde(alias = "data")]
    pub fields: Vec<FieldDefinition>,
}

impl Section {
    pub fn new(name: impl Into<String>, fields: Vec<FieldDefinition>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }
}

/// Ordered sections with unique field keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Section>", into = "Vec<Section>")]
pub struct FormSchema {
    sections: Vec<Section>,
}

impl FormSchema {
    /// Build a schema, rejecting duplicate keys and option-less choice fields.
    pub fn new(sections: Vec<Section>) -> Result<Self, SchemaError> {
        let mut seen: HashMap<&str, &str> = HashMap::new();

        for section in &sections {
            for field in &section.fields {
                if let Some(first_section) = seen.insert(&field.key, &section.name) {
                    return Err(SchemaError::DuplicateFieldKey {
                        key: field.key.clone(),
                        first_section: first_section.to_string(),
                        second_section: section.name.clone(),
                    });
                }
                if field.field_type.has_options() && field.fields.is_empty() {
                    return Err(SchemaError::MissingOptions {
                        key: field.key.clone(),
                        field_type: field.field_type.as_str().to_string(),
                    });
                }
            }
        }

        Ok(Self { sections })
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse form schema YAML")
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse form schema JSON")
    }

    /// Load a schema file; `.json` files are read as JSON, anything else as YAML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let is_json = path.extension().is_some_and(|ext| ext == "json");
        let schema = if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        };
        schema.with_context(|| format!("Invalid schema in {}", path.display()))
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// All field definitions across sections, in schema order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.sections.iter().flat_map(|section| section.fields.iter())
    }

    pub fn field(&self, key: &str) -> Option<&FieldDefinition> {
        self.fields().find(|field| field.key == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.field(key).is_some()
    }

    /// Display label of a field, falling back to the key itself.
    pub fn label_for<'a>(&'a self, key: &'a str) -> &'a str {
        self.field(key).map(|field| field.label.as_str()).unwrap_or(key)
    }

    /// Look up a field and check it holds the expected kind of value.
    pub fn field_of_kind(
        &self,
        key: &str,
        expected: FieldKind,
    ) -> Result<&FieldDefinition, SchemaError> {
        let field = self.field(key).ok_or_else(|| SchemaError::UnknownField {
            key: key.to_string(),
        })?;
        if field.kind() != expected {
            return Err(SchemaError::FieldKindMismatch {
                key: key.to_string(),
                expected: expected.as_str(),
                actual: field.kind().as_str(),
            });
        }
        Ok(field)
    }
}

impl TryFrom<Vec<Section>> for FormSchema {
    type Error = SchemaError;

    fn try_from(sections: Vec<Section>) -> Result<Self, Self::Error> {
        Self::new(sections)
    }
}

impl From<FormSchema> for Vec<Section> {
    fn from(schema: FormSchema) -> Self {
        schema.sections
    }
}
