//! Dynamic field groups
//!
//! Radio, checkbox and repeatable name/value fields keep structured values in
//! form state. `FieldGroupState` is a mutable view over a `FormState` that
//! applies user actions to those fields directly, without re-deriving the
//! structure from the rendering layer on every change.
//!
//! Per-kind behaviour goes through `FieldHandler`: one handler per
//! `FieldKind`, each able to produce the render state of a field and to commit
//! its raw value into the shape the validation pipeline expects.

use serde::Serialize;
use tracing::debug;

use crate::error::SchemaError;
use crate::schema::{FieldDefinition, FieldKind, FieldType, FormSchema};
use crate::state::FormState;
use crate::value::{FieldValue, PairColumn, PairRow};

// ============================================================================
// Render state
// ============================================================================

/// What the rendering layer needs to draw one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldView {
    pub key: String,
    pub label: String,
    pub field_type: FieldType,
    pub required: bool,
    pub hidden: bool,
    pub control: Control,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "control", rename_all = "snake_case")]
pub enum Control {
    Text { value: String },
    Options { multiple: bool, options: Vec<OptionView> },
    Pairs { rows: Vec<PairRow> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionView {
    pub key: String,
    pub label: String,
    pub checked: bool,
}

// ============================================================================
// Handlers
// ============================================================================

/// Kind-specific behaviour of a field.
pub trait FieldHandler: Sync {
    fn kind(&self) -> FieldKind;

    /// Control state for the rendering layer.
    fn control(&self, field: &FieldDefinition, value: &FieldValue) -> Control;

    /// The value as it should be submitted.
    fn commit(&self, value: &FieldValue) -> FieldValue;

    fn view(&self, field: &FieldDefinition, value: &FieldValue) -> FieldView {
        FieldView {
            key: field.key.clone(),
            label: field.label.clone(),
            field_type: field.field_type,
            required: field.required,
            hidden: field.field_type == FieldType::Hidden,
            control: self.control(field, value),
        }
    }
}

pub struct ScalarHandler;
pub struct SingleSelectHandler;
pub struct MultiSelectHandler;
pub struct PairListHandler;

impl FieldHandler for ScalarHandler {
    fn kind(&self) -> FieldKind {
        FieldKind::Scalar
    }

    fn control(&self, _field: &FieldDefinition, value: &FieldValue) -> Control {
        Control::Text {
            value: value.text_or_empty().to_string(),
        }
    }

    fn commit(&self, value: &FieldValue) -> FieldValue {
        value.clone()
    }
}

impl FieldHandler for SingleSelectHandler {
    fn kind(&self) -> FieldKind {
        FieldKind::SingleSelect
    }

    fn control(&self, field: &FieldDefinition, value: &FieldValue) -> Control {
        let selected = value.text_or_empty();
        Control::Options {
            multiple: false,
            options: option_views(field, |key| key == selected),
        }
    }

    fn commit(&self, value: &FieldValue) -> FieldValue {
        value.clone()
    }
}

impl FieldHandler for MultiSelectHandler {
    fn kind(&self) -> FieldKind {
        FieldKind::MultiSelect
    }

    fn control(&self, field: &FieldDefinition, value: &FieldValue) -> Control {
        let selected = value.as_choices().unwrap_or_default();
        Control::Options {
            multiple: true,
            options: option_views(field, |key| selected.iter().any(|s| s == key)),
        }
    }

    fn commit(&self, value: &FieldValue) -> FieldValue {
        match value {
            FieldValue::Text(text) if text.is_empty() => FieldValue::Choices(Vec::new()),
            other => other.clone(),
        }
    }
}

impl FieldHandler for PairListHandler {
    fn kind(&self) -> FieldKind {
        FieldKind::PairList
    }

    fn control(&self, _field: &FieldDefinition, value: &FieldValue) -> Control {
        Control::Pairs {
            rows: value.as_pairs().unwrap_or_default().to_vec(),
        }
    }

    fn commit(&self, value: &FieldValue) -> FieldValue {
        match value {
            FieldValue::Pairs(rows) => FieldValue::Pairs(compact(rows)),
            FieldValue::Text(text) if text.is_empty() => FieldValue::Pairs(Vec::new()),
            other => other.clone(),
        }
    }
}

fn option_views(field: &FieldDefinition, checked: impl Fn(&str) -> bool) -> Vec<OptionView> {
    field
        .fields
        .iter()
        .map(|opt| OptionView {
            key: opt.key.clone(),
            label: opt.label.clone(),
            checked: checked(&opt.key),
        })
        .collect()
}

fn compact(rows: &[PairRow]) -> Vec<PairRow> {
    rows.iter().filter(|row| !row.is_blank()).cloned().collect()
}

/// The handler for a field kind.
pub fn handler_for(kind: FieldKind) -> &'static dyn FieldHandler {
    match kind {
        FieldKind::Scalar => &ScalarHandler,
        FieldKind::SingleSelect => &SingleSelectHandler,
        FieldKind::MultiSelect => &MultiSelectHandler,
        FieldKind::PairList => &PairListHandler,
    }
}

// ============================================================================
// Group state
// ============================================================================

/// Mutable view over the dynamic fields of a `FormState`.
///
/// Every mutator checks the field exists and has the right kind, then updates
/// the state in place. None of them trigger validation.
pub struct FieldGroupState<'a> {
    schema: &'a FormSchema,
    state: &'a mut FormState,
}

impl<'a> FieldGroupState<'a> {
    pub fn new(schema: &'a FormSchema, state: &'a mut FormState) -> Self {
        Self { schema, state }
    }

    /// Replace the selected option of a radio field.
    ///
    /// The option key is recorded as given, declared or not.
    pub fn set_radio_value(&mut self, field_key: &str, option_key: &str) -> Result<(), SchemaError> {
        let field = self.schema.field_of_kind(field_key, FieldKind::SingleSelect)?;
        if field.option_label(option_key).is_none() {
            debug!(field = field_key, option = option_key, "undeclared radio option");
        }
        *self.state.slot_mut(field_key) = FieldValue::Text(option_key.to_string());
        Ok(())
    }

    /// Check or uncheck one option of a checkbox field.
    ///
    /// Checked options keep the order in which they were checked.
    pub fn toggle_checkbox_value(
        &mut self,
        field_key: &str,
        option_key: &str,
        included: bool,
    ) -> Result<(), SchemaError> {
        self.schema.field_of_kind(field_key, FieldKind::MultiSelect)?;
        let choices = choices_mut(self.state.slot_mut(field_key));

        if included {
            if !choices.iter().any(|c| c == option_key) {
                choices.push(option_key.to_string());
            }
        } else {
            choices.retain(|c| c != option_key);
        }
        Ok(())
    }

    /// Append a blank row to an add-group.
    pub fn add_pair_row(&mut self, field_key: &str) -> Result<(), SchemaError> {
        self.schema.field_of_kind(field_key, FieldKind::PairList)?;
        pairs_mut(self.state.slot_mut(field_key)).push(PairRow::default());
        Ok(())
    }

    /// Update the name or value cell of one add-group row.
    pub fn set_pair_cell(
        &mut self,
        field_key: &str,
        row_index: usize,
        column: PairColumn,
        text: impl Into<String>,
    ) -> Result<(), SchemaError> {
        self.schema.field_of_kind(field_key, FieldKind::PairList)?;
        let rows = pairs_mut(self.state.slot_mut(field_key));
        let len = rows.len();
        let row = rows.get_mut(row_index).ok_or_else(|| SchemaError::RowOutOfRange {
            key: field_key.to_string(),
            row: row_index,
            len,
        })?;
        *row.cell_mut(column) = text.into();
        Ok(())
    }

    /// Rows of an add-group with at least one non-empty cell.
    pub fn compact_pair_rows(&self, field_key: &str) -> Result<Vec<PairRow>, SchemaError> {
        self.schema.field_of_kind(field_key, FieldKind::PairList)?;
        Ok(compact(self.state.get(field_key).as_pairs().unwrap_or_default()))
    }

    /// Render state of one field.
    pub fn view(&self, field_key: &str) -> Result<FieldView, SchemaError> {
        let field = self
            .schema
            .field(field_key)
            .ok_or_else(|| SchemaError::UnknownField {
                key: field_key.to_string(),
            })?;
        Ok(handler_for(field.kind()).view(field, self.state.get(field_key)))
    }

    /// Render state of every field, in schema order.
    pub fn views(&self) -> Vec<FieldView> {
        self.schema
            .fields()
            .map(|field| handler_for(field.kind()).view(field, self.state.get(&field.key)))
            .collect()
    }

    /// Commit every field through its handler, in place.
    pub fn commit(&mut self) {
        for field in self.schema.fields() {
            let slot = self.state.slot_mut(&field.key);
            *slot = handler_for(field.kind()).commit(slot);
        }
    }
}

fn choices_mut(slot: &mut FieldValue) -> &mut Vec<String> {
    if !matches!(slot, FieldValue::Choices(_)) {
        let seed = match slot {
            FieldValue::Text(text) if !text.is_empty() => vec![std::mem::take(text)],
            _ => Vec::new(),
        };
        *slot = FieldValue::Choices(seed);
    }
    match slot {
        FieldValue::Choices(choices) => choices,
        _ => unreachable!("slot was just set to Choices"),
    }
}

fn pairs_mut(slot: &mut FieldValue) -> &mut Vec<PairRow> {
    if !matches!(slot, FieldValue::Pairs(_)) {
        *slot = FieldValue::Pairs(Vec::new());
    }
    match slot {
        FieldValue::Pairs(rows) => rows,
        _ => unreachable!("slot was just set to Pairs"),
    }
}
