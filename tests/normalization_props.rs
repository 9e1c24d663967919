//! Property tests for state seeding and the normalization pass.

use std::collections::BTreeMap;

use proptest::prelude::*;
use roster_form::{
    ExistingRecord, FieldDefinition, FieldType, FieldValue, FormSchema, FormState, Normalizer,
    PairRow, Section,
};

const KEYS: &[&str] = &["name", "github", "cell", "office", "teams", "links"];

fn schema() -> FormSchema {
    FormSchema::new(vec![
        Section::new(
            "Basics",
            vec![
                FieldDefinition::new("name", "Name", FieldType::Text),
                FieldDefinition::new("github", "GitHub username", FieldType::Text),
                FieldDefinition::new("cell", "Mobile number", FieldType::Text),
            ],
        ),
        Section::new(
            "Work",
            vec![
                FieldDefinition::new("office", "Office", FieldType::Radio)
                    .with_option("dc", "Washington DC")
                    .with_option("other", "Other"),
                FieldDefinition::new("teams", "Teams", FieldType::Checkbox)
                    .with_option("eng", "Engineering"),
                FieldDefinition::new("links", "Links", FieldType::Add),
            ],
        ),
    ])
    .unwrap()
}

fn arb_text() -> impl Strategy<Value = String> {
    "[ ]{0,2}@?[A-Za-z0-9 ._+()-]{0,12}[ ]{0,2}"
}

fn arb_value() -> impl Strategy<Value = FieldValue> {
    prop_oneof![
        arb_text().prop_map(FieldValue::Text),
        prop::collection::vec("[a-z]{0,4}", 0..4).prop_map(FieldValue::Choices),
        prop::collection::vec(
            ("[a-z]{0,3}", "[a-z0-9]{0,3}").prop_map(|(name, value)| PairRow::new(name, value)),
            0..4
        )
        .prop_map(FieldValue::Pairs),
    ]
}

fn arb_record() -> impl Strategy<Value = BTreeMap<String, FieldValue>> {
    prop::collection::btree_map(
        prop::sample::select(KEYS).prop_map(str::to_string),
        arb_value(),
        0..KEYS.len(),
    )
}

proptest! {
    #[test]
    fn normalization_is_idempotent(record in arb_record()) {
        let normalizer = Normalizer::new("github", "cell");

        let once = normalizer.normalize(record);
        let twice = normalizer.normalize(once.clone());

        prop_assert_eq!(once, twice);
    }

    #[test]
    fn normalized_record_has_no_empty_values(record in arb_record()) {
        let normalized = Normalizer::new("github", "cell").normalize(record);

        for (key, value) in normalized.iter() {
            prop_assert!(!value.is_empty(), "{} is empty", key);
            if let FieldValue::Pairs(rows) = value {
                prop_assert!(rows.iter().all(|row| !row.is_blank()));
            }
        }
    }

    #[test]
    fn seeded_state_has_one_entry_per_field(record in arb_record()) {
        let schema = schema();
        let existing = ExistingRecord::new(record.clone());
        let state = FormState::seeded(&schema, Some(&existing));

        prop_assert_eq!(state.len(), schema.fields().count());
        for field in schema.fields() {
            let expected = record.get(&field.key).cloned().unwrap_or_default();
            prop_assert_eq!(state.get(&field.key), &expected);
        }
    }
}
