//! End-to-end tests of the form pipeline: session -> engine -> sink.

use pretty_assertions::assert_eq;
use roster_form::{
    ErrorSlot, ExistingRecord, FieldDefinition, FieldType, FieldValue, FormRules, FormSchema,
    FormSession, PairColumn, PairRow, PeopleIndex, RecordingSink, Section, SinkEvent,
    ValidationEngine, ValidationError,
};

fn config_path(name: &str) -> String {
    format!("{}/config/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn roster_engine() -> ValidationEngine {
    let schema = FormSchema::load(config_path("roster_schema.yaml")).unwrap();
    let rules = FormRules::load(config_path("form_rules.yaml")).unwrap();
    ValidationEngine::new(schema, rules).unwrap()
}

fn minimal_engine() -> ValidationEngine {
    let schema = FormSchema::new(vec![Section::new(
        "Basics",
        vec![
            FieldDefinition::new("name", "Name", FieldType::Text).required(),
            FieldDefinition::new("github", "GitHub username", FieldType::Text),
        ],
    )])
    .unwrap();
    ValidationEngine::new(schema, FormRules::default()).unwrap()
}

fn new_session(engine: &ValidationEngine) -> FormSession<'_, RecordingSink, ErrorSlot> {
    FormSession::new(engine, None, RecordingSink::new(), ErrorSlot::new())
}

fn fill_roster(session: &mut FormSession<'_, RecordingSink, ErrorSlot>) {
    session.set_text("fname", "Ana").unwrap();
    session.set_text("lname", " Quispe ").unwrap();
    session.set_text("github", "@AnaQ").unwrap();
    session.set_text("email", "ana@mapbox.com").unwrap();
    session.set_text("cell", "+51 (987) 654-321").unwrap();
    session.groups().set_radio_value("office", "dc").unwrap();
}

#[test]
fn test_config_defaults_match_shipped_rules_file() {
    let rules = FormRules::load(config_path("form_rules.yaml")).unwrap();
    assert_eq!(rules, FormRules::default());
}

#[test]
fn test_minimal_end_to_end() {
    let engine = minimal_engine();
    let mut session = new_session(&engine);
    session.set_text("name", "Ana").unwrap();
    session.set_text("github", "@Ana ").unwrap();

    session.submit(&PeopleIndex::default()).unwrap();

    let record = session.sink().last_submitted().unwrap().clone();
    let expected: std::collections::BTreeMap<String, FieldValue> = [
        ("github".to_string(), FieldValue::text("ana")),
        ("name".to_string(), FieldValue::text("Ana")),
    ]
    .into_iter()
    .collect();
    assert_eq!(record.into_inner(), expected);
}

#[test]
fn test_full_roster_submission() {
    let engine = roster_engine();
    let mut session = new_session(&engine);
    fill_roster(&mut session);

    {
        let mut groups = session.groups();
        groups.toggle_checkbox_value("teams", "support", true).unwrap();
        groups.toggle_checkbox_value("teams", "engineering", true).unwrap();
        groups.add_pair_row("accounts").unwrap();
        groups.add_pair_row("accounts").unwrap();
        groups
            .set_pair_cell("accounts", 0, PairColumn::Name, "twitter")
            .unwrap();
        groups
            .set_pair_cell("accounts", 0, PairColumn::Value, "@anaq")
            .unwrap();
    }

    session.submit(&PeopleIndex::new(["octocat"])).unwrap();

    let record = session.sink().last_submitted().unwrap();
    assert_eq!(record.text("github"), Some("anaq"));
    assert_eq!(record.text("lname"), Some("Quispe"));
    assert_eq!(record.text("cell"), Some("+51987654321"));
    assert_eq!(
        record.get("teams"),
        Some(&FieldValue::Choices(vec![
            "support".to_string(),
            "engineering".to_string()
        ]))
    );
    assert_eq!(
        record.get("accounts"),
        Some(&FieldValue::Pairs(vec![PairRow::new("twitter", "@anaq")]))
    );
    assert!(!record.contains_key("city"));
    assert!(!record.contains_key("birthday"));
    assert_eq!(session.errors().current(), None);
}

#[test]
fn test_duplicate_identity_create_vs_edit() {
    let engine = minimal_engine();
    let people = PeopleIndex::new(["octocat"]);

    let mut create = new_session(&engine);
    create.set_text("name", "Octo").unwrap();
    create.set_text("github", "OctoCat").unwrap();
    let err = create.submit(&people).unwrap_err();
    assert_eq!(err.code(), "DUPLICATE_IDENTITY");
    assert!(create.sink().events().is_empty());

    let existing: ExistingRecord = [("name", "Octo"), ("github", "octocat")]
        .into_iter()
        .collect();
    let mut edit = FormSession::new(&engine, Some(existing), RecordingSink::new(), ErrorSlot::new());
    edit.set_text("github", "OctoCat").unwrap();
    edit.submit(&people).unwrap();
    assert_eq!(edit.sink().last_submitted().unwrap().text("github"), Some("octocat"));
}

#[test]
fn test_missing_required_lists_all_labels() {
    let engine = roster_engine();
    let mut session = new_session(&engine);
    fill_roster(&mut session);
    session.set_text("fname", "").unwrap();
    session.set_text("cell", "").unwrap();

    let err = session.submit(&PeopleIndex::default()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Missing required fields: \"First name\", \"Mobile number\""
    );
    assert_eq!(session.errors().current(), Some(err.message().as_str()));
}

#[test]
fn test_office_other_city_rule() {
    let engine = roster_engine();
    let mut session = new_session(&engine);
    fill_roster(&mut session);
    session.groups().set_radio_value("office", "other").unwrap();

    let err = session.submit(&PeopleIndex::default()).unwrap_err();
    assert!(matches!(err, ValidationError::ConditionalRuleViolation { .. }));
    assert_eq!(
        err.message(),
        "You selected \"Other\" under \"Mapbox Office\" which requires the \"City\" field to be filled out."
    );

    session.set_text("city", "Lima").unwrap();
    session.submit(&PeopleIndex::default()).unwrap();
    assert_eq!(
        session.sink().last_submitted().unwrap().text("city"),
        Some("Lima")
    );
}

#[test]
fn test_peru_office_dni_rule() {
    let engine = roster_engine();
    let mut session = new_session(&engine);
    fill_roster(&mut session);
    session.groups().set_radio_value("office", "ayacucho").unwrap();

    let err = session.submit(&PeopleIndex::default()).unwrap_err();
    assert_eq!(
        err.message(),
        "Because you selected \"Peru\" as your home office, please provide a value for \"DNI Number\""
    );

    session.set_text("dni", "12345678").unwrap();
    assert!(session.submit(&PeopleIndex::default()).is_ok());
}

#[test]
fn test_non_org_email_rejected() {
    let engine = roster_engine();
    let mut session = new_session(&engine);
    fill_roster(&mut session);
    session.set_text("email", "ana@gmail.com").unwrap();

    let err = session.submit(&PeopleIndex::default()).unwrap_err();
    assert_eq!(err.code(), "INVALID_EMAIL_DOMAIN");
    assert_eq!(
        session.errors().current(),
        Some("ana@gmail.com should be a valid @mapbox.com email")
    );
}

#[test]
fn test_error_slot_cleared_after_successful_submit() {
    let engine = roster_engine();
    let mut session = new_session(&engine);
    fill_roster(&mut session);
    session.set_text("cell", "call me").unwrap();

    assert!(session.submit(&PeopleIndex::default()).is_err());
    assert_eq!(
        session.errors().current(),
        Some("Mobile number must be a valid number")
    );

    session.set_text("cell", "555 0100").unwrap();
    session.submit(&PeopleIndex::default()).unwrap();
    assert_eq!(session.errors().current(), None);
}

#[test]
fn test_confirmed_delete() {
    let engine = minimal_engine();
    let existing: ExistingRecord = [("name", "Octo"), ("github", "octocat")]
        .into_iter()
        .collect();
    let mut session = FormSession::new(&engine, Some(existing), RecordingSink::new(), ErrorSlot::new());

    assert!(session.delete("Octocat").is_err());
    assert_eq!(
        session.errors().current(),
        Some("GitHub username was not entered correctly.")
    );

    session.delete("octocat").unwrap();
    assert_eq!(
        session.sink().events(),
        &[SinkEvent::Destroyed("octocat".to_string())]
    );
}

#[test]
fn test_payload_with_unknown_field_rejected() {
    let engine = minimal_engine();
    let mut session = new_session(&engine);
    let payload: ExistingRecord =
        serde_json::from_str(r#"{"name": "Ana", "favorite_color": "teal"}"#).unwrap();

    assert!(session.apply_values(&payload).is_err());
    assert_eq!(session.state().text("name"), "");
}

#[test]
fn test_normalized_record_json_shape() {
    let engine = roster_engine();
    let mut session = new_session(&engine);
    fill_roster(&mut session);
    session.groups().add_pair_row("accounts").unwrap();
    session
        .groups()
        .set_pair_cell("accounts", 0, PairColumn::Name, "irc")
        .unwrap();

    session.submit(&PeopleIndex::default()).unwrap();

    let json = serde_json::to_value(session.sink().last_submitted().unwrap()).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "accounts": [{"name": "irc", "value": ""}],
            "cell": "+51987654321",
            "email": "ana@mapbox.com",
            "fname": "Ana",
            "github": "anaq",
            "lname": "Quispe",
            "office": "dc"
        })
    );
}
