//! Form session
//!
//! One session per form on screen: it owns the form state, knows whether it
//! is creating a new record or editing an existing one, and routes results to
//! the submission sink and error display.

use tracing::{info, warn};

use crate::engine::ValidationEngine;
use crate::error::{SchemaError, ValidationError};
use crate::groups::FieldGroupState;
use crate::people::PeopleIndex;
use crate::sink::{ErrorDisplay, SubmissionSink};
use crate::state::{ExistingRecord, FormState};

pub struct FormSession<'e, S, D> {
    engine: &'e ValidationEngine,
    existing: Option<ExistingRecord>,
    state: FormState,
    sink: S,
    errors: D,
}

impl<'e, S, D> FormSession<'e, S, D>
where
    S: SubmissionSink,
    D: ErrorDisplay,
{
    /// Start a session; passing an existing record puts it in edit mode.
    pub fn new(
        engine: &'e ValidationEngine,
        existing: Option<ExistingRecord>,
        sink: S,
        errors: D,
    ) -> Self {
        let state = FormState::seeded(engine.schema(), existing.as_ref());
        Self {
            engine,
            existing,
            state,
            sink,
            errors,
        }
    }

    pub fn is_editing(&self) -> bool {
        self.existing.is_some()
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn errors(&self) -> &D {
        &self.errors
    }

    pub fn into_parts(self) -> (FormState, S, D) {
        (self.state, self.sink, self.errors)
    }

    pub fn set_text(&mut self, key: &str, text: impl Into<String>) -> Result<(), SchemaError> {
        self.state.set_text(self.engine.schema(), key, text)
    }

    /// Overwrite several fields at once, e.g. from a submitted payload.
    pub fn apply_values(&mut self, values: &ExistingRecord) -> Result<(), SchemaError> {
        self.state.merge(self.engine.schema(), values)
    }

    pub fn groups(&mut self) -> FieldGroupState<'_> {
        self.state.groups(self.engine.schema())
    }

    /// Record an edit to the identity field.
    ///
    /// The value is stored lower-cased. When creating, an identity that is
    /// already taken is reported right away; submit checks it again.
    pub fn set_identity(&mut self, people: &PeopleIndex, text: &str) -> Result<(), SchemaError> {
        let value = text.to_lowercase();
        let identity_field = self.engine.identity_field().to_string();
        self.set_text(&identity_field, value.as_str())?;

        if !self.is_editing() && self.engine.is_identity_taken(people, &value) {
            let err = ValidationError::DuplicateIdentity {
                identity: self.engine.canonical_identity(&value),
            };
            warn!(code = err.code(), "identity already taken");
            self.errors.show(&err.message());
        }
        Ok(())
    }

    /// Validate and hand the normalized record to the sink.
    ///
    /// On failure the message goes to the error display and the form state is
    /// left as it was, so the user can correct it and submit again.
    pub fn submit(&mut self, people: &PeopleIndex) -> Result<(), ValidationError> {
        let schema = self.engine.schema();
        let mut committed = self.state.clone();
        committed.groups(schema).commit();

        match self
            .engine
            .validate_and_normalize(&committed, people, self.is_editing())
        {
            Ok(record) => {
                info!(fields = record.len(), editing = self.is_editing(), "submitting record");
                self.errors.clear();
                self.sink.submit(record);
                Ok(())
            }
            Err(err) => {
                warn!(code = err.code(), "submission rejected");
                self.errors.show(&err.message());
                Err(err)
            }
        }
    }

    /// Delete the record being edited once the user re-types its identity.
    ///
    /// The typed text must match the stored identity exactly, case included.
    pub fn delete(&mut self, typed_identity: &str) -> Result<(), ValidationError> {
        let identity_field = self.engine.identity_field();
        let stored = self
            .existing
            .as_ref()
            .and_then(|record| record.identity(identity_field))
            .map(str::to_string);

        match stored {
            Some(identity) if identity == typed_identity => {
                info!(identity = %identity, "deleting record");
                self.sink.destroy(&identity);
                Ok(())
            }
            _ => {
                let err = ValidationError::ConfirmationMismatch {
                    label: self.engine.schema().label_for(identity_field).to_string(),
                };
                warn!(code = err.code(), "delete confirmation mismatch");
                self.errors.show(&err.message());
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::FormRules;
    use crate::schema::{FieldDefinition, FieldType, FormSchema, Section};
    use crate::sink::{ErrorSlot, RecordingSink, SinkEvent};
    use crate::value::{FieldValue, PairColumn};

    fn engine() -> ValidationEngine {
        let schema = FormSchema::new(vec![Section::new(
            "Basics",
            vec![
                FieldDefinition::new("name", "Name", FieldType::Text).required(),
                FieldDefinition::new("github", "GitHub username", FieldType::Text).required(),
                FieldDefinition::new("links", "Links", FieldType::Add).required(),
            ],
        )])
        .unwrap();
        ValidationEngine::new(schema, FormRules::default()).unwrap()
    }

    #[test]
    fn test_live_identity_check_reports_duplicate() {
        let engine = engine();
        let people = PeopleIndex::new(["octocat"]);
        let mut session = FormSession::new(&engine, None, RecordingSink::new(), ErrorSlot::new());

        session.set_identity(&people, "OctoCat").unwrap();

        assert_eq!(session.state().text("github"), "octocat");
        assert_eq!(
            session.errors().current(),
            Some("User \"octocat\" already exists.")
        );
    }

    #[test]
    fn test_live_identity_check_skipped_when_editing() {
        let engine = engine();
        let people = PeopleIndex::new(["octocat"]);
        let existing: ExistingRecord = [("github", "octocat")].into_iter().collect();
        let mut session =
            FormSession::new(&engine, Some(existing), RecordingSink::new(), ErrorSlot::new());

        session.set_identity(&people, "OctoCat").unwrap();
        assert_eq!(session.errors().current(), None);
    }

    #[test]
    fn test_blank_pair_rows_do_not_satisfy_required() {
        let engine = engine();
        let mut session = FormSession::new(&engine, None, RecordingSink::new(), ErrorSlot::new());
        session.set_text("name", "Ana").unwrap();
        session.set_identity(&PeopleIndex::default(), "ana").unwrap();
        session.groups().add_pair_row("links").unwrap();

        let err = session.submit(&PeopleIndex::default()).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingRequiredFields {
                labels: vec!["Links".to_string()]
            }
        );
        // State is untouched by the failed submit.
        assert_eq!(session.state().get("links").as_pairs().unwrap().len(), 1);

        session
            .groups()
            .set_pair_cell("links", 0, PairColumn::Value, "https://ana.dev")
            .unwrap();
        session.submit(&PeopleIndex::default()).unwrap();

        let (_, sink, errors) = session.into_parts();
        assert_eq!(errors.current(), None);
        let record = sink.last_submitted().unwrap();
        assert_eq!(record.text("github"), Some("ana"));
        assert!(matches!(record.get("links"), Some(FieldValue::Pairs(rows)) if rows.len() == 1));
    }

    #[test]
    fn test_delete_requires_exact_identity() {
        let engine = engine();
        let existing: ExistingRecord = [("github", "octocat")].into_iter().collect();
        let mut session =
            FormSession::new(&engine, Some(existing), RecordingSink::new(), ErrorSlot::new());

        let err = session.delete("Octocat").unwrap_err();
        assert_eq!(err.code(), "CONFIRMATION_MISMATCH");
        assert_eq!(
            session.errors().current(),
            Some("GitHub username was not entered correctly.")
        );
        assert!(session.sink().events().is_empty());

        session.delete("octocat").unwrap();
        assert_eq!(
            session.sink().events(),
            &[SinkEvent::Destroyed("octocat".to_string())]
        );
    }

    #[test]
    fn test_delete_without_existing_record_fails() {
        let engine = engine();
        let mut session = FormSession::new(&engine, None, RecordingSink::new(), ErrorSlot::new());
        assert!(session.delete("").is_err());
        assert!(session.sink().events().is_empty());
    }
}
