//! Roster Form - schema-driven form validation and normalization.
//!
//! A form is described by a [`FormSchema`]: ordered sections of typed fields
//! (text, textarea, date, hidden, radio, checkbox, repeatable name/value
//! pairs). A [`FormSession`] collects values into a [`FormState`], and on
//! submit the [`ValidationEngine`] runs the business rules and produces a
//! [`NormalizedRecord`] for the [`SubmissionSink`].
//!
//! ```text
//! FieldGroupState ──mutates──> FormState ──submit──> ValidationEngine
//!                                                      │
//!                                 ErrorDisplay <──err──┤
//!                                                      └──ok──> SubmissionSink
//! ```
//!
//! # Example
//!
//! ```
//! use roster_form::{
//!     ErrorSlot, FieldDefinition, FieldType, FormRules, FormSchema, FormSession, PeopleIndex,
//!     RecordingSink, Section, ValidationEngine,
//! };
//!
//! let schema = FormSchema::new(vec![Section::new(
//!     "Basics",
//!     vec![
//!         FieldDefinition::new("name", "Name", FieldType::Text).required(),
//!         FieldDefinition::new("github", "GitHub username", FieldType::Text),
//!     ],
//! )])
//! .unwrap();
//! let engine = ValidationEngine::new(schema, FormRules::default()).unwrap();
//! let people = PeopleIndex::default();
//!
//! let mut session = FormSession::new(&engine, None, RecordingSink::new(), ErrorSlot::new());
//! session.set_text("name", "Ana").unwrap();
//! session.set_text("github", "@Ana ").unwrap();
//! session.submit(&people).unwrap();
//!
//! let record = session.sink().last_submitted().unwrap();
//! assert_eq!(record.text("github"), Some("ana"));
//! ```

pub mod engine;
pub mod error;
pub mod groups;
pub mod normalize;
pub mod people;
pub mod rules;
pub mod schema;
pub mod session;
pub mod sink;
pub mod state;
pub mod validators;
pub mod value;

// Re-exports
pub use engine::ValidationEngine;
pub use error::{SchemaError, ValidationError};
pub use groups::{handler_for, Control, FieldGroupState, FieldHandler, FieldView, OptionView};
pub use normalize::{NormalizedRecord, Normalizer};
pub use people::PeopleIndex;
pub use rules::{ConditionalRule, FormRules};
pub use schema::{FieldDefinition, FieldKind, FieldOption, FieldType, FormSchema, Section};
pub use session::FormSession;
pub use sink::{ErrorDisplay, ErrorSlot, RecordingSink, SinkEvent, SubmissionSink};
pub use state::{ExistingRecord, FormState};
pub use validators::OrgEmailValidator;
pub use value::{FieldValue, PairColumn, PairRow};
