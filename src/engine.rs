//! Submit-time validation pipeline
//!
//! Stages run in a fixed order and stop at the first failure:
//! 1. Identity uniqueness (create mode only)
//! 2. Required fields (all missing labels reported together)
//! 3. Mobile number format
//! 4. Conditional rules, in configured order
//! 5. Organization email
//! 6. Normalization
//!
//! The engine is built once per schema; rule wiring is checked at that point
//! so a bad configuration never surfaces as a submit-time error.

use tracing::{debug, info};

use crate::error::{SchemaError, ValidationError};
use crate::normalize::{normalize_identity, trim_sentinel, NormalizedRecord, Normalizer};
use crate::people::PeopleIndex;
use crate::rules::{ConditionalRule, FormRules};
use crate::schema::FormSchema;
use crate::state::FormState;
use crate::validators::{parses_as_integer, OrgEmailValidator};
use crate::value::FieldValue;

#[derive(Debug, Clone)]
pub struct ValidationEngine {
    schema: FormSchema,
    rules: FormRules,
    email_validator: OrgEmailValidator,
    normalizer: Normalizer,
    check_identity: bool,
    check_mobile: bool,
    check_email: bool,
}

impl ValidationEngine {
    pub fn new(schema: FormSchema, rules: FormRules) -> Result<Self, SchemaError> {
        rules.check_against(&schema)?;

        let check_identity = schema.contains(&rules.identity_field);
        let check_mobile = schema.contains(&rules.mobile_field);
        let check_email = schema.contains(&rules.email_field);
        debug!(
            check_identity,
            check_mobile, check_email, "validation stages enabled by schema"
        );

        Ok(Self {
            email_validator: OrgEmailValidator::new(&rules.email_domains),
            normalizer: Normalizer::new(&rules.identity_field, &rules.mobile_field),
            schema,
            rules,
            check_identity,
            check_mobile,
            check_email,
        })
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn rules(&self) -> &FormRules {
        &self.rules
    }

    pub fn identity_field(&self) -> &str {
        &self.rules.identity_field
    }

    /// Identity in the form it is stored and compared in.
    pub fn canonical_identity(&self, raw: &str) -> String {
        trim_sentinel(&normalize_identity(raw))
    }

    /// True when the identity is non-empty and already in the index.
    pub fn is_identity_taken(&self, people: &PeopleIndex, raw: &str) -> bool {
        let identity = self.canonical_identity(raw);
        !identity.is_empty() && people.contains_identity(&identity)
    }

    /// Run every stage against `state` and produce the cleaned record.
    pub fn validate_and_normalize(
        &self,
        state: &FormState,
        people: &PeopleIndex,
        is_editing: bool,
    ) -> Result<NormalizedRecord, ValidationError> {
        self.check_unique_identity(state, people, is_editing)?;
        self.check_required(state)?;
        self.check_mobile_number(state)?;
        self.check_conditional_rules(state)?;
        self.check_org_email(state)?;

        let record = self.normalizer.normalize(state.clone().into_values());
        info!(fields = record.len(), "form validated and normalized");
        Ok(record)
    }

    fn check_unique_identity(
        &self,
        state: &FormState,
        people: &PeopleIndex,
        is_editing: bool,
    ) -> Result<(), ValidationError> {
        debug!(is_editing, "stage: identity uniqueness");
        if is_editing || !self.check_identity {
            return Ok(());
        }

        let raw = state.text(&self.rules.identity_field);
        if self.is_identity_taken(people, raw) {
            return Err(ValidationError::DuplicateIdentity {
                identity: self.canonical_identity(raw),
            });
        }
        Ok(())
    }

    fn check_required(&self, state: &FormState) -> Result<(), ValidationError> {
        debug!("stage: required fields");
        let labels: Vec<String> = self
            .schema
            .fields()
            .filter(|field| field.required && state.get(&field.key).is_empty())
            .map(|field| field.label.clone())
            .collect();

        if labels.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::MissingRequiredFields { labels })
        }
    }

    fn check_mobile_number(&self, state: &FormState) -> Result<(), ValidationError> {
        debug!("stage: mobile number");
        if !self.check_mobile {
            return Ok(());
        }

        let field = &self.rules.mobile_field;
        let value = state.text(field);
        if !value.is_empty() && !parses_as_integer(value) {
            return Err(ValidationError::InvalidFormat {
                field: field.clone(),
                label: self.schema.label_for(field).to_string(),
            });
        }
        Ok(())
    }

    fn check_conditional_rules(&self, state: &FormState) -> Result<(), ValidationError> {
        debug!(rules = self.rules.conditional_rules.len(), "stage: conditional rules");
        match self
            .rules
            .conditional_rules
            .iter()
            .find(|rule| is_violated(rule, state))
        {
            Some(rule) => Err(ValidationError::ConditionalRuleViolation {
                trigger_field: rule.when_field.clone(),
                dependent_field: rule.require.clone(),
                message: rule.message_for(&self.schema),
            }),
            None => Ok(()),
        }
    }

    fn check_org_email(&self, state: &FormState) -> Result<(), ValidationError> {
        debug!("stage: organization email");
        if !self.check_email {
            return Ok(());
        }

        let value = state.text(&self.rules.email_field);
        if !self.email_validator.is_valid(value) {
            return Err(ValidationError::InvalidEmailDomain {
                value: value.to_string(),
                domains: self.email_validator.domains().to_vec(),
            });
        }
        Ok(())
    }
}

fn is_violated(rule: &ConditionalRule, state: &FormState) -> bool {
    let triggered = match state.get(&rule.when_field) {
        FieldValue::Text(text) => *text == rule.equals,
        FieldValue::Choices(choices) => choices.iter().any(|c| *c == rule.equals),
        FieldValue::Pairs(_) => false,
    };
    triggered && state.get(&rule.require).is_empty()
}
