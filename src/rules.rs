//! Business rule configuration
//!
//! Which field is the identity key, which one holds the mobile number, which
//! email domains are accepted, and which "field X has value V requires field
//! Y" rules apply. Loaded from YAML; the defaults match
//! `config/form_rules.yaml`.
//!
//! A designated field the schema does not declare switches its stage off.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::SchemaError;
use crate::schema::FormSchema;

/// Environment variable naming a rules file.
pub const RULES_PATH_ENV: &str = "FORM_RULES_PATH";

const DEFAULT_RULES_PATH: &str = "config/form_rules.yaml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormRules {
    /// Unique, case-insensitive username-like key.
    pub identity_field: String,
    /// Must parse as an integer; normalized as a telephone number.
    pub mobile_field: String,
    /// Must be an address on one of `email_domains`.
    pub email_field: String,
    pub email_domains: Vec<String>,
    /// Evaluated in order after the mobile check.
    pub conditional_rules: Vec<ConditionalRule>,
}

/// "When `when_field` equals `equals`, `require` must be filled out."
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionalRule {
    pub when_field: String,
    pub equals: String,
    pub require: String,
    /// Overrides the generated message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ConditionalRule {
    pub fn new(
        when_field: impl Into<String>,
        equals: impl Into<String>,
        require: impl Into<String>,
    ) -> Self {
        Self {
            when_field: when_field.into(),
            equals: equals.into(),
            require: require.into(),
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Message shown when the rule is violated, using schema labels.
    pub fn message_for(&self, schema: &FormSchema) -> String {
        if let Some(message) = &self.message {
            return message.clone();
        }

        let option_label = schema
            .field(&self.when_field)
            .and_then(|field| field.option_label(&self.equals))
            .unwrap_or(self.equals.as_str());

        format!(
            "You selected \"{}\" under \"{}\" which requires the \"{}\" field to be filled out.",
            option_label,
            schema.label_for(&self.when_field),
            schema.label_for(&self.require),
        )
    }
}

impl Default for FormRules {
    fn default() -> Self {
        Self {
            identity_field: "github".to_string(),
            mobile_field: "cell".to_string(),
            email_field: "email".to_string(),
            email_domains: vec!["mapbox.com".to_string()],
            conditional_rules: vec![
                ConditionalRule::new("office", "other", "city"),
                ConditionalRule::new("office", "ayacucho", "dni").with_message(
                    "Because you selected \"Peru\" as your home office, please provide a value for \"DNI Number\"",
                ),
            ],
        }
    }
}

impl FormRules {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse form rules YAML")
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading form rules from {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let rules = Self::from_yaml_str(&content)
            .with_context(|| format!("Invalid form rules in {}", path.display()))?;

        info!(
            "Loaded {} conditional rules, {} email domains",
            rules.conditional_rules.len(),
            rules.email_domains.len()
        );
        Ok(rules)
    }

    /// Resolve rules from the environment.
    ///
    /// Resolution order:
    /// 1. `FORM_RULES_PATH` (a bad file is an error)
    /// 2. `config/form_rules.yaml` relative to the working directory
    /// 3. Built-in defaults
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = std::env::var(RULES_PATH_ENV) {
            return Self::load(path);
        }
        if Path::new(DEFAULT_RULES_PATH).exists() {
            return Self::load(DEFAULT_RULES_PATH);
        }
        info!("No form rules file found, using defaults");
        Ok(Self::default())
    }

    /// Check rule wiring against a schema.
    ///
    /// A rule whose trigger field exists but whose dependent field does not
    /// could never be satisfied, so it is rejected. Rules triggered by fields
    /// the schema lacks never fire and are accepted.
    pub fn check_against(&self, schema: &FormSchema) -> Result<(), SchemaError> {
        for rule in &self.conditional_rules {
            if schema.contains(&rule.when_field) && !schema.contains(&rule.require) {
                return Err(SchemaError::UnknownRuleField {
                    setting: format!("conditional_rules[{}={}].require", rule.when_field, rule.equals),
                    key: rule.require.clone(),
                });
            }
        }
        Ok(())
    }
}
