//! Existing people, for the identity uniqueness check.

use serde_json::Value;

/// Read-only set of identity values already taken.
///
/// Lookups are case-insensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeopleIndex {
    identities: Vec<String>,
}

impl PeopleIndex {
    pub fn new<I, S>(identities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            identities: identities.into_iter().map(Into::into).collect(),
        }
    }

    /// Build from JSON person records, reading `identity_field` from each.
    ///
    /// Records without a string identity are skipped.
    pub fn from_records<'a, I>(records: I, identity_field: &str) -> Self
    where
        I: IntoIterator<Item = &'a Value>,
    {
        Self {
            identities: records
                .into_iter()
                .filter_map(|record| record.get(identity_field)?.as_str())
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }

    pub fn contains_identity(&self, identity: &str) -> bool {
        let wanted = identity.to_lowercase();
        self.identities
            .iter()
            .any(|existing| existing.to_lowercase() == wanted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_case_insensitive_lookup() {
        let people = PeopleIndex::new(["octocat", "Hubot"]);
        assert!(people.contains_identity("OctoCat"));
        assert!(people.contains_identity("hubot"));
        assert!(!people.contains_identity("monalisa"));
    }

    #[test]
    fn test_from_records_skips_missing_identity() {
        let records = json!([
            {"github": "octocat", "name": "Octo"},
            {"name": "No Handle"},
            {"github": 42}
        ]);
        let people = PeopleIndex::from_records(records.as_array().unwrap(), "github");

        assert_eq!(people.len(), 1);
        assert!(people.contains_identity("octocat"));
    }
}
