//! Field validators
//!
//! Pure predicates used by the validation pipeline.

use std::sync::LazyLock;

use regex::Regex;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@((?:[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?\.)+[A-Za-z]{2,})$")
        .unwrap()
});

/// Leading-integer parse: optional whitespace, optional sign, one digit.
static LEADING_INT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*[+\-]?\d").unwrap());

/// Domain part of a syntactically valid email address.
pub fn email_domain(email: &str) -> Option<&str> {
    EMAIL_RE
        .captures(email)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// True when the text begins with an integer, ignoring anything after it.
///
/// `"555-0100"` and `"+51 987"` pass; `"(555) 0100"` and `""` do not.
pub fn parses_as_integer(text: &str) -> bool {
    LEADING_INT_RE.is_match(text)
}

/// Accepts addresses on the organization's domains or their subdomains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrgEmailValidator {
    domains: Vec<String>,
}

impl OrgEmailValidator {
    /// Domains are matched case-insensitively; a leading `@` is ignored.
    /// An empty list accepts any well-formed address.
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            domains: domains
                .into_iter()
                .map(|d| d.as_ref().trim().trim_start_matches('@').to_lowercase())
                .filter(|d| !d.is_empty())
                .collect(),
        }
    }

    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    pub fn is_valid(&self, email: &str) -> bool {
        let Some(domain) = email_domain(email.trim()) else {
            return false;
        };
        if self.domains.is_empty() {
            return true;
        }

        let domain = domain.to_lowercase();
        self.domains.iter().any(|accepted| {
            domain == *accepted
                || domain
                    .strip_suffix(accepted.as_str())
                    .is_some_and(|prefix| prefix.ends_with('.'))
        })
    }
}
