// Heading validator
// Checks that a model output carries every section the parser needs

use crate::domain::{Predicate, PredicateRegistry};
use crate::parser::{has_heading, list_headings};
use crate::validation::traits::{ErrorKind, ValidationOutcome, Validator};

/// Headings every action answer must contain, in the order they are expected.
pub const REQUIRED_HEADINGS: &[&str] = &["Parameters", "Preconditions", "Effects", "New Predicates"];

/// Validator that checks required headings are present.
pub struct HeaderValidator {
    /// Headings to require
    pub required: Vec<String>,
    /// Description of what this validator checks
    pub description: String,
}

impl HeaderValidator {
    pub fn new(required: Vec<String>) -> Self {
        Self {
            required,
            description: "heading validator".to_string(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Find the first missing heading
    pub fn missing_heading(&self, output: &str) -> Option<&str> {
        self.required
            .iter()
            .find(|heading| !has_heading(output, heading))
            .map(String::as_str)
    }
}

impl Default for HeaderValidator {
    fn default() -> Self {
        Self::new(REQUIRED_HEADINGS.iter().map(|h| h.to_string()).collect())
    }
}

impl Validator for HeaderValidator {
    fn validate(&self, output: &str, _current: &PredicateRegistry, _new: &[Predicate]) -> ValidationOutcome {
        match self.missing_heading(output) {
            Some(heading) => {
                let expected = self
                    .required
                    .iter()
                    .map(|h| format!("'### Action {}'", h))
                    .collect::<Vec<_>>()
                    .join(", ");
                let found = list_headings(output);
                let found = if found.is_empty() {
                    "none".to_string()
                } else {
                    found.iter().map(|h| format!("'{}'", h)).collect::<Vec<_>>().join(", ")
                };
                ValidationOutcome::fail(
                    ErrorKind::InvalidHeader,
                    format!(
                        "Your answer is missing the '{}' section. Keep the required output format and \
                         include every one of these headings: {}. Headings found: {}.",
                        heading, expected, found
                    ),
                )
                .with_detail(heading)
            }
            None => ValidationOutcome::pass(),
        }
    }

    fn description(&self) -> &str {
        &self.description
    }
}
