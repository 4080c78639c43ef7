// Validation interfaces

use serde::{Deserialize, Serialize};

use crate::domain::{Predicate, PredicateRegistry};

/// Why an attempt was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Output could not be parsed into an action at all
    ParseError,
    /// A required heading is absent
    InvalidHeader,
    /// An expression uses a keyword the domain does not support
    UnsupportedKeyword,
    /// An action parameter has an unknown type
    InvalidParamType,
    /// A new predicate reuses a type or action name
    InvalidPredicateName,
    /// A new predicate parameter has an unknown type
    InvalidPredicateFormat,
    /// An atom names an unknown predicate, has the wrong arity or an unbound variable
    InvalidPredicateUsage,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ParseError => "parse_error",
            ErrorKind::InvalidHeader => "invalid_header",
            ErrorKind::UnsupportedKeyword => "unsupported_keyword",
            ErrorKind::InvalidParamType => "invalid_param_type",
            ErrorKind::InvalidPredicateName => "invalid_predicate_name",
            ErrorKind::InvalidPredicateFormat => "invalid_predicate_format",
            ErrorKind::InvalidPredicateUsage => "invalid_predicate_usage",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Verdict on one model output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    /// Whether the output is acceptable
    pub ok: bool,
    /// Failure category, `None` when `ok`
    pub kind: Option<ErrorKind>,
    /// The offending token or atom, when there is one
    pub detail: Option<String>,
    /// Feedback text addressed to the model
    pub message: String,
}

impl ValidationOutcome {
    pub fn pass() -> Self {
        Self {
            ok: true,
            kind: None,
            detail: None,
            message: String::new(),
        }
    }

    pub fn fail(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            kind: Some(kind),
            detail: None,
            message: message.into(),
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl Default for ValidationOutcome {
    fn default() -> Self {
        Self::pass()
    }
}

/// Checks one model output against the predicates in force.
pub trait Validator: Send + Sync {
    /// # Arguments
    /// * `output` - The raw model output for one action
    /// * `current` - Predicates already in the registry
    /// * `new_predicates` - Predicates the output declares
    fn validate(&self, output: &str, current: &PredicateRegistry, new_predicates: &[Predicate]) -> ValidationOutcome;

    /// Get a description of what this validator checks
    fn description(&self) -> &str {
        "validator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass() {
        let outcome = ValidationOutcome::pass();
        assert!(outcome.ok);
        assert!(outcome.kind.is_none());
        assert!(outcome.message.is_empty());
    }

    #[test]
    fn test_fail_with_detail() {
        let outcome =
            ValidationOutcome::fail(ErrorKind::InvalidParamType, "unknown type 'blok'").with_detail("blok");
        assert!(!outcome.ok);
        assert_eq!(outcome.kind, Some(ErrorKind::InvalidParamType));
        assert_eq!(outcome.detail.as_deref(), Some("blok"));
    }

    #[test]
    fn test_error_kind_serialization() {
        let json = serde_json::to_string(&ErrorKind::InvalidPredicateUsage).unwrap();
        assert_eq!(json, "\"invalid_predicate_usage\"");
        assert_eq!(ErrorKind::ParseError.to_string(), "parse_error");
    }
}
