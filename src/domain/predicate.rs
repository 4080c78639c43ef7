//! Typed predicates discovered while constructing actions.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ordered mapping of `?variable` to type name. Declaration order matters:
/// argument positions in predicate atoms are matched against it.
pub type ParamMap = IndexMap<String, String>;

/// A named, typed relation usable in preconditions and effects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Predicate {
    /// Unique key within a registry
    pub name: String,

    /// Free-text meaning of the predicate
    pub description: String,

    /// The line this predicate was extracted from
    pub raw_text: String,

    /// Parameters in declaration order
    pub params: ParamMap,

    /// Canonical rendering, `(name ?p1 - t1 ?p2 - t2): description`
    pub clean_text: String,
}

impl Predicate {
    /// Create a predicate; `clean_text` is derived from the other fields.
    pub fn new(
        name: impl Into<String>,
        params: ParamMap,
        description: impl Into<String>,
        raw_text: impl Into<String>,
    ) -> Self {
        let name = name.into();
        let description = description.into();
        let clean_text = format!("{}: {}", signature(&name, &params), description);
        Self {
            name,
            description,
            raw_text: raw_text.into(),
            params,
            clean_text,
        }
    }

    /// The `(name ?p - t ...)` form used in a PDDL `:predicates` block.
    pub fn signature(&self) -> String {
        signature(&self.name, &self.params)
    }

    /// Parameter types in declaration order.
    pub fn param_types(&self) -> Vec<&str> {
        self.params.values().map(String::as_str).collect()
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

fn signature(name: &str, params: &ParamMap) -> String {
    let mut out = format!("({}", name);
    for (var, ty) in params {
        out.push_str(&format!(" {} - {}", var, ty));
    }
    out.push(')');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> ParamMap {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_clean_text_rendering() {
        let p = Predicate::new(
            "on",
            params(&[("?b1", "block"), ("?b2", "block")]),
            "block b1 is on block b2",
            "1. on ?b1 - block ?b2 - block: block b1 is on block b2",
        );
        assert_eq!(p.clean_text, "(on ?b1 - block ?b2 - block): block b1 is on block b2");
        assert_eq!(p.signature(), "(on ?b1 - block ?b2 - block)");
    }

    #[test]
    fn test_nullary_predicate() {
        let p = Predicate::new("handempty", ParamMap::new(), "the hand is empty", "");
        assert_eq!(p.signature(), "(handempty)");
        assert_eq!(p.arity(), 0);
    }

    #[test]
    fn test_param_types_keep_declaration_order() {
        let p = Predicate::new(
            "at",
            params(&[("?t", "truck"), ("?l", "location")]),
            "truck t is at l",
            "",
        );
        assert_eq!(p.param_types(), vec!["truck", "location"]);
    }
}
