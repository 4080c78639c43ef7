//! PDDL fragments and domain assembly
//!
//! The construction core only produces flat text fragments. This module
//! parses them into a small expression tree where structure matters, and
//! stitches the final predicate, type and action text into one domain file
//! for an external planner.

mod expr;

use indexmap::IndexMap;

use crate::domain::{Action, Predicate, TypeNode};

pub use expr::{Expr, ExprError, parse_all};

/// Logical and numeric operators that are never predicate atoms.
pub const KEYWORDS: &[&str] = &[
    "and", "or", "not", "imply", "forall", "exists", "when", "=", "<", ">", "<=", ">=", "+", "-", "*", "/",
    "increase", "decrease", "assign", "scale-up", "scale-down",
];

/// Operators whose arguments are numeric terms rather than formulas.
pub const NUMERIC_OPERATORS: &[&str] = &[
    "=", "<", ">", "<=", ">=", "+", "-", "*", "/", "increase", "decrease", "assign", "scale-up", "scale-down",
];

pub fn is_keyword(token: &str) -> bool {
    KEYWORDS.contains(&token)
}

/// Default `:requirements` for generated domains.
pub fn default_requirements() -> Vec<String> {
    vec![
        ":strips".to_string(),
        ":typing".to_string(),
        ":negative-preconditions".to_string(),
        ":disjunctive-preconditions".to_string(),
        ":universal-preconditions".to_string(),
        ":existential-preconditions".to_string(),
    ]
}

/// `child1 child2 - parent` lines, grouped by parent in pre-order.
pub fn render_types(types: &TypeNode) -> String {
    let mut groups: IndexMap<String, Vec<String>> = IndexMap::new();
    for (child, parent) in types.parent_pairs() {
        groups.entry(parent).or_default().push(child);
    }
    groups
        .iter()
        .map(|(parent, children)| format!("{} - {}", children.join(" "), parent))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_predicates(predicates: &[Predicate]) -> String {
    predicates
        .iter()
        .map(|p| format!("{} ; {}", p.signature(), p.description))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_action(action: &Action) -> String {
    let params = action
        .parameters
        .iter()
        .map(|(var, ty)| format!("{} - {}", var, ty))
        .collect::<Vec<_>>()
        .join(" ");
    format!(
        "(:action {}\n    :parameters ({})\n    :precondition\n{}\n    :effect\n{}\n)",
        action.name,
        params,
        indent(non_empty(&action.preconditions), 8),
        indent(non_empty(&action.effects), 8),
    )
}

fn non_empty(expr: &str) -> &str {
    if expr.trim().is_empty() { "(and)" } else { expr.trim() }
}

fn indent(text: &str, width: usize) -> String {
    let pad = " ".repeat(width);
    text.lines().map(|l| format!("{}{}", pad, l)).collect::<Vec<_>>().join("\n")
}

/// Assemble a complete `(define (domain ...))` text.
pub fn render_domain(
    name: &str,
    requirements: &[String],
    types: &TypeNode,
    predicates: &[Predicate],
    actions: &[Action],
) -> String {
    let mut out = format!("(define (domain {})\n", name);
    out.push_str(&format!("    (:requirements {})\n", requirements.join(" ")));

    let types_text = render_types(types);
    if !types_text.is_empty() {
        out.push_str(&format!("    (:types\n{}\n    )\n", indent(&types_text, 8)));
    }

    out.push_str(&format!("    (:predicates\n{}\n    )\n", indent(&render_predicates(predicates), 8)));

    for action in actions {
        out.push('\n');
        out.push_str(&indent(&render_action(action), 4));
        out.push('\n');
    }
    out.push(')');
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ParamMap;

    fn blocks() -> TypeNode {
        TypeNode::root()
            .with_child(TypeNode::new("block", ""))
            .with_child(TypeNode::new("table", ""))
    }

    #[test]
    fn test_render_types_grouped() {
        let types = TypeNode::root()
            .with_child(TypeNode::new("vehicle", "").with_child(TypeNode::new("truck", "")))
            .with_child(TypeNode::new("location", ""));
        assert_eq!(render_types(&types), "vehicle location - object\ntruck - vehicle");
    }

    #[test]
    fn test_render_action() {
        let mut params = ParamMap::new();
        params.insert("?b".into(), "block".into());
        let action = Action {
            name: "pickup".into(),
            parameters: params,
            preconditions: "(clear ?b)".into(),
            effects: "(holding ?b)".into(),
        };
        let text = render_action(&action);
        assert!(text.starts_with("(:action pickup\n    :parameters (?b - block)"));
        assert!(text.contains("        (clear ?b)"));
    }

    #[test]
    fn test_render_action_empty_expressions() {
        let text = render_action(&Action::new("wait"));
        assert!(text.contains("(and)"));
    }

    #[test]
    fn test_render_domain_structure() {
        let mut params = ParamMap::new();
        params.insert("?b".into(), "block".into());
        let clear = Predicate::new("clear", params, "nothing is on b", "");
        let text = render_domain(
            "blocksworld",
            &default_requirements(),
            &blocks(),
            &[clear],
            &[Action::new("wait")],
        );
        assert!(text.starts_with("(define (domain blocksworld)"));
        assert!(text.contains("(:requirements :strips :typing"));
        assert!(text.contains("block table - object"));
        assert!(text.contains("(clear ?b - block) ; nothing is on b"));
        assert!(text.contains("(:action wait"));
        assert!(text.trim_end().ends_with(')'));
        assert!(parse_all(&text).is_ok());
    }

    #[test]
    fn test_keywords() {
        assert!(is_keyword("and"));
        assert!(is_keyword("forall"));
        assert!(!is_keyword("clear"));
    }
}
