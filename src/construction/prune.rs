//! Pruning of predicates and types that no action uses.

use crate::domain::{Action, Predicate, TypeNode};

/// True when `name` occurs in `text` as a whole token: preceded by `(` or
/// whitespace and followed by whitespace or `)`.
fn references(text: &str, name: &str) -> bool {
    if name.is_empty() {
        return false;
    }
    text.match_indices(name).any(|(idx, _)| {
        let before_ok = text[..idx]
            .chars()
            .next_back()
            .is_none_or(|c| c == '(' || c.is_whitespace());
        let after_ok = text[idx + name.len()..]
            .chars()
            .next()
            .is_some_and(|c| c == ')' || c.is_whitespace());
        before_ok && after_ok
    })
}

/// Keep predicates referenced by some action's preconditions or effects.
/// First-seen order is preserved and names are deduplicated.
pub fn prune_predicates(predicates: &[Predicate], actions: &[Action]) -> Vec<Predicate> {
    let mut kept: Vec<Predicate> = Vec::new();
    for predicate in predicates {
        if kept.iter().any(|k| k.name == predicate.name) {
            continue;
        }
        let used = actions
            .iter()
            .any(|a| a.expressions().iter().any(|e| references(e, &predicate.name)));
        if used {
            kept.push(predicate.clone());
        } else {
            log::debug!("Pruning unused predicate '{}'", predicate.name);
        }
    }
    kept
}

/// Keep types used as a predicate parameter type, an action parameter type,
/// or anywhere in an action's expression text (quantifier scopes).
pub fn prune_types(types: &[String], predicates: &[Predicate], actions: &[Action]) -> Vec<String> {
    let mut kept: Vec<String> = Vec::new();
    for ty in types {
        if kept.contains(ty) {
            continue;
        }
        let in_predicates = predicates.iter().any(|p| p.params.values().any(|t| t == ty));
        let in_parameters = actions.iter().any(|a| a.parameters.values().any(|t| t == ty));
        let in_expressions = actions
            .iter()
            .any(|a| a.expressions().iter().any(|e| e.contains(ty.as_str())));
        if in_predicates || in_parameters || in_expressions {
            kept.push(ty.clone());
        } else {
            log::debug!("Pruning unused type '{}'", ty);
        }
    }
    kept
}

/// [`prune_types`] applied to a hierarchy; see [`TypeNode::retain`].
pub fn prune_type_tree(types: &TypeNode, predicates: &[Predicate], actions: &[Action]) -> TypeNode {
    let keep = prune_types(&types.flatten(), predicates, actions);
    types.retain(&keep)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ParamMap;

    fn pred(name: &str, ty: &str) -> Predicate {
        let mut params = ParamMap::new();
        params.insert("?x".to_string(), ty.to_string());
        Predicate::new(name, params, "", "")
    }

    fn action(pre: &str, eff: &str) -> Action {
        Action {
            name: "a".into(),
            parameters: ParamMap::new(),
            preconditions: pre.into(),
            effects: eff.into(),
        }
    }

    #[test]
    fn test_references_whole_tokens() {
        assert!(references("(and (on ?a ?b))", "on"));
        assert!(references("(handempty)", "handempty"));
        assert!(references("(and\n(clear\t?b))", "clear"));
        assert!(!references("(ontable ?b)", "on"));
        assert!(!references("(ontable ?b)", "table"));
        assert!(!references("(on_top ?b)", "on"));
    }

    #[test]
    fn test_prune_predicates_keeps_used_in_order() {
        let preds = vec![pred("holding", "block"), pred("unused", "block"), pred("clear", "block")];
        let actions = vec![action("(clear ?x)", "(holding ?x)")];
        let kept = prune_predicates(&preds, &actions);
        let names: Vec<&str> = kept.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["holding", "clear"]);
    }

    #[test]
    fn test_prune_predicates_dedups_by_name() {
        let preds = vec![pred("clear", "block"), pred("clear", "table")];
        let kept = prune_predicates(&preds, &[action("(clear ?x)", "")]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].params["?x"], "block");
    }

    #[test]
    fn test_prune_predicates_idempotent() {
        let preds = vec![pred("a", "t"), pred("b", "t"), pred("c", "t"), pred("a", "u")];
        let actions = vec![action("(and (a ?x) (c ?x))", "(not (a ?x))")];
        let once = prune_predicates(&preds, &actions);
        let twice = prune_predicates(&once, &actions);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_prune_types_sources() {
        let types: Vec<String> = ["object", "block", "table", "robot", "gripper"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let preds = vec![pred("clear", "block")];
        let mut act = action("(forall (?t - table) (free ?t))", "");
        act.parameters.insert("?r".into(), "robot".into());
        let kept = prune_types(&types, &preds, &[act]);
        assert_eq!(kept, vec!["block", "table", "robot"]);
    }

    #[test]
    fn test_prune_type_tree_keeps_root() {
        let tree = TypeNode::root()
            .with_child(TypeNode::new("thing", "").with_child(TypeNode::new("block", "")))
            .with_child(TypeNode::new("gripper", ""));
        let pruned = prune_type_tree(&tree, &[pred("clear", "block")], &[]);
        assert_eq!(pruned.flatten(), vec!["object", "block"]);
    }
}
