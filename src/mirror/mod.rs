//! Symmetry mirroring of precondition atoms
//!
//! A binary relation between two objects of the same type (two locations
//! being connected, two blocks touching) is usually meant to hold in either
//! direction, but a model will phrase it only one way. Mirroring rewrites
//! every such atom in a precondition into an `or` over the argument
//! permutations of its repeated-type positions, so the action applies no
//! matter which direction the initial state lists.
//!
//! The rewrite works on the parsed expression tree, so nested, repeated and
//! overlapping occurrences are all handled uniformly. It is applied once,
//! right after an action is finalized; applying it twice is not guaranteed
//! to be a no-op.

use std::collections::HashMap;

use itertools::Itertools;

use crate::domain::{Action, Predicate};
use crate::pddl::{Expr, parse_all};

/// Positions sharing one repeated type, per predicate.
type SymmetryGroups = Vec<Vec<usize>>;

/// Mirror the preconditions of `action` against the given predicates.
///
/// Returns the action unchanged when nothing is symmetric, or when the
/// preconditions do not parse as s-expressions.
pub fn mirror_action<'a>(action: &Action, predicates: impl IntoIterator<Item = &'a Predicate>) -> Action {
    let groups = symmetry_groups(predicates);
    if groups.is_empty() {
        return action.clone();
    }

    let exprs = match parse_all(&action.preconditions) {
        Ok(exprs) => exprs,
        Err(e) => {
            log::warn!("Not mirroring '{}': preconditions do not parse ({})", action.name, e);
            return action.clone();
        }
    };

    let mut changed = false;
    let mirrored: Vec<Expr> = exprs
        .into_iter()
        .map(|expr| mirror_expr(expr, &groups, &mut changed))
        .collect();

    if !changed {
        return action.clone();
    }

    log::debug!("Mirrored symmetric preconditions of '{}'", action.name);
    Action {
        preconditions: mirrored.iter().map(Expr::to_string).join("\n"),
        ..action.clone()
    }
}

/// For each predicate with a type used more than once among its
/// parameters, the positions of every such type.
fn symmetry_groups<'a>(predicates: impl IntoIterator<Item = &'a Predicate>) -> HashMap<String, SymmetryGroups> {
    let mut out = HashMap::new();
    for predicate in predicates {
        let mut by_type: Vec<(&str, Vec<usize>)> = Vec::new();
        for (pos, ty) in predicate.param_types().into_iter().enumerate() {
            match by_type.iter_mut().find(|(t, _)| *t == ty) {
                Some((_, positions)) => positions.push(pos),
                None => by_type.push((ty, vec![pos])),
            }
        }

        let groups: SymmetryGroups = by_type
            .into_iter()
            .filter(|(_, positions)| positions.len() > 1)
            .map(|(ty, positions)| {
                if positions.len() > 2 {
                    log::warn!(
                        "Predicate '{}' repeats type '{}' {} times; mirroring yields {} variants",
                        predicate.name,
                        ty,
                        positions.len(),
                        (1..=positions.len()).product::<usize>()
                    );
                }
                positions
            })
            .collect();

        if !groups.is_empty() {
            out.insert(predicate.name.clone(), groups);
        }
    }
    out
}

fn mirror_expr(expr: Expr, groups: &HashMap<String, SymmetryGroups>, changed: &mut bool) -> Expr {
    let items = match expr {
        Expr::List(items) => items,
        atom => return atom,
    };

    if let Some(head) = items.first().and_then(Expr::as_atom)
        && let Some(symmetric) = groups.get(head)
    {
        let args = &items[1..];
        if symmetric.iter().flatten().all(|&pos| pos < args.len()) {
            let variants = permuted_variants(&items, symmetric);
            if variants.len() > 1 {
                *changed = true;
                let mut or = vec![Expr::atom("or")];
                or.extend(variants);
                return Expr::List(or);
            }
            return Expr::List(items);
        }
        log::debug!("Arity mismatch for '{}', leaving atom untouched", head);
        return Expr::List(items);
    }

    Expr::List(items.into_iter().map(|item| mirror_expr(item, groups, changed)).collect())
}

/// All distinct atoms obtained by permuting arguments within each group,
/// original ordering first.
fn permuted_variants(items: &[Expr], groups: &SymmetryGroups) -> Vec<Expr> {
    let per_group: Vec<Vec<Vec<Expr>>> = groups
        .iter()
        .map(|positions| {
            let values: Vec<Expr> = positions.iter().map(|&p| items[p + 1].clone()).collect();
            values.clone().into_iter().permutations(values.len()).collect()
        })
        .collect();

    let mut variants: Vec<Expr> = Vec::new();
    for choice in per_group.into_iter().multi_cartesian_product() {
        let mut atom = items.to_vec();
        for (positions, values) in groups.iter().zip(choice) {
            for (&pos, value) in positions.iter().zip(values) {
                atom[pos + 1] = value;
            }
        }
        let atom = Expr::List(atom);
        if !variants.contains(&atom) {
            variants.push(atom);
        }
    }
    variants
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ParamMap;

    fn predicate(name: &str, params: &[(&str, &str)]) -> Predicate {
        let params: ParamMap = params.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Predicate::new(name, params, "", "")
    }

    fn action(pre: &str) -> Action {
        Action {
            name: "move".into(),
            parameters: ParamMap::new(),
            preconditions: pre.into(),
            effects: "(at ?y)".into(),
        }
    }

    fn connected() -> Predicate {
        predicate("connected", &[("?a", "location"), ("?b", "location")])
    }

    #[test]
    fn test_connected_scenario() {
        let mirrored = mirror_action(&action("(and (connected ?x ?y))"), [&connected()]);
        assert!(mirrored.preconditions.contains("(or (connected ?x ?y) (connected ?y ?x))"));
        assert!(mirrored.preconditions.starts_with("(and "));
        assert_eq!(mirrored.effects, "(at ?y)");
    }

    #[test]
    fn test_every_occurrence_rewritten() {
        let pre = "(and (connected ?x ?y) (not (connected ?y ?z)) (connected ?x ?y))";
        let mirrored = mirror_action(&action(pre), [&connected()]);
        assert_eq!(
            mirrored.preconditions,
            "(and (or (connected ?x ?y) (connected ?y ?x)) \
             (not (or (connected ?y ?z) (connected ?z ?y))) \
             (or (connected ?x ?y) (connected ?y ?x)))"
        );
    }

    #[test]
    fn test_identical_arguments_not_expanded() {
        let mirrored = mirror_action(&action("(connected ?x ?x)"), [&connected()]);
        assert_eq!(mirrored.preconditions, "(connected ?x ?x)");
    }

    #[test]
    fn test_other_positions_fixed() {
        let road = predicate("road", &[("?t", "truck"), ("?a", "city"), ("?b", "city")]);
        let mirrored = mirror_action(&action("(road ?tr ?c1 ?c2)"), [&road]);
        assert_eq!(mirrored.preconditions, "(or (road ?tr ?c1 ?c2) (road ?tr ?c2 ?c1))");
    }

    #[test]
    fn test_two_groups_cartesian() {
        let link = predicate("link", &[("?a", "node"), ("?b", "node"), ("?p", "port"), ("?q", "port")]);
        let mirrored = mirror_action(&action("(link ?n1 ?n2 ?p1 ?p2)"), [&link]);
        let expr = Expr::parse(&mirrored.preconditions).unwrap();
        assert_eq!(expr.head(), Some("or"));
        assert_eq!(expr.args().len(), 4);
    }

    #[test]
    fn test_three_same_typed_arguments() {
        let between = predicate("between", &[("?a", "p"), ("?b", "p"), ("?c", "p")]);
        let mirrored = mirror_action(&action("(between ?x ?y ?z)"), [&between]);
        let expr = Expr::parse(&mirrored.preconditions).unwrap();
        assert_eq!(expr.args().len(), 6);
    }

    #[test]
    fn test_asymmetric_predicate_untouched() {
        let at = predicate("at", &[("?t", "truck"), ("?l", "location")]);
        let original = action("(and   (at ?t ?l))");
        let mirrored = mirror_action(&original, [&at]);
        assert_eq!(mirrored, original);
    }

    #[test]
    fn test_unparseable_preconditions_untouched() {
        let original = action("(and (connected ?x ?y)");
        let mirrored = mirror_action(&original, [&connected()]);
        assert_eq!(mirrored, original);
    }

    #[test]
    fn test_arity_mismatch_untouched() {
        let mirrored = mirror_action(&action("(connected ?x)"), [&connected()]);
        assert_eq!(mirrored.preconditions, "(connected ?x)");
    }
}
