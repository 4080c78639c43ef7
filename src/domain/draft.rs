//! The aggregate threaded through one construction pass.

use serde::{Deserialize, Serialize};

use super::action::Action;
use super::registry::PredicateRegistry;

/// Predicates and actions built so far.
///
/// Owned by the fixpoint loop. Refinement runs only read it; the fixpoint
/// loop merges their results back in before the next action is prompted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DomainDraft {
    pub predicates: PredicateRegistry,
    pub actions: Vec<Action>,
}

impl DomainDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new pass: actions are re-derived, predicates carry over.
    pub fn reset_actions(&mut self) {
        self.actions.clear();
    }

    pub fn push_action(&mut self, action: Action) {
        self.actions.push(action);
    }

    /// Prune the registry against the actions currently in the draft.
    pub fn prune_predicates(&mut self) -> Vec<String> {
        self.predicates.retain_used(&self.actions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::predicate::{ParamMap, Predicate};

    #[test]
    fn test_reset_keeps_predicates() {
        let mut draft = DomainDraft::new();
        draft.predicates.merge(vec![Predicate::new("handempty", ParamMap::new(), "", "")]);
        draft.push_action(Action::new("pickup"));

        draft.reset_actions();

        assert!(draft.actions.is_empty());
        assert_eq!(draft.predicates.len(), 1);
    }

    #[test]
    fn test_prune_against_partial_pass() {
        let mut draft = DomainDraft::new();
        draft.predicates.merge(vec![
            Predicate::new("handempty", ParamMap::new(), "", ""),
            Predicate::new("holding", ParamMap::new(), "", ""),
        ]);
        draft.push_action(Action {
            name: "pickup".into(),
            preconditions: "(handempty)".into(),
            ..Default::default()
        });

        let removed = draft.prune_predicates();

        assert_eq!(removed, vec!["holding".to_string()]);
        assert!(draft.predicates.contains("handempty"));
    }
}
