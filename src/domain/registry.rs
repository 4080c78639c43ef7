//! Shared, name-deduplicated predicate registry.
//!
//! The registry is the vocabulary every action in a domain draws from. A
//! predicate coined while constructing one action must be visible, under the
//! same name, to every later action, so entries are keyed by name and the
//! first declaration of a name wins.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::action::Action;
use super::predicate::Predicate;
use crate::construction::prune::prune_predicates;

/// Rendering used in prompts when no predicate exists yet.
pub const EMPTY_PREDICATE_LIST: &str = "No predicate has been defined yet";

/// Ordered predicate set keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredicateRegistry {
    predicates: IndexMap<String, Predicate>,
}

impl PredicateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a list, keeping the first predicate per name.
    pub fn from_predicates(predicates: impl IntoIterator<Item = Predicate>) -> Self {
        let mut registry = Self::new();
        registry.merge(predicates);
        registry
    }

    /// Add every candidate whose name is not yet present.
    ///
    /// Returns the newly added predicates in order of first appearance.
    /// Candidates colliding with an existing name, or with an earlier
    /// candidate in the same batch, are dropped.
    pub fn merge(&mut self, candidates: impl IntoIterator<Item = Predicate>) -> Vec<Predicate> {
        let mut added = Vec::new();
        for candidate in candidates {
            if self.predicates.contains_key(&candidate.name) {
                log::debug!("Predicate '{}' already registered, keeping first", candidate.name);
                continue;
            }
            self.predicates.insert(candidate.name.clone(), candidate.clone());
            added.push(candidate);
        }
        added
    }

    pub fn get(&self, name: &str) -> Option<&Predicate> {
        self.predicates.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.predicates.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Predicate> {
        self.predicates.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.predicates.keys()
    }

    pub fn to_vec(&self) -> Vec<Predicate> {
        self.predicates.values().cloned().collect()
    }

    /// Clean-text lines joined in declaration order.
    pub fn render(&self) -> String {
        self.predicates
            .values()
            .map(|p| p.clean_text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Like [`render`](Self::render), with a placeholder when empty.
    pub fn render_for_prompt(&self) -> String {
        if self.is_empty() {
            EMPTY_PREDICATE_LIST.to_string()
        } else {
            self.render()
        }
    }

    /// Drop every predicate no action references. Returns the removed names.
    pub fn retain_used(&mut self, actions: &[Action]) -> Vec<String> {
        let current = self.to_vec();
        let kept = prune_predicates(&current, actions);
        let removed: Vec<String> = current
            .iter()
            .filter(|p| !kept.iter().any(|k| k.name == p.name))
            .map(|p| p.name.clone())
            .collect();
        self.predicates.retain(|name, _| !removed.contains(name));
        removed
    }
}

/// Functional form of [`PredicateRegistry::merge`]: returns the merged list
/// and the newly added predicates.
pub fn merge(existing: &[Predicate], candidates: &[Predicate]) -> (Vec<Predicate>, Vec<Predicate>) {
    let mut registry = PredicateRegistry::from_predicates(existing.iter().cloned());
    let added = registry.merge(candidates.iter().cloned());
    (registry.to_vec(), added)
}
