//! Action schemas produced by the refinement loop.

use serde::{Deserialize, Serialize};

use super::predicate::ParamMap;

/// One operator: typed parameters plus precondition and effect expressions.
///
/// Preconditions and effects are kept as opaque text. Whether the predicates
/// they mention exist is only checked by a validator, never enforced here.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Action {
    pub name: String,
    pub parameters: ParamMap,
    pub preconditions: String,
    pub effects: String,
}

impl Action {
    /// An action with no parameters and empty expressions.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Precondition and effect text, in that order.
    pub fn expressions(&self) -> [&str; 2] {
        [&self.preconditions, &self.effects]
    }

    /// True when neither expression has any content.
    pub fn is_empty(&self) -> bool {
        self.preconditions.trim().is_empty() && self.effects.trim().is_empty()
    }
}

/// Natural-language description of an action to construct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDescription {
    pub name: String,
    pub description: String,
}

impl ActionDescription {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}
