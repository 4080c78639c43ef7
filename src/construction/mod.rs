//! Action construction
//!
//! [`RefinementLoop`] builds one action through a validate-and-correct
//! conversation; [`ActionConstructor`] runs it over every action of a domain
//! until the predicate vocabulary stops growing, pruning as it goes.

pub mod fixpoint;
pub mod prune;
pub mod refine;

pub use fixpoint::{ActionConstructor, ActionSummary, ConstructionReport};
pub use prune::{prune_predicates, prune_type_tree, prune_types};
pub use refine::{
    ConversationState, RefinementConfig, RefinementLoop, RefinementOutcome, RefinementState, RefinementStatus,
};
