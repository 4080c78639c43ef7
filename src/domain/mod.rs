//! Domain types for pddlsmith
//!
//! This module contains the data model shared by every stage:
//! - Predicate: a typed relation with a canonical clean-text rendering
//! - Action: parameters plus precondition/effect expressions
//! - TypeNode: the type hierarchy rooted at `object`
//! - PredicateRegistry: the ordered, name-deduplicated predicate vocabulary
//! - DomainDraft: registry plus the actions of the current pass
//! - DomainDescription: the natural-language input

pub mod action;
pub mod description;
pub mod draft;
pub mod predicate;
pub mod registry;
pub mod types;

pub use action::{Action, ActionDescription};
pub use description::DomainDescription;
pub use draft::DomainDraft;
pub use predicate::{ParamMap, Predicate};
pub use registry::{EMPTY_PREDICATE_LIST, PredicateRegistry, merge};
pub use types::{ROOT_TYPE, TypeNode};
