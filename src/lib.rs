//! pddlsmith - LLM-driven PDDL action construction
//!
//! pddlsmith turns a natural-language domain description into typed PDDL
//! action schemas. Each action is drafted by a language model, parsed,
//! checked against the growing predicate vocabulary and corrected through
//! feedback until it validates or the attempt budget runs out. The whole
//! domain is then rebuilt until the vocabulary stops changing.

pub mod construction;
pub mod domain;
pub mod error;
pub mod llm;
pub mod mirror;
pub mod parser;
pub mod pddl;
pub mod prompt;
pub mod validation;

pub use error::{PddlsmithError, Result};
