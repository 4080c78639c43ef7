//! Action parser - free-form model output to typed schema
//!
//! This module turns one model response into an [`Action`](crate::domain::Action)
//! and the predicates it newly declares. It is a tolerant line scanner:
//! - `sections`: heading lookup and fenced-block extraction
//! - `params`: `?name - type` parameter lists, including quantified variables
//! - `predicates`: `New Predicates` declarations
//! - `action`: the whole-response entry point
//!
//! Parsing is pure. Nothing here touches the predicate registry.

mod action;
mod params;
mod predicates;
mod sections;

use thiserror::Error;

pub use action::{ParsedAction, parse_action};
pub use params::{TypedVar, internal_params, parse_params, parse_typed_list};
pub use predicates::parse_new_predicates;
pub use sections::{extract_block, extract_fenced_block, extract_section, find_heading, has_heading, list_headings};

/// Hard parse failures. Each one fails the current attempt only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A mandatory heading, or the fenced block beneath it, is absent
    #[error("Section '{section}' not found: {reason}")]
    SectionNotFound { section: String, reason: String },
}
