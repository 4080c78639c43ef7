//! Whole-response parsing into an action plus its new predicates.

use serde::{Deserialize, Serialize};

use super::ParseError;
use super::params::parse_params;
use super::predicates::parse_new_predicates;
use super::sections::extract_block;
use crate::domain::{Action, Predicate};

/// Everything one model response declares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedAction {
    pub action: Action,
    pub new_predicates: Vec<Predicate>,
}

/// Parse one block of model output for the action `name`.
///
/// Preconditions and effects are mandatory: a missing heading or a missing
/// fenced block under it is a [`ParseError::SectionNotFound`]. Parameters
/// and new predicates are best-effort and may come back empty.
pub fn parse_action(text: &str, name: &str) -> Result<ParsedAction, ParseError> {
    let parameters = parse_params(text, false);
    let preconditions = extract_block(text, "Preconditions")?;
    let effects = extract_block(text, "Effects")?;
    let new_predicates = parse_new_predicates(text);

    log::debug!(
        "Parsed action '{}': {} parameters, {} new predicates",
        name,
        parameters.len(),
        new_predicates.len()
    );

    Ok(ParsedAction {
        action: Action {
            name: name.to_string(),
            parameters,
            preconditions,
            effects,
        },
        new_predicates,
    })
}
