//! New-predicate extraction.

use std::sync::LazyLock;

use regex::Regex;

use super::params::{LIST_ENTRY, parse_typed_list, strip_decoration};
use super::sections::extract_section;
use crate::domain::{ParamMap, Predicate, ROOT_TYPE};

static PREDICATE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_-]*$").expect("predicate name pattern"));

/// Predicates declared under the `New Predicates` heading.
///
/// Accepted entry shapes:
///
/// ```text
/// 1. on ?b1 - block ?b2 - block: block b1 is on block b2
/// - (holding ?b - block): the arm holds b
/// (handempty): the arm is empty
/// ```
///
/// A missing heading, or a section that only says "None", yields nothing.
pub fn parse_new_predicates(text: &str) -> Vec<Predicate> {
    let Some(section) = extract_section(text, "New Predicates") else {
        log::debug!("No New Predicates heading found");
        return Vec::new();
    };

    let mut predicates = Vec::new();
    for line in section.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with("```") {
            continue;
        }
        let body = match LIST_ENTRY.captures(trimmed) {
            Some(caps) => strip_decoration(&caps[1]),
            None if trimmed.starts_with('(') || trimmed.starts_with('`') => strip_decoration(trimmed),
            None => continue,
        };
        if declares_nothing(&body) {
            continue;
        }
        match parse_predicate_line(&body, trimmed) {
            Some(predicate) => predicates.push(predicate),
            None => log::warn!("Skipping malformed predicate line: '{}'", trimmed),
        }
    }
    predicates
}

/// An entry that says no predicates are needed, as opposed to one named `none...`.
fn declares_nothing(body: &str) -> bool {
    let lower = body.to_ascii_lowercase();
    lower.trim_matches(|c: char| c.is_ascii_punctuation() || c.is_whitespace()) == "none"
        || lower.starts_with("no new predicate")
}

fn parse_predicate_line(body: &str, raw: &str) -> Option<Predicate> {
    let (signature, description) = match body.split_once(':') {
        Some((sig, desc)) => (sig, desc.trim()),
        None => (body, ""),
    };
    let spaced = signature.replace(['(', ')'], " ");
    let mut tokens = spaced.split_whitespace();
    let name = tokens.next()?;
    if !PREDICATE_NAME.is_match(name) {
        return None;
    }
    let rest: Vec<&str> = tokens.collect();

    let mut params = ParamMap::new();
    for var in parse_typed_list(&rest.join(" ")) {
        let ty = var.ty.unwrap_or_else(|| {
            log::debug!("Untyped parameter {} of '{}' defaults to {}", var.name, name, ROOT_TYPE);
            ROOT_TYPE.to_string()
        });
        params.insert(var.name, ty);
    }

    Some(Predicate::new(name, params, description, raw))
}
