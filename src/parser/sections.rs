//! Heading and fenced-block extraction for model output.
//!
//! Model output is loosely formatted markdown. Headings may or may not carry
//! `#` markers, may be bolded, may end in a colon and may be phrased as
//! "Action Parameters" instead of "Parameters". A section runs from its
//! heading to the next `##`-level heading or the next answer heading,
//! whichever comes first. Lines inside triple-backtick fences are never
//! treated as headings.

use super::ParseError;

const FENCE: &str = "```";

/// Headings of a model answer, as compared after normalization.
const ANSWER_HEADINGS: &[&str] = &["parameters", "preconditions", "effects", "new predicates"];

/// Normalize a line into comparable heading text, if it can be a heading.
fn heading_key(line: &str) -> Option<String> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with(FENCE) {
        return None;
    }
    let text = trimmed
        .trim_start_matches('#')
        .trim()
        .trim_matches('*')
        .trim()
        .trim_end_matches(':')
        .trim_matches('*')
        .trim();
    if text.is_empty() {
        return None;
    }
    let lower = text.to_ascii_lowercase();
    Some(lower.strip_prefix("action ").map(str::to_string).unwrap_or(lower))
}

fn is_fence(line: &str) -> bool {
    line.trim_start().starts_with(FENCE)
}

fn is_section_break(line: &str) -> bool {
    line.trim_start().starts_with("##")
        || heading_key(line).is_some_and(|key| ANSWER_HEADINGS.contains(&key.as_str()))
}

/// Line index of the first heading matching `heading`, outside fences.
pub fn find_heading(content: &str, heading: &str) -> Option<usize> {
    let wanted = heading.to_ascii_lowercase();
    let mut in_fence = false;
    for (idx, line) in content.lines().enumerate() {
        if is_fence(line) {
            if !is_single_line_fence(line) {
                in_fence = !in_fence;
            }
            continue;
        }
        if in_fence {
            continue;
        }
        if heading_key(line).as_deref() == Some(wanted.as_str()) {
            return Some(idx);
        }
    }
    None
}

pub fn has_heading(content: &str, heading: &str) -> bool {
    find_heading(content, heading).is_some()
}

/// Text between `heading` and the next section break.
pub fn extract_section(content: &str, heading: &str) -> Option<String> {
    let start = find_heading(content, heading)?;
    let mut lines = Vec::new();
    let mut in_fence = false;
    for line in content.lines().skip(start + 1) {
        if is_fence(line) {
            if !is_single_line_fence(line) {
                in_fence = !in_fence;
            }
        } else if !in_fence && is_section_break(line) {
            break;
        }
        lines.push(line);
    }
    Some(lines.join("\n"))
}

fn is_single_line_fence(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.len() > 2 * FENCE.len() && trimmed.starts_with(FENCE) && trimmed.ends_with(FENCE)
}

/// Content of the first triple-backtick block, without the language tag.
pub fn extract_fenced_block(section: &str) -> Option<String> {
    let mut body: Option<Vec<&str>> = None;
    for line in section.lines() {
        match body.as_mut() {
            None => {
                if is_single_line_fence(line) {
                    let trimmed = line.trim();
                    let inner = &trimmed[FENCE.len()..trimmed.len() - FENCE.len()];
                    return Some(inner.trim().to_string());
                }
                if is_fence(line) {
                    body = Some(Vec::new());
                }
            }
            Some(lines) => {
                if is_fence(line) {
                    return Some(lines.join("\n").trim().to_string());
                }
                lines.push(line);
            }
        }
    }
    None
}

/// The fenced block under `heading`. Both must be present.
pub fn extract_block(content: &str, heading: &str) -> Result<String, ParseError> {
    let section = extract_section(content, heading).ok_or_else(|| ParseError::SectionNotFound {
        section: heading.to_string(),
        reason: "heading is missing".to_string(),
    })?;
    extract_fenced_block(&section).ok_or_else(|| ParseError::SectionNotFound {
        section: heading.to_string(),
        reason: "no fenced code block follows the heading".to_string(),
    })
}

/// All `#`-prefixed headings, outside fences.
pub fn list_headings(content: &str) -> Vec<String> {
    let mut headings = Vec::new();
    let mut in_fence = false;
    for line in content.lines() {
        if is_fence(line) {
            if !is_single_line_fence(line) {
                in_fence = !in_fence;
            }
            continue;
        }
        if !in_fence && line.trim_start().starts_with('#') {
            headings.push(line.trim().trim_start_matches('#').trim().to_string());
        }
    }
    headings
}
