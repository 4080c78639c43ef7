//! Prompt System - Template loading and rendering
//!
//! Templates are loaded from an optional directory with compiled-in
//! defaults, rendered with Handlebars, and assembled into the turns of a
//! refinement conversation.

mod assembler;
mod loader;
mod render;

pub use assembler::{
    ACTION_CONSTRUCTION_TEMPLATE, CRITIQUE_TEMPLATE, ERROR_FEEDBACK_TEMPLATE, PromptAssembler, PromptContext,
};
pub use loader::PromptLoader;
pub use render::{PromptRenderer, normalize_placeholders};

pub const ACTION_CONSTRUCTION: &str = include_str!("../../prompts/action_construction.md");
pub const ERROR_FEEDBACK: &str = include_str!("../../prompts/error_feedback.md");
pub const CRITIQUE: &str = include_str!("../../prompts/critique.md");

/// The compiled-in template for `name`
pub fn builtin(name: &str) -> Option<&'static str> {
    match name {
        ACTION_CONSTRUCTION_TEMPLATE => Some(ACTION_CONSTRUCTION),
        ERROR_FEEDBACK_TEMPLATE => Some(ERROR_FEEDBACK),
        CRITIQUE_TEMPLATE => Some(CRITIQUE),
        _ => None,
    }
}
