//! Prompt Renderer - Render templates with context variables using Handlebars
//!
//! Templates may use handlebars `{{name}}` or single-brace `{name}`
//! placeholders; single-brace ones are rewritten before rendering.

use std::collections::HashMap;
use std::sync::LazyLock;

use handlebars::Handlebars;
use regex::Regex;
use serde::Serialize;

use crate::error::{PddlsmithError, Result};

/// A handlebars expression (kept) or a single-brace placeholder (rewritten).
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{[^}]*\}\}|\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder pattern"));

/// Rewrite `{name}` placeholders into `{{name}}`, leaving existing
/// handlebars expressions and other braces alone.
pub fn normalize_placeholders(template: &str) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &regex::Captures| match caps.get(1) {
            Some(name) => format!("{{{{{}}}}}", name.as_str()),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Renders prompt templates using Handlebars templating
pub struct PromptRenderer {
    handlebars: Handlebars<'static>,
}

impl Default for PromptRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptRenderer {
    pub fn new() -> Self {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(false);
        // Prompt text is not HTML
        handlebars.register_escape_fn(handlebars::no_escape);
        Self { handlebars }
    }

    /// Render a template string with the given context
    ///
    /// # Arguments
    /// * `template` - The template string containing `{name}` or `{{name}}` placeholders
    /// * `context` - A HashMap of variable names to values
    pub fn render(&self, template: &str, context: &HashMap<String, String>) -> Result<String> {
        self.render_with(template, context)
    }

    /// Render a template string with any serializable context
    pub fn render_with<T: Serialize>(&self, template: &str, context: &T) -> Result<String> {
        self.handlebars
            .render_template(&normalize_placeholders(template), context)
            .map_err(|e| PddlsmithError::Template(format!("Failed to render template: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_normalize_placeholders() {
        assert_eq!(normalize_placeholders("Fix {action_name}"), "Fix {{action_name}}");
        assert_eq!(normalize_placeholders("Keep {{already}}"), "Keep {{already}}");
        assert_eq!(normalize_placeholders("{ not a placeholder }"), "{ not a placeholder }");
        assert_eq!(normalize_placeholders("{a}{b}"), "{{a}}{{b}}");
    }

    #[test]
    fn test_render_single_brace() {
        let renderer = PromptRenderer::new();
        let result = renderer
            .render("Action {action_name}: {error_msg}", &context(&[("action_name", "stack"), ("error_msg", "bad")]))
            .unwrap();
        assert_eq!(result, "Action stack: bad");
    }

    #[test]
    fn test_render_missing_variable_empty_string() {
        let renderer = PromptRenderer::default();
        let result = renderer.render("Hello, {{name}}!", &HashMap::new()).unwrap();
        assert_eq!(result, "Hello, !");
    }

    #[test]
    fn test_render_no_escape() {
        let renderer = PromptRenderer::new();
        let result = renderer
            .render("Pre: {pre}", &context(&[("pre", "(and (clear ?b) (not (= ?a ?b)))")]))
            .unwrap();
        assert_eq!(result, "Pre: (and (clear ?b) (not (= ?a ?b)))");
    }

    #[test]
    fn test_render_with_serializable() {
        #[derive(Serialize)]
        struct Context {
            name: String,
            count: i32,
        }

        let renderer = PromptRenderer::new();
        let result = renderer
            .render_with(
                "{name} has {{count}} actions",
                &Context {
                    name: "blocksworld".to_string(),
                    count: 4,
                },
            )
            .unwrap();
        assert_eq!(result, "blocksworld has 4 actions");
    }

    #[test]
    fn test_values_are_not_reinterpreted() {
        let renderer = PromptRenderer::new();
        let result = renderer.render("{out}", &context(&[("out", "{literal}")])).unwrap();
        assert_eq!(result, "{literal}");
    }

    #[test]
    fn test_render_preserves_whitespace() {
        let renderer = PromptRenderer::new();
        let result = renderer.render("Line 1\n\nLine 3\n\n\nLine 6", &HashMap::new()).unwrap();
        assert_eq!(result, "Line 1\n\nLine 3\n\n\nLine 6");
    }

    #[test]
    fn test_invalid_template_is_error() {
        let renderer = PromptRenderer::new();
        assert!(matches!(
            renderer.render("{{#if}}", &HashMap::new()),
            Err(PddlsmithError::Template(_))
        ));
    }
}
