//! Builds the user turns of a refinement conversation.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::Result;
use crate::prompt::{PromptLoader, PromptRenderer};

pub const ACTION_CONSTRUCTION_TEMPLATE: &str = "action_construction";
pub const ERROR_FEEDBACK_TEMPLATE: &str = "error_feedback";
pub const CRITIQUE_TEMPLATE: &str = "critique";

/// Values substituted into every template for one action.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PromptContext {
    pub domain_desc: String,
    pub types: String,
    pub action_name: String,
    pub action_desc: String,
    pub predicate_list: String,
}

impl PromptContext {
    fn to_map(&self) -> HashMap<String, String> {
        HashMap::from([
            ("domain_desc".to_string(), self.domain_desc.clone()),
            ("types".to_string(), self.types.clone()),
            ("action_name".to_string(), self.action_name.clone()),
            ("action_desc".to_string(), self.action_desc.clone()),
            ("predicate_list".to_string(), self.predicate_list.clone()),
        ])
    }
}

pub struct PromptAssembler {
    loader: PromptLoader,
    renderer: PromptRenderer,
}

impl Default for PromptAssembler {
    fn default() -> Self {
        Self::new(PromptLoader::builtin())
    }
}

impl PromptAssembler {
    pub fn new(loader: PromptLoader) -> Self {
        Self {
            loader,
            renderer: PromptRenderer::new(),
        }
    }

    fn render(&self, template: &str, context: &HashMap<String, String>) -> Result<String> {
        let template = self.loader.load(template)?;
        self.renderer.render(&template, context)
    }

    /// The opening user turn for an action
    pub fn initial(&self, context: &PromptContext) -> Result<String> {
        self.render(ACTION_CONSTRUCTION_TEMPLATE, &context.to_map())
    }

    /// A corrective user turn carrying a validation error or a critique
    pub fn error_feedback(&self, context: &PromptContext, error_msg: &str) -> Result<String> {
        let mut values = context.to_map();
        values.insert("error_msg".to_string(), error_msg.to_string());
        self.render(ERROR_FEEDBACK_TEMPLATE, &values)
    }

    /// The prompt asking a reviewer model to critique `llm_output`
    pub fn critique(&self, context: &PromptContext, llm_output: &str) -> Result<String> {
        let mut values = context.to_map();
        values.insert("llm_output".to_string(), llm_output.to_string());
        self.render(CRITIQUE_TEMPLATE, &values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn context() -> PromptContext {
        PromptContext {
            domain_desc: "Blocks on a table".into(),
            types: "- object: anything\n  - block: a block".into(),
            action_name: "stack".into(),
            action_desc: "put one block on another".into(),
            predicate_list: "No predicate has been defined yet".into(),
        }
    }

    #[test]
    fn test_initial_prompt_builtin() {
        let prompt = PromptAssembler::default().initial(&context()).unwrap();
        assert!(prompt.contains("Define the action `stack`: put one block on another"));
        assert!(prompt.contains("No predicate has been defined yet"));
        assert!(prompt.contains("- block: a block"));
        assert!(prompt.contains("### New Predicates"));
        assert!(!prompt.contains("{action_name}"));
    }

    #[test]
    fn test_error_feedback_prompt() {
        let prompt = PromptAssembler::default()
            .error_feedback(&context(), "The predicate 'on' is not defined.")
            .unwrap();
        assert!(prompt.contains("`stack`"));
        assert!(prompt.contains("The predicate 'on' is not defined."));
        assert!(prompt.contains("put one block on another"));
    }

    #[test]
    fn test_critique_prompt() {
        let prompt = PromptAssembler::default().critique(&context(), "### Action Effects").unwrap();
        assert!(prompt.contains("### Action Effects"));
        assert!(prompt.contains("No feedback"));
    }

    #[test]
    fn test_override_template() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("error_feedback.md"), "{action_name}|{error_msg}|{predicate_list}").unwrap();
        let assembler = PromptAssembler::new(PromptLoader::new(dir.path()));
        let prompt = assembler.error_feedback(&context(), "bad").unwrap();
        assert_eq!(prompt, "stack|bad|No predicate has been defined yet");
    }
}
