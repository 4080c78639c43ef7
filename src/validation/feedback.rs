//! Critique sources for validated answers.
//!
//! After an answer passes validation it can be reviewed once more, either by
//! a model or by a person at the console. A review that says nothing, or
//! says there is nothing to change, finishes the action; anything else is
//! sent back to the model as feedback.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Stdin};
use tokio::sync::Mutex;

use crate::error::{PddlsmithError, Result};
use crate::llm::{CompletionRequest, LlmClient};
use crate::prompt::{PromptAssembler, PromptContext};

/// Which critique source a run uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackMode {
    #[default]
    None,
    Model,
    Human,
}

impl FeedbackMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackMode::None => "none",
            FeedbackMode::Model => "model",
            FeedbackMode::Human => "human",
        }
    }
}

impl std::fmt::Display for FeedbackMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FeedbackMode {
    type Err = PddlsmithError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(FeedbackMode::None),
            "model" | "llm" => Ok(FeedbackMode::Model),
            "human" => Ok(FeedbackMode::Human),
            other => Err(PddlsmithError::Config(format!(
                "Unknown feedback mode '{}', expected none, model or human",
                other
            ))),
        }
    }
}

/// Everything a reviewer needs to judge one answer
#[derive(Debug, Clone, Default)]
pub struct FeedbackRequest {
    pub context: PromptContext,
    /// The validated model output
    pub output: String,
}

/// True when a review asks for no changes
pub fn is_no_feedback(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return true;
    }
    let lower = trimmed.to_ascii_lowercase();
    lower.contains("no feedback") || is_pass_verdict(&lower)
}

/// `pass` as the whole reply or as its leading word, not `passing`.
fn is_pass_verdict(lower: &str) -> bool {
    match lower.strip_prefix("pass") {
        Some(rest) => rest.chars().next().is_none_or(|c| !c.is_alphanumeric() && c != '_' && c != '-'),
        None => false,
    }
}

#[async_trait]
pub trait FeedbackSource: Send + Sync {
    /// Review a validated answer. `None` means the answer is accepted.
    async fn critique(&self, request: &FeedbackRequest) -> Result<Option<String>>;

    fn name(&self) -> &str;
}

/// Asks a model to review the answer
pub struct ModelFeedback {
    llm: Arc<dyn LlmClient>,
    prompts: PromptAssembler,
    max_tokens: Option<u32>,
}

impl ModelFeedback {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self::with_prompts(llm, PromptAssembler::default())
    }

    pub fn with_prompts(llm: Arc<dyn LlmClient>, prompts: PromptAssembler) -> Self {
        Self {
            llm,
            prompts,
            max_tokens: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

#[async_trait]
impl FeedbackSource for ModelFeedback {
    async fn critique(&self, request: &FeedbackRequest) -> Result<Option<String>> {
        let prompt = self.prompts.critique(&request.context, &request.output)?;
        let mut completion = CompletionRequest::from_prompt(prompt);
        completion.max_tokens = self.max_tokens;

        let response = self.llm.complete(completion).await?;
        if is_no_feedback(&response.content) {
            log::debug!("Model critique accepted '{}'", request.context.action_name);
            return Ok(None);
        }
        Ok(Some(response.content.trim().to_string()))
    }

    fn name(&self) -> &str {
        "model"
    }
}

/// Asks a person at the console. Input ends at an empty line or EOF.
pub struct HumanFeedback<R> {
    reader: Mutex<R>,
}

impl HumanFeedback<BufReader<Stdin>> {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

impl<R> HumanFeedback<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    pub fn new(reader: R) -> Self {
        Self {
            reader: Mutex::new(reader),
        }
    }

    async fn read_block(&self) -> Result<String> {
        let mut reader = self.reader.lock().await;
        let mut lines = Vec::new();
        loop {
            let mut line = String::new();
            let read = reader.read_line(&mut line).await?;
            if read == 0 || line.trim().is_empty() {
                break;
            }
            lines.push(line.trim_end().to_string());
        }
        Ok(lines.join("\n"))
    }
}

#[async_trait]
impl<R> FeedbackSource for HumanFeedback<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn critique(&self, request: &FeedbackRequest) -> Result<Option<String>> {
        println!("\n{} {}", "Review action".bold(), request.context.action_name.cyan());
        println!("{}", request.output.trim());
        println!(
            "{}",
            "Type feedback for the model and finish with an empty line, or press Enter to accept:".dimmed()
        );

        let text = self.read_block().await?;
        if is_no_feedback(&text) {
            return Ok(None);
        }
        Ok(Some(text))
    }

    fn name(&self) -> &str {
        "human"
    }
}
