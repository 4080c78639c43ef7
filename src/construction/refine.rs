//! Per-action refinement loop.
//!
//! One action is built through a conversation with the model. Each answer is
//! parsed and validated; a rejected answer is answered with a corrective turn
//! and the model tries again. An accepted answer may be reviewed once by a
//! [`FeedbackSource`] before it is final. When the attempt budget runs out
//! the last answer that parsed is kept, so a pass never fails on a
//! stubborn action.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::{Action, ActionDescription, DomainDescription, DomainDraft, Predicate};
use crate::error::Result;
use crate::llm::{CompletionRequest, LlmClient, Message, Role};
use crate::mirror::mirror_action;
use crate::parser::{ParsedAction, parse_action};
use crate::prompt::{PromptAssembler, PromptContext};
use crate::validation::{ErrorKind, FeedbackRequest, FeedbackSource, ValidationOutcome, Validator};

/// Configuration for the refinement loop
#[derive(Debug, Clone)]
pub struct RefinementConfig {
    /// Generations allowed per action, not counting the critique round
    pub max_attempts: usize,
    /// Mirror symmetric preconditions of the finished action
    pub mirror_symmetry: bool,
    /// Max tokens for each model answer
    pub max_tokens: Option<u32>,
}

impl Default for RefinementConfig {
    fn default() -> Self {
        Self {
            max_attempts: 8,
            mirror_symmetry: false,
            max_tokens: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefinementState {
    Generating,
    Validating,
    ErrorFeedback,
    CritiqueFeedback,
    Done,
}

/// How an action was finalized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefinementStatus {
    /// The last answer passed validation (and review, if any)
    Validated,
    /// The budget ran out; the last parseable answer was kept
    BestEffort,
}

/// The conversation held with the model for one action
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationState {
    messages: Vec<Message>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(Message::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(Message::assistant(content));
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last_assistant(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::Assistant)
            .map(|m| m.content.as_str())
    }
}

/// Result of refining one action
#[derive(Debug, Clone)]
pub struct RefinementOutcome {
    pub action: Action,
    /// New predicates not already in the registry
    pub new_predicates: Vec<Predicate>,
    /// Model generations used
    pub attempts: usize,
    pub status: RefinementStatus,
    /// Kind of every rejection, in order
    pub rejections: Vec<ErrorKind>,
    pub transcript: ConversationState,
}

pub struct RefinementLoop {
    llm: Arc<dyn LlmClient>,
    validator: Box<dyn Validator>,
    feedback: Option<Box<dyn FeedbackSource>>,
    prompts: PromptAssembler,
    config: RefinementConfig,
}

impl RefinementLoop {
    pub fn new(llm: Arc<dyn LlmClient>, validator: Box<dyn Validator>) -> Self {
        Self {
            llm,
            validator,
            feedback: None,
            prompts: PromptAssembler::default(),
            config: RefinementConfig::default(),
        }
    }

    pub fn with_feedback(mut self, feedback: Box<dyn FeedbackSource>) -> Self {
        self.feedback = Some(feedback);
        self
    }

    pub fn with_prompts(mut self, prompts: PromptAssembler) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn with_config(mut self, config: RefinementConfig) -> Self {
        self.config = config;
        self
    }

    pub fn llm(&self) -> &Arc<dyn LlmClient> {
        &self.llm
    }

    pub fn config(&self) -> &RefinementConfig {
        &self.config
    }

    /// Generations allowed, including the one reserved for a critique round
    pub fn budget(&self) -> usize {
        self.config.max_attempts + usize::from(self.feedback.is_some())
    }

    fn context(&self, description: &ActionDescription, domain: &DomainDescription, draft: &DomainDraft) -> PromptContext {
        PromptContext {
            domain_desc: domain.description.clone(),
            types: domain.types.render(),
            action_name: description.name.clone(),
            action_desc: description.description.clone(),
            predicate_list: draft.predicates.render_for_prompt(),
        }
    }

    /// Build one action against the predicates currently in `draft`.
    ///
    /// Parse and validation failures are fed back to the model and never
    /// returned as errors; only infrastructure failures (model transport,
    /// template rendering, critique input) are.
    pub async fn run(
        &self,
        description: &ActionDescription,
        domain: &DomainDescription,
        draft: &DomainDraft,
    ) -> Result<RefinementOutcome> {
        let name = description.name.as_str();
        let context = self.context(description, domain, draft);
        let budget = self.budget();

        let mut transcript = ConversationState::new();
        transcript.push_user(self.prompts.initial(&context)?);

        let mut state = RefinementState::Generating;
        let mut attempts = 0usize;
        let mut critique_fired = false;
        let mut output = String::new();
        let mut latest: Option<ParsedAction> = None;
        let mut feedback_text = String::new();
        let mut rejections = Vec::new();

        loop {
            let next = match state {
                RefinementState::Generating => {
                    if attempts >= budget {
                        break;
                    }
                    attempts += 1;
                    let mut request = CompletionRequest::from_messages(transcript.messages().to_vec());
                    request.max_tokens = self.config.max_tokens;
                    output = self.llm.complete(request).await?.content;
                    transcript.push_assistant(output.clone());
                    RefinementState::Validating
                }
                RefinementState::Validating => {
                    let verdict = match parse_action(&output, name) {
                        Ok(parsed) => {
                            let verdict = self.validator.validate(&output, &draft.predicates, &parsed.new_predicates);
                            latest = Some(parsed);
                            verdict
                        }
                        Err(e) => ValidationOutcome::fail(ErrorKind::ParseError, e.to_string()),
                    };

                    if !verdict.ok {
                        let kind = verdict.kind.unwrap_or(ErrorKind::ParseError);
                        log::debug!("'{}' attempt {} rejected ({}): {}", name, attempts, kind, verdict.message);
                        rejections.push(kind);
                        feedback_text = verdict.message;
                        RefinementState::ErrorFeedback
                    } else if self.feedback.is_some() && !critique_fired {
                        RefinementState::CritiqueFeedback
                    } else {
                        RefinementState::Done
                    }
                }
                RefinementState::ErrorFeedback => {
                    if attempts >= budget {
                        break;
                    }
                    transcript.push_user(self.prompts.error_feedback(&context, &feedback_text)?);
                    RefinementState::Generating
                }
                RefinementState::CritiqueFeedback => {
                    critique_fired = true;
                    let Some(source) = &self.feedback else {
                        break;
                    };
                    let request = FeedbackRequest {
                        context: context.clone(),
                        output: output.clone(),
                    };
                    match source.critique(&request).await? {
                        Some(critique) => {
                            log::debug!("'{}' received {} critique", name, source.name());
                            feedback_text = critique;
                            RefinementState::ErrorFeedback
                        }
                        None => RefinementState::Done,
                    }
                }
                RefinementState::Done => break,
            };
            log::debug!("'{}': {:?} -> {:?}", name, state, next);
            state = next;
        }

        let status = if state == RefinementState::Done {
            RefinementStatus::Validated
        } else {
            log::warn!(
                "MaxAttemptsExceeded: '{}' used all {} attempts, keeping the last parsed answer",
                name,
                budget
            );
            RefinementStatus::BestEffort
        };

        let (mut action, new_predicates) = match latest {
            Some(parsed) => (parsed.action, parsed.new_predicates),
            None => {
                log::warn!("No answer for '{}' could be parsed, using an empty action", name);
                (Action::new(name), Vec::new())
            }
        };

        let new_predicates: Vec<Predicate> = new_predicates
            .into_iter()
            .filter(|p| !draft.predicates.contains(&p.name))
            .collect();

        if self.config.mirror_symmetry {
            action = mirror_action(&action, draft.predicates.iter().chain(new_predicates.iter()));
        }

        log::info!(
            "Built '{}' in {} attempt(s) ({:?}), {} new predicate(s)",
            name,
            attempts,
            status,
            new_predicates.len()
        );

        Ok(RefinementOutcome {
            action,
            new_predicates,
            attempts,
            status,
            rejections,
            transcript,
        })
    }
}
