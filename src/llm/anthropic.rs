//! Anthropic Messages API client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::RETRY_AFTER;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{PddlsmithError, Result};
use crate::llm::client::{LlmClient, UsageMeter};
use crate::llm::types::{CompletionRequest, CompletionResponse, Message, StopReason, Usage};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";

const ANTHROPIC_VERSION: &str = "2023-06-01";

pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Configuration for the Anthropic client
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    pub model: String,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: Duration::from_secs(300),
        }
    }
}

impl AnthropicConfig {
    pub fn with_model(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }
}

pub struct AnthropicClient {
    client: Client,
    api_key: String,
    config: AnthropicConfig,
    usage: UsageMeter,
}

impl AnthropicClient {
    /// Create a client reading ANTHROPIC_API_KEY from the environment
    pub fn new(config: AnthropicConfig) -> Result<Self> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .map_err(|_| PddlsmithError::Llm("ANTHROPIC_API_KEY not set".to_string()))?;

        Self::with_api_key(api_key, config)
    }

    pub fn with_api_key(api_key: String, config: AnthropicConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PddlsmithError::Llm(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            config,
            usage: UsageMeter::default(),
        })
    }

    fn build_request<'a>(&'a self, request: &'a CompletionRequest) -> MessagesBody<'a> {
        MessagesBody {
            model: &self.config.model,
            max_tokens: request.max_tokens.unwrap_or(self.config.max_tokens),
            system: request.system.as_deref(),
            messages: &request.messages,
        }
    }

    fn parse_response(&self, body: Value) -> Result<CompletionResponse> {
        let reply: MessagesReply = serde_json::from_value(body)?;

        let stop_reason = match reply.stop_reason.as_deref() {
            Some("max_tokens") => StopReason::MaxTokens,
            Some("stop_sequence") => StopReason::StopSequence,
            _ => StopReason::EndTurn,
        };
        let usage = reply.usage.unwrap_or_default();
        self.usage.record(&usage);

        let blocks = reply
            .content
            .ok_or_else(|| PddlsmithError::Llm("Response has no content array".to_string()))?;
        let content = blocks
            .into_iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text),
                ContentBlock::Other => None,
            })
            .collect::<Vec<_>>()
            .join("\n");

        if stop_reason.is_truncated() {
            log::warn!("Answer cut off at {} output tokens", usage.output_tokens);
        }

        Ok(CompletionResponse {
            content,
            stop_reason,
            usage,
        })
    }

    async fn send_request(&self, body: &MessagesBody<'_>) -> Result<Value> {
        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(body)
            .send()
            .await
            .map_err(|e| PddlsmithError::Llm(format!("Request to {} failed: {}", body.model, e)))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let wait = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(PddlsmithError::Llm(format!("Rate limited, retry after {}s", wait)));
        }
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(PddlsmithError::Llm(format!("API returned {}: {}", status, detail)));
        }

        response
            .json()
            .await
            .map_err(|e| PddlsmithError::Llm(format!("Unreadable response body: {}", e)))
    }
}

/// Body of a Messages API call
#[derive(Debug, Serialize)]
struct MessagesBody<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: &'a [Message],
}

#[derive(Debug, Deserialize)]
struct MessagesReply {
    content: Option<Vec<ContentBlock>>,
    stop_reason: Option<String>,
    usage: Option<Usage>,
}

/// Only text blocks carry an answer; tool use and thinking are skipped.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text { text: String },
    #[serde(other)]
    Other,
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let body = self.build_request(&request);
        log::debug!("Sending {} message(s) to {}", body.messages.len(), body.model);
        let response = self.send_request(&body).await?;
        self.parse_response(response)
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    fn is_ready(&self) -> bool {
        !self.api_key.is_empty()
    }

    fn usage(&self) -> Usage {
        self.usage.snapshot()
    }

    fn reset_usage(&self) {
        self.usage.reset();
    }
}

impl std::fmt::Debug for AnthropicClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicClient")
            .field("model", &self.config.model)
            .field("max_tokens", &self.config.max_tokens)
            .finish()
    }
}
