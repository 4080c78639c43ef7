//! LLM client layer
//!
//! This module provides:
//! - Message and usage types
//! - The LlmClient trait and a scripted MockLlmClient
//! - AnthropicClient implementation

pub mod anthropic;
pub mod client;
pub mod types;

pub use anthropic::{AnthropicClient, AnthropicConfig};
pub use client::{LlmClient, MockLlmClient, UsageMeter, estimate_tokens};
pub use types::{CompletionRequest, CompletionResponse, Message, Role, StopReason, Usage};
