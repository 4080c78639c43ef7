//! LLM client trait and a scripted mock

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::error::{PddlsmithError, Result};
use crate::llm::types::{CompletionRequest, CompletionResponse, StopReason, Usage};

/// A chat-completion backend. Calls are awaited one at a time; retries and
/// rate limiting belong to the implementation.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Complete a single prompt or a multi-turn conversation
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Get the model name being used
    fn model(&self) -> &str;

    fn is_ready(&self) -> bool {
        true
    }

    /// Cumulative usage since creation or the last [`LlmClient::reset_usage`]
    fn usage(&self) -> Usage;

    fn reset_usage(&self);
}

/// Rough token estimate, ~4 characters per token for English text
pub fn estimate_tokens(text: &str) -> u64 {
    (text.len() / 4) as u64
}

/// Cumulative usage shared across calls
#[derive(Debug, Default)]
pub struct UsageMeter {
    total: Mutex<Usage>,
}

impl UsageMeter {
    fn lock(&self) -> MutexGuard<'_, Usage> {
        self.total.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn record(&self, usage: &Usage) {
        self.lock().add(usage);
    }

    pub fn snapshot(&self) -> Usage {
        *self.lock()
    }

    pub fn reset(&self) {
        *self.lock() = Usage::default();
    }
}

type Responder = Box<dyn Fn(&CompletionRequest) -> String + Send + Sync>;

enum Script {
    Queue(Mutex<VecDeque<CompletionResponse>>),
    Responder(Responder),
}

/// Client that answers from a script instead of a remote model.
///
/// Either replays a fixed queue of responses (an exhausted queue is an
/// error) or computes each answer from the request. Every request is kept
/// for inspection.
pub struct MockLlmClient {
    script: Script,
    requests: Mutex<Vec<CompletionRequest>>,
    usage: UsageMeter,
}

impl MockLlmClient {
    pub fn new(responses: Vec<CompletionResponse>) -> Self {
        Self {
            script: Script::Queue(Mutex::new(responses.into())),
            requests: Mutex::new(Vec::new()),
            usage: UsageMeter::default(),
        }
    }

    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(texts.into_iter().map(CompletionResponse::new).collect())
    }

    pub fn with_responder(responder: impl Fn(&CompletionRequest) -> String + Send + Sync + 'static) -> Self {
        Self {
            script: Script::Responder(Box::new(responder)),
            requests: Mutex::new(Vec::new()),
            usage: UsageMeter::default(),
        }
    }

    /// Requests received so far, in order
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Responses still queued; always zero for a responder
    pub fn remaining(&self) -> usize {
        match &self.script {
            Script::Queue(queue) => queue.lock().unwrap_or_else(PoisonError::into_inner).len(),
            Script::Responder(_) => 0,
        }
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let mut response = match &self.script {
            Script::Queue(queue) => queue
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_front()
                .ok_or_else(|| PddlsmithError::Llm("mock response queue exhausted".to_string()))?,
            Script::Responder(responder) => CompletionResponse::new(responder(&request)),
        };

        if response.usage.total() == 0 {
            response.usage = Usage::new(estimate_tokens(&request.prompt_text()), estimate_tokens(&response.content));
        }
        if response.stop_reason != StopReason::EndTurn {
            log::debug!("Mock response stops with {:?}", response.stop_reason);
        }
        self.usage.record(&response.usage);
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);
        Ok(response)
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    fn usage(&self) -> Usage {
        self.usage.snapshot()
    }

    fn reset_usage(&self) {
        self.usage.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::types::Message;

    #[test]
    fn test_estimate_tokens() {
        assert_eq!(estimate_tokens("Hello, world!"), 3);
        assert_eq!(estimate_tokens(""), 0);
    }

    #[test]
    fn test_usage_meter() {
        let meter = UsageMeter::default();
        meter.record(&Usage::new(10, 5));
        meter.record(&Usage::new(1, 1));
        assert_eq!(meter.snapshot(), Usage::new(11, 6));
        meter.reset();
        assert_eq!(meter.snapshot().total(), 0);
    }

    #[tokio::test]
    async fn test_mock_queue_in_order() {
        let mock = MockLlmClient::from_texts(["first", "second"]);
        let a = mock.complete(CompletionRequest::from_prompt("one")).await.unwrap();
        let b = mock.complete(CompletionRequest::from_prompt("two")).await.unwrap();
        assert_eq!(a.content, "first");
        assert_eq!(b.content, "second");
        assert_eq!(mock.remaining(), 0);
        assert_eq!(mock.requests()[1].messages[0], Message::user("two"));
    }

    #[tokio::test]
    async fn test_mock_exhausted_is_error() {
        let mock = MockLlmClient::new(vec![]);
        let err = mock.complete(CompletionRequest::from_prompt("x")).await.unwrap_err();
        assert!(matches!(err, PddlsmithError::Llm(_)));
    }

    #[tokio::test]
    async fn test_mock_responder_sees_request() {
        let mock = MockLlmClient::with_responder(|req| format!("{} turns", req.messages.len()));
        let req = CompletionRequest::from_messages(vec![Message::user("a"), Message::assistant("b"), Message::user("c")]);
        let response = mock.complete(req).await.unwrap();
        assert_eq!(response.content, "3 turns");
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_usage_tracking() {
        let mock = MockLlmClient::from_texts(["abcdefgh"]);
        mock.complete(CompletionRequest::from_prompt("abcd")).await.unwrap();
        assert_eq!(mock.usage(), Usage::new(1, 2));
        mock.reset_usage();
        assert_eq!(mock.usage().total(), 0);
        assert_eq!(mock.model(), "mock-model");
        assert!(mock.is_ready());
    }
}
