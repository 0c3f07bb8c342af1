//! Test-only mock LLM provider.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::LlmError;
use crate::provider::{ChatParams, LlmProvider, Message};

/// One recorded `chat` invocation.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub messages: Vec<Message>,
    pub params: ChatParams,
}

#[derive(Debug, Clone)]
pub struct MockProvider {
    responses: Arc<Mutex<VecDeque<Result<String, String>>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    embed_calls: Arc<Mutex<usize>>,
    pub default_response: String,
    pub embedding: Vec<f32>,
    pub supports_embeddings: bool,
    pub fail_chat: bool,
    pub fail_embed: bool,
    /// Milliseconds to sleep before returning a chat response.
    pub delay_ms: u64,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            embed_calls: Arc::new(Mutex::new(0)),
            default_response: "mock response".into(),
            embedding: vec![0.1, 0.2, 0.3, 0.4],
            supports_embeddings: true,
            fail_chat: false,
            fail_embed: false,
            delay_ms: 0,
        }
    }
}

impl MockProvider {
    /// Replies are consumed in order; once drained, `default_response` is returned.
    #[must_use]
    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses.into_iter().map(Ok).collect())),
            ..Self::default()
        }
    }

    /// Scripted replies where `Err(msg)` makes that call fail.
    #[must_use]
    pub fn with_script(script: Vec<Result<String, String>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(script.into_iter().collect())),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail_chat: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_delay(mut self, ms: u64) -> Self {
        self.delay_ms = ms;
        self
    }

    #[must_use]
    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = embedding;
        self
    }

    #[must_use]
    pub fn with_failing_embed(mut self) -> Self {
        self.fail_embed = true;
        self
    }

    /// Every `chat` invocation seen so far, including failed ones.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn chat_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn embed_count(&self) -> usize {
        *self
            .embed_calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl LlmProvider for MockProvider {
    async fn chat(&self, messages: &[Message], params: ChatParams) -> Result<String, LlmError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedCall {
                messages: messages.to_vec(),
                params,
            });
        if self.delay_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.delay_ms)).await;
        }
        if self.fail_chat {
            return Err(LlmError::Other("mock LLM error".into()));
        }
        let next = self
            .responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        match next {
            Some(Ok(text)) => Ok(text),
            Some(Err(msg)) => Err(LlmError::Other(msg)),
            None => Ok(self.default_response.clone()),
        }
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>, LlmError> {
        *self
            .embed_calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner) += 1;
        if !self.supports_embeddings {
            return Err(LlmError::EmbedUnsupported {
                provider: "mock".into(),
            });
        }
        if self.fail_embed {
            return Err(LlmError::Other("mock embed error".into()));
        }
        Ok(self.embedding.clone())
    }

    fn supports_embeddings(&self) -> bool {
        self.supports_embeddings
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn responses_consumed_in_order_then_default() {
        let p = MockProvider::with_responses(vec!["a".into(), "b".into()]);
        let msgs = [Message::user("x")];
        assert_eq!(p.chat(&msgs, ChatParams::default()).await.unwrap(), "a");
        assert_eq!(p.chat(&msgs, ChatParams::default()).await.unwrap(), "b");
        assert_eq!(
            p.chat(&msgs, ChatParams::default()).await.unwrap(),
            "mock response"
        );
        assert_eq!(p.chat_count(), 3);
    }

    #[tokio::test]
    async fn script_errors_fail_that_call() {
        let p = MockProvider::with_script(vec![Err("boom".into()), Ok("ok".into())]);
        let msgs = [Message::user("x")];
        assert!(p.chat(&msgs, ChatParams::default()).await.is_err());
        assert_eq!(p.chat(&msgs, ChatParams::default()).await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn clones_share_call_log() {
        let p = MockProvider::default();
        let clone = p.clone();
        clone
            .chat(&[Message::user("x")], ChatParams::deterministic())
            .await
            .unwrap();
        assert_eq!(p.chat_count(), 1);
        assert_eq!(p.calls()[0].params.temperature, Some(0.0));
    }

    #[tokio::test]
    async fn failing_embed_counts_call() {
        let p = MockProvider::default().with_failing_embed();
        assert!(p.embed("x").await.is_err());
        assert_eq!(p.embed_count(), 1);
    }
}
