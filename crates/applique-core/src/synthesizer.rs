use std::sync::Arc;
use std::time::Duration;

use applique_llm::{ChatParams, LlmProvider, Message};

use crate::error::{RagError, timed};
use crate::prompt::{AnswerPromptConfig, build_answer_prompt};
use crate::retriever::RetrievalContext;

/// Turns retrieved passages and the question into a single grounded completion.
pub struct AnswerSynthesizer<P> {
    provider: Arc<P>,
    timeout: Duration,
    params: ChatParams,
}

impl<P: LlmProvider> AnswerSynthesizer<P> {
    #[must_use]
    pub fn new(provider: Arc<P>, timeout: Duration) -> Self {
        Self {
            provider,
            timeout,
            params: ChatParams::default(),
        }
    }

    #[must_use]
    pub fn with_params(mut self, params: ChatParams) -> Self {
        self.params = params;
        self
    }

    /// Returns the provider's text verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Provider`] or [`RagError::Timeout`] when the completion fails.
    pub async fn synthesize(&self, query: &str, context: &RetrievalContext) -> Result<String, RagError> {
        let passages: Vec<&str> = context.passages().collect();
        let prompt = build_answer_prompt(&AnswerPromptConfig {
            passages: &passages,
            query,
        });
        let messages = [Message::system(prompt.system), Message::user(prompt.user)];

        let answer = timed(
            "answer synthesis",
            self.timeout,
            self.provider.chat(&messages, self.params),
        )
        .await?;
        tracing::debug!(passages = passages.len(), answer_len = answer.len(), "answer synthesized");
        Ok(answer)
    }
}
