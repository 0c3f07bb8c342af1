#[cfg(feature = "mock")]
use crate::mock::MockProvider;
use crate::openai::OpenAiProvider;

use crate::error::LlmError;
use crate::provider::{ChatParams, LlmProvider, Message};

/// Generates a match over all `AnyProvider` variants, binding the inner provider
/// and evaluating the given expression for each arm.
macro_rules! delegate_provider {
    ($self:expr, |$p:ident| $expr:expr) => {
        match $self {
            AnyProvider::OpenAi($p) => $expr,
            #[cfg(feature = "mock")]
            AnyProvider::Mock($p) => $expr,
        }
    };
}

/// Provider selected at runtime from configuration.
#[derive(Debug, Clone)]
pub enum AnyProvider {
    OpenAi(OpenAiProvider),
    #[cfg(feature = "mock")]
    Mock(MockProvider),
}

impl LlmProvider for AnyProvider {
    async fn chat(&self, messages: &[Message], params: ChatParams) -> Result<String, LlmError> {
        delegate_provider!(self, |p| p.chat(messages, params).await)
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        delegate_provider!(self, |p| p.embed(text).await)
    }

    fn supports_embeddings(&self) -> bool {
        delegate_provider!(self, |p| p.supports_embeddings())
    }

    fn name(&self) -> &str {
        delegate_provider!(self, |p| p.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openai_variant_delegates_name() {
        let p = AnyProvider::OpenAi(OpenAiProvider::new(
            "k".into(),
            "http://localhost".into(),
            "m".into(),
            Some("e".into()),
        ));
        assert_eq!(p.name(), "openai");
        assert!(p.supports_embeddings());
    }

    #[tokio::test]
    async fn openai_variant_propagates_errors() {
        let p = AnyProvider::OpenAi(OpenAiProvider::new(
            "k".into(),
            "http://127.0.0.1:1".into(),
            "m".into(),
            None,
        ));
        assert!(p.embed("x").await.is_err());
    }
}
