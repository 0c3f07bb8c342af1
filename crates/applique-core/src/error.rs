use std::future::Future;
use std::time::Duration;

use applique_llm::LlmError;
use applique_store::VectorStoreError;

#[derive(Debug, thiserror::Error)]
pub enum RagError {
    /// Missing credentials or prerequisite resources. Fatal before any network call.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("provider error: {0}")]
    Provider(#[from] LlmError),

    #[error("vector store error: {0}")]
    Store(#[from] VectorStoreError),

    #[error("{operation} timed out after {limit:?}")]
    Timeout {
        operation: &'static str,
        limit: Duration,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RagError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

pub type Result<T> = std::result::Result<T, RagError>;

/// Await `fut` with an upper bound, folding both failure modes into [`RagError`].
pub(crate) async fn timed<T, E, F>(operation: &'static str, limit: Duration, fut: F) -> Result<T>
where
    F: Future<Output = std::result::Result<T, E>>,
    E: Into<RagError>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result.map_err(Into::into),
        Err(_) => Err(RagError::Timeout { operation, limit }),
    }
}
