//! Seam between the HTTP layer and whatever answers queries.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;

use applique_core::{KnownComponents, QueryPipeline, RagError};
use applique_llm::LlmProvider;

pub type ServiceFuture<'a> = Pin<Box<dyn Future<Output = Result<String, QueryFailure>> + Send + 'a>>;

/// Why a query could not be answered, split by who is at fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryFailure {
    /// Caller-fixable, e.g. ingestion has not run yet. Mapped to 400.
    BadRequest(String),
    /// Mapped to 500.
    Internal(String),
}

impl From<RagError> for QueryFailure {
    fn from(e: RagError) -> Self {
        if e.is_configuration() {
            Self::BadRequest(e.to_string())
        } else {
            Self::Internal(e.to_string())
        }
    }
}

pub trait QueryService: Send + Sync {
    fn answer<'a>(&'a self, query: &'a str) -> ServiceFuture<'a>;
}

/// Answers through a [`QueryPipeline`], re-reading the known-components file
/// on every request so a fresh ingestion is picked up without a restart.
pub struct PipelineService<P> {
    pipeline: Arc<QueryPipeline<P>>,
    components_path: PathBuf,
}

impl<P> PipelineService<P> {
    #[must_use]
    pub fn new(pipeline: Arc<QueryPipeline<P>>, components_path: PathBuf) -> Self {
        Self {
            pipeline,
            components_path,
        }
    }
}

impl<P: LlmProvider + 'static> QueryService for PipelineService<P> {
    fn answer<'a>(&'a self, query: &'a str) -> ServiceFuture<'a> {
        Box::pin(async move {
            let known = KnownComponents::load(&self.components_path).await?;
            let answer = self.pipeline.process_query(query, &known).await?;
            Ok(answer.text)
        })
    }
}
