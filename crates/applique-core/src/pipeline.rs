//! End-to-end query handling: route, retrieve, synthesize.

use std::sync::Arc;
use std::time::Duration;

use applique_llm::LlmProvider;
use applique_store::VectorStore;

use crate::collection::{CollectionName, FALLBACK_COLLECTION};
use crate::components::KnownComponents;
use crate::config::Config;
use crate::error::RagError;
use crate::retriever::{Retrieval, RetrievalAggregator, RetrievalConfig, RetrievalOutcome};
use crate::router::{QueryRouter, RoutingDecision};
use crate::synthesizer::AnswerSynthesizer;

/// Returned instead of a synthesized answer when retrieval finds nothing.
pub const NO_RESULTS_MESSAGE: &str = "No relevant information found for your query. Please try a different question about the Appliqué Design System components.";

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub fallback_collection: CollectionName,
    pub retrieval: RetrievalConfig,
    pub llm_timeout: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            fallback_collection: CollectionName::from_raw(FALLBACK_COLLECTION),
            retrieval: RetrievalConfig::default(),
            llm_timeout: Duration::from_secs(60),
        }
    }
}

impl PipelineSettings {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            fallback_collection: CollectionName::from_raw(
                config.retrieval.fallback_collection.trim(),
            ),
            retrieval: RetrievalConfig {
                per_collection_limit: config.retrieval.per_collection_limit,
                context_cap: config.retrieval.context_cap,
                concurrent: config.retrieval.concurrent,
                embedding_timeout: config.timeouts.embedding(),
                store_timeout: config.timeouts.store(),
            },
            llm_timeout: config.timeouts.llm(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct QueryAnswer {
    /// Synthesized answer, or [`NO_RESULTS_MESSAGE`].
    pub text: String,
    pub routing: RoutingDecision,
    pub retrieval: Retrieval,
}

impl QueryAnswer {
    #[must_use]
    pub fn found_context(&self) -> bool {
        matches!(self.retrieval.outcome, RetrievalOutcome::Context(_))
    }
}

pub struct QueryPipeline<P> {
    router: QueryRouter<P>,
    aggregator: RetrievalAggregator<P>,
    synthesizer: AnswerSynthesizer<P>,
}

impl<P: LlmProvider> QueryPipeline<P> {
    #[must_use]
    pub fn new(provider: Arc<P>, store: Arc<dyn VectorStore>, settings: PipelineSettings) -> Self {
        Self {
            router: QueryRouter::new(
                Arc::clone(&provider),
                settings.fallback_collection,
                settings.llm_timeout,
            ),
            aggregator: RetrievalAggregator::new(Arc::clone(&provider), store, settings.retrieval),
            synthesizer: AnswerSynthesizer::new(provider, settings.llm_timeout),
        }
    }

    /// Answer `query` from the collections of `known`.
    ///
    /// Routing and retrieval problems degrade (fallback collection, skipped
    /// collections) and never surface here.
    ///
    /// # Errors
    ///
    /// [`RagError::Configuration`] when `known` is empty, before any network call;
    /// otherwise only synthesis failures.
    pub async fn process_query(
        &self,
        query: &str,
        known: &KnownComponents,
    ) -> Result<QueryAnswer, RagError> {
        if known.is_empty() {
            return Err(RagError::configuration(
                "no known components; run ingestion first",
            ));
        }

        let routing = self.router.route(query, known).await;
        let retrieval = self.aggregator.aggregate(query, &routing).await;

        let text = match &retrieval.outcome {
            RetrievalOutcome::Context(context) => {
                self.synthesizer.synthesize(query, context).await?
            }
            RetrievalOutcome::NoContext => {
                tracing::info!(
                    routed = routing.len(),
                    "no context found, skipping synthesis"
                );
                NO_RESULTS_MESSAGE.to_owned()
            }
        };

        Ok(QueryAnswer {
            text,
            routing,
            retrieval,
        })
    }
}
