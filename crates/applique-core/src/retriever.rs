//! Per-collection similarity search merged into a bounded context.
//!
//! Collections are searched in routing order and concatenated without a
//! global re-sort, then truncated to the context cap. A collection that is
//! missing, errors or times out contributes nothing; it never fails the query.
//! Hits from an earlier-routed collection can therefore crowd out better hits
//! from a later one. Re-ranking across collections would fix that.

use std::sync::Arc;
use std::time::Duration;

use applique_llm::LlmProvider;
use applique_store::{ScoredDocument, VectorStore};

use crate::collection::CollectionName;
use crate::error::{RagError, timed};
use crate::router::RoutingDecision;

#[derive(Debug, Clone, Copy)]
pub struct RetrievalConfig {
    pub per_collection_limit: u64,
    pub context_cap: usize,
    pub concurrent: bool,
    pub embedding_timeout: Duration,
    pub store_timeout: Duration,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            per_collection_limit: 2,
            context_cap: 2,
            concurrent: true,
            embedding_timeout: Duration::from_secs(30),
            store_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContextEntry {
    pub collection: CollectionName,
    pub hit: ScoredDocument,
}

/// Non-empty, capped sequence of hits in routing order.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalContext {
    entries: Vec<ContextEntry>,
}

impl RetrievalContext {
    #[must_use]
    pub fn entries(&self) -> &[ContextEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; an empty context is reported as [`RetrievalOutcome::NoContext`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn passages(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .map(|e| e.hit.document.page_content.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RetrievalOutcome {
    Context(RetrievalContext),
    NoContext,
}

impl RetrievalOutcome {
    #[must_use]
    pub fn context(&self) -> Option<&RetrievalContext> {
        match self {
            Self::Context(ctx) => Some(ctx),
            Self::NoContext => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionStatus {
    Hits(usize),
    Missing,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionReport {
    pub collection: CollectionName,
    pub status: CollectionStatus,
}

/// Outcome plus what happened in each routed collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Retrieval {
    pub outcome: RetrievalOutcome,
    pub collections: Vec<CollectionReport>,
}

pub struct RetrievalAggregator<P> {
    provider: Arc<P>,
    store: Arc<dyn VectorStore>,
    config: RetrievalConfig,
}

impl<P: LlmProvider> RetrievalAggregator<P> {
    #[must_use]
    pub fn new(provider: Arc<P>, store: Arc<dyn VectorStore>, config: RetrievalConfig) -> Self {
        Self {
            provider,
            store,
            config,
        }
    }

    /// Embed the query once and search every routed collection.
    pub async fn aggregate(&self, query: &str, decision: &RoutingDecision) -> Retrieval {
        if decision.is_empty() {
            return Retrieval {
                outcome: RetrievalOutcome::NoContext,
                collections: Vec::new(),
            };
        }

        let vector = match timed(
            "query embedding",
            self.config.embedding_timeout,
            self.provider.embed(query),
        )
        .await
        {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "query embedding failed, no collections searched");
                let reason = e.to_string();
                return Retrieval {
                    outcome: RetrievalOutcome::NoContext,
                    collections: decision
                        .collections()
                        .iter()
                        .map(|c| CollectionReport {
                            collection: c.clone(),
                            status: CollectionStatus::Failed(reason.clone()),
                        })
                        .collect(),
                };
            }
        };

        let per_collection: Vec<(CollectionStatus, Vec<ScoredDocument>)> = if self.config.concurrent {
            futures::future::join_all(
                decision
                    .collections()
                    .iter()
                    .map(|c| self.search_collection(c, &vector)),
            )
            .await
        } else {
            let mut out = Vec::with_capacity(decision.len());
            for c in decision.collections() {
                out.push(self.search_collection(c, &vector).await);
            }
            out
        };

        let mut entries = Vec::new();
        let mut reports = Vec::with_capacity(per_collection.len());
        for (collection, (status, hits)) in decision.collections().iter().zip(per_collection) {
            entries.extend(hits.into_iter().map(|hit| ContextEntry {
                collection: collection.clone(),
                hit,
            }));
            reports.push(CollectionReport {
                collection: collection.clone(),
                status,
            });
        }
        let found = entries.len();
        entries.truncate(self.config.context_cap);

        tracing::info!(
            routed = decision.len(),
            found,
            kept = entries.len(),
            "retrieval finished"
        );

        let outcome = if entries.is_empty() {
            RetrievalOutcome::NoContext
        } else {
            RetrievalOutcome::Context(RetrievalContext { entries })
        };
        Retrieval {
            outcome,
            collections: reports,
        }
    }

    async fn search_collection(
        &self,
        collection: &CollectionName,
        vector: &[f32],
    ) -> (CollectionStatus, Vec<ScoredDocument>) {
        match self.try_search(collection, vector).await {
            Ok(Some(hits)) => {
                tracing::debug!(collection = %collection, count = hits.len(), "collection searched");
                (CollectionStatus::Hits(hits.len()), hits)
            }
            Ok(None) => {
                tracing::info!(collection = %collection, "collection does not exist");
                (CollectionStatus::Missing, Vec::new())
            }
            Err(e) => {
                tracing::warn!(collection = %collection, error = %e, "collection search failed");
                (CollectionStatus::Failed(e.to_string()), Vec::new())
            }
        }
    }

    async fn try_search(
        &self,
        collection: &CollectionName,
        vector: &[f32],
    ) -> Result<Option<Vec<ScoredDocument>>, RagError> {
        let timeout = self.config.store_timeout;
        if !timed(
            "collection probe",
            timeout,
            self.store.collection_exists(collection.as_str()),
        )
        .await?
        {
            return Ok(None);
        }

        let points = timed(
            "collection search",
            timeout,
            self.store.search(
                collection.as_str(),
                vector.to_vec(),
                self.config.per_collection_limit,
            ),
        )
        .await?;

        let mut hits = Vec::with_capacity(points.len());
        for point in points {
            match ScoredDocument::from_scored_point(point) {
                Ok(doc) => hits.push(doc),
                Err(e) => {
                    tracing::warn!(collection = %collection, error = %e, "skipping undecodable point");
                }
            }
        }
        Ok(Some(hits))
    }
}
