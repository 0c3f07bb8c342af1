//! Query routing, retrieval aggregation and answer synthesis over per-component collections.

pub mod bootstrap;
pub mod collection;
pub mod components;
pub mod config;
pub mod error;
pub mod ingest;
pub mod pipeline;
pub mod prompt;
pub mod retriever;
pub mod router;
pub mod synthesizer;
pub mod vault;

pub use collection::{CollectionName, collection_name_for, normalize_component_name};
pub use components::KnownComponents;
pub use config::Config;
pub use error::RagError;
pub use pipeline::{NO_RESULTS_MESSAGE, QueryAnswer, QueryPipeline};
pub use retriever::{RetrievalAggregator, RetrievalContext, RetrievalOutcome};
pub use router::{QueryRouter, RoutingDecision};
pub use synthesizer::AnswerSynthesizer;
