//! Per-component vector collections: store contract, Qdrant adapter and document codec.

pub mod document;
pub mod in_memory_store;
pub mod qdrant_ops;
pub mod splitter;
pub mod vector_store;

pub use document::{Document, DocumentMetadata, ScoredDocument};
pub use in_memory_store::InMemoryVectorStore;
pub use qdrant_ops::QdrantOps;
pub use splitter::{SplitterConfig, TextSplitter};
pub use vector_store::{BoxFuture, ScoredVectorPoint, VectorPoint, VectorStore, VectorStoreError};
