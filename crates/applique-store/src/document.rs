//! Stored chunk representation: `page_content` plus a `metadata` object.
//!
//! This is the payload shape every per-component collection holds, so the
//! retrieval side can decode whatever the ingestion side wrote.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::vector_store::{ScoredVectorPoint, VectorStoreError};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    #[serde(default)]
    pub component_name: String,
    #[serde(default)]
    pub url: String,
    /// Section flags, chunk index and anything else written at ingest time.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub page_content: String,
    #[serde(default)]
    pub metadata: DocumentMetadata,
}

impl Document {
    #[must_use]
    pub fn new(page_content: impl Into<String>, metadata: DocumentMetadata) -> Self {
        Self {
            page_content: page_content.into(),
            metadata,
        }
    }

    /// Encode as a vector store payload.
    ///
    /// # Errors
    ///
    /// Returns [`VectorStoreError::Serialization`] if a metadata value cannot be encoded.
    pub fn to_payload(&self) -> Result<HashMap<String, serde_json::Value>, VectorStoreError> {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => Ok(map.into_iter().collect()),
            Ok(other) => Err(VectorStoreError::Serialization(format!(
                "document encoded as non-object: {other}"
            ))),
            Err(e) => Err(VectorStoreError::Serialization(e.to_string())),
        }
    }

    /// Decode a stored payload. A missing `page_content` decodes as empty text;
    /// a field of the wrong type is an error.
    ///
    /// # Errors
    ///
    /// Returns [`VectorStoreError::Serialization`] on type mismatches.
    pub fn from_payload(payload: HashMap<String, serde_json::Value>) -> Result<Self, VectorStoreError> {
        serde_json::from_value(serde_json::Value::Object(payload.into_iter().collect()))
            .map_err(|e| VectorStoreError::Serialization(e.to_string()))
    }
}

/// A stored document returned by similarity search.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredDocument {
    pub id: String,
    pub score: f32,
    pub document: Document,
}

impl ScoredDocument {
    /// # Errors
    ///
    /// Returns [`VectorStoreError::Serialization`] if the payload does not decode.
    pub fn from_scored_point(point: ScoredVectorPoint) -> Result<Self, VectorStoreError> {
        Ok(Self {
            id: point.id,
            score: point.score,
            document: Document::from_payload(point.payload)?,
        })
    }
}

/// Deterministic point id so re-ingesting the same page overwrites its chunks.
#[must_use]
pub fn point_id(collection: &str, url: &str, chunk_index: usize) -> String {
    let key = format!("{collection}\n{url}\n{chunk_index}");
    Uuid::new_v5(&Uuid::NAMESPACE_URL, key.as_bytes()).to_string()
}
