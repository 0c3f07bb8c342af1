use serde::{Deserialize, Serialize};

use crate::vault::Secret;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub retrieval: RetrievalSettings,
    #[serde(default)]
    pub components: ComponentsConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
    #[serde(skip)]
    pub secrets: ResolvedSecrets,
}

/// OpenAI-compatible chat and embeddings endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_llm_base_url() -> String {
    "https://api.openai.com/v1".into()
}

fn default_llm_model() -> String {
    "gpt-3.5-turbo".into()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".into()
}

fn default_max_retries() -> u32 {
    2
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            embedding_model: default_embedding_model(),
            max_tokens: None,
            max_retries: default_max_retries(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    #[serde(default = "default_qdrant_url")]
    pub qdrant_url: String,
}

fn default_qdrant_url() -> String {
    "http://localhost:6334".into()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            qdrant_url: default_qdrant_url(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetrievalSettings {
    /// Hits requested from each routed collection.
    #[serde(default = "default_per_collection_limit")]
    pub per_collection_limit: u64,
    /// Upper bound on entries handed to synthesis, applied after concatenation.
    #[serde(default = "default_context_cap")]
    pub context_cap: usize,
    /// Collection used when routing fails.
    #[serde(default = "default_fallback_collection")]
    pub fallback_collection: String,
    #[serde(default = "default_true")]
    pub concurrent: bool,
}

fn default_per_collection_limit() -> u64 {
    2
}

fn default_context_cap() -> usize {
    2
}

fn default_fallback_collection() -> String {
    crate::collection::FALLBACK_COLLECTION.into()
}

fn default_true() -> bool {
    true
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            per_collection_limit: default_per_collection_limit(),
            context_cap: default_context_cap(),
            fallback_collection: default_fallback_collection(),
            concurrent: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ComponentsConfig {
    #[serde(default = "default_components_path")]
    pub path: String,
}

fn default_components_path() -> String {
    "component_names.txt".into()
}

impl Default for ComponentsConfig {
    fn default() -> Self {
        Self {
            path: default_components_path(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct IngestConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
    #[serde(default = "default_max_description_chars")]
    pub max_description_chars: usize,
}

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    200
}

fn default_max_description_chars() -> usize {
    2000
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            max_description_chars: default_max_description_chars(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct TimeoutConfig {
    #[serde(default = "default_llm_timeout")]
    pub llm_request_timeout_secs: u64,
    #[serde(default = "default_embedding_timeout")]
    pub embedding_request_timeout_secs: u64,
    #[serde(default = "default_store_timeout")]
    pub store_request_timeout_secs: u64,
}

fn default_llm_timeout() -> u64 {
    60
}

fn default_embedding_timeout() -> u64 {
    30
}

fn default_store_timeout() -> u64 {
    10
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            llm_request_timeout_secs: default_llm_timeout(),
            embedding_request_timeout_secs: default_embedding_timeout(),
            store_request_timeout_secs: default_store_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewayConfig {
    #[serde(default = "default_gateway_bind")]
    pub bind: String,
    #[serde(default = "default_gateway_port")]
    pub port: u16,
    #[serde(default)]
    pub auth_token: Option<String>,
    #[serde(default = "default_gateway_rate_limit")]
    pub rate_limit: u32,
    #[serde(default = "default_gateway_max_body")]
    pub max_body_size: usize,
}

fn default_gateway_bind() -> String {
    "127.0.0.1".into()
}

fn default_gateway_port() -> u16 {
    5000
}

fn default_gateway_rate_limit() -> u32 {
    120
}

fn default_gateway_max_body() -> usize {
    65_536
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: default_gateway_bind(),
            port: default_gateway_port(),
            auth_token: None,
            rate_limit: default_gateway_rate_limit(),
            max_body_size: default_gateway_max_body(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// `""` disables export, `"otlp"` ships spans to `endpoint`.
    #[serde(default)]
    pub exporter: String,
    #[serde(default = "default_otlp_endpoint")]
    pub endpoint: String,
}

fn default_otlp_endpoint() -> String {
    "http://localhost:4317".into()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            exporter: String::new(),
            endpoint: default_otlp_endpoint(),
        }
    }
}

#[derive(Debug, Default)]
pub struct ResolvedSecrets {
    pub openai_api_key: Option<Secret>,
}
