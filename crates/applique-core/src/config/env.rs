use super::Config;

fn parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    let v = std::env::var(key).ok()?;
    match v.trim().parse::<T>() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            tracing::warn!("ignoring invalid {key} value: {v}");
            None
        }
    }
}

impl Config {
    pub(crate) fn apply_env_overrides(&mut self) {
        self.apply_env_overrides_query();
        self.apply_env_overrides_service();
    }

    fn apply_env_overrides_query(&mut self) {
        if let Ok(v) = std::env::var("APPLIQUE_LLM_BASE_URL") {
            self.llm.base_url = v;
        }
        if let Ok(v) = std::env::var("APPLIQUE_LLM_MODEL") {
            self.llm.model = v;
        }
        if let Ok(v) = std::env::var("APPLIQUE_LLM_EMBEDDING_MODEL") {
            self.llm.embedding_model = v;
        }
        if let Some(n) = parsed::<u32>("APPLIQUE_LLM_MAX_TOKENS") {
            self.llm.max_tokens = Some(n);
        }
        if let Some(n) = parsed::<u32>("APPLIQUE_LLM_MAX_RETRIES") {
            self.llm.max_retries = n;
        }
        if let Ok(v) = std::env::var("APPLIQUE_QDRANT_URL") {
            self.store.qdrant_url = v;
        }
        if let Some(n) = parsed::<u64>("APPLIQUE_RETRIEVAL_PER_COLLECTION_LIMIT") {
            self.retrieval.per_collection_limit = n;
        }
        if let Some(n) = parsed::<usize>("APPLIQUE_RETRIEVAL_CONTEXT_CAP") {
            self.retrieval.context_cap = n;
        }
        if let Ok(v) = std::env::var("APPLIQUE_RETRIEVAL_FALLBACK_COLLECTION") {
            self.retrieval.fallback_collection = v;
        }
        if let Some(b) = parsed::<bool>("APPLIQUE_RETRIEVAL_CONCURRENT") {
            self.retrieval.concurrent = b;
        }
        if let Ok(v) = std::env::var("APPLIQUE_COMPONENTS_PATH") {
            self.components.path = v;
        }
        if let Some(n) = parsed::<usize>("APPLIQUE_INGEST_CHUNK_SIZE") {
            self.ingest.chunk_size = n;
        }
        if let Some(n) = parsed::<usize>("APPLIQUE_INGEST_CHUNK_OVERLAP") {
            self.ingest.chunk_overlap = n;
        }
    }

    fn apply_env_overrides_service(&mut self) {
        if let Some(secs) = parsed::<u64>("APPLIQUE_TIMEOUT_LLM") {
            self.timeouts.llm_request_timeout_secs = secs;
        }
        if let Some(secs) = parsed::<u64>("APPLIQUE_TIMEOUT_EMBEDDING") {
            self.timeouts.embedding_request_timeout_secs = secs;
        }
        if let Some(secs) = parsed::<u64>("APPLIQUE_TIMEOUT_STORE") {
            self.timeouts.store_request_timeout_secs = secs;
        }
        if let Ok(v) = std::env::var("APPLIQUE_GATEWAY_BIND") {
            self.gateway.bind = v;
        }
        if let Some(port) = parsed::<u16>("APPLIQUE_GATEWAY_PORT") {
            self.gateway.port = port;
        }
        if let Some(rate) = parsed::<u32>("APPLIQUE_GATEWAY_RATE_LIMIT") {
            self.gateway.rate_limit = rate;
        }
        if let Some(size) = parsed::<usize>("APPLIQUE_GATEWAY_MAX_BODY_SIZE") {
            self.gateway.max_body_size = size;
        }
        if let Ok(v) = std::env::var("APPLIQUE_OBSERVABILITY_EXPORTER") {
            self.observability.exporter = v;
        }
        if let Ok(v) = std::env::var("APPLIQUE_OBSERVABILITY_ENDPOINT") {
            self.observability.endpoint = v;
        }
    }
}
