mod env;
mod types;


pub use types::*;

use std::path::Path;
use std::time::Duration;

use anyhow::Context;

use crate::error::RagError;
use crate::vault::{Secret, VaultProvider};

/// Vault keys consulted for the OpenAI API key, in priority order.
pub const OPENAI_KEY_VARS: [&str; 2] = ["APPLIQUE_OPENAI_API_KEY", "OPENAI_API_KEY"];

impl Config {
    /// Load configuration from a TOML file with env var overrides.
    ///
    /// Falls back to defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str::<Self>(&content).context("failed to parse config file")?
        } else {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Resolve sensitive configuration values through the vault.
    ///
    /// # Errors
    ///
    /// Returns an error if the vault backend fails.
    pub async fn resolve_secrets(&mut self, vault: &dyn VaultProvider) -> anyhow::Result<()> {
        if let Some(val) = vault.get_first_secret(&OPENAI_KEY_VARS).await? {
            self.secrets.openai_api_key = Some(Secret::new(val));
        }
        if let Some(val) = vault.get_secret("APPLIQUE_GATEWAY_TOKEN").await? {
            self.gateway.auth_token = Some(val);
        }
        Ok(())
    }

    /// Reject settings the query and ingest paths cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Configuration`] describing the first problem found.
    pub fn validate(&self) -> Result<(), RagError> {
        if self.secrets.openai_api_key.is_none() {
            return Err(RagError::configuration(
                "OpenAI API key not found: set APPLIQUE_OPENAI_API_KEY or OPENAI_API_KEY",
            ));
        }
        if self.llm.base_url.trim().is_empty() || self.llm.model.trim().is_empty() {
            return Err(RagError::configuration("llm.base_url and llm.model must be set"));
        }
        if self.retrieval.per_collection_limit == 0 {
            return Err(RagError::configuration(
                "retrieval.per_collection_limit must be greater than zero",
            ));
        }
        if self.retrieval.context_cap == 0 {
            return Err(RagError::configuration(
                "retrieval.context_cap must be greater than zero",
            ));
        }
        if self.retrieval.fallback_collection.trim().is_empty() {
            return Err(RagError::configuration(
                "retrieval.fallback_collection must not be empty",
            ));
        }
        if self.ingest.chunk_size == 0 {
            return Err(RagError::configuration("ingest.chunk_size must be greater than zero"));
        }
        if self.ingest.chunk_overlap >= self.ingest.chunk_size {
            return Err(RagError::configuration(format!(
                "ingest.chunk_overlap ({}) must be smaller than ingest.chunk_size ({})",
                self.ingest.chunk_overlap, self.ingest.chunk_size
            )));
        }
        let t = &self.timeouts;
        if t.llm_request_timeout_secs == 0
            || t.embedding_request_timeout_secs == 0
            || t.store_request_timeout_secs == 0
        {
            return Err(RagError::configuration("timeouts must be greater than zero"));
        }
        Ok(())
    }
}

impl TimeoutConfig {
    #[must_use]
    pub fn llm(&self) -> Duration {
        Duration::from_secs(self.llm_request_timeout_secs)
    }

    #[must_use]
    pub fn embedding(&self) -> Duration {
        Duration::from_secs(self.embedding_request_timeout_secs)
    }

    #[must_use]
    pub fn store(&self) -> Duration {
        Duration::from_secs(self.store_request_timeout_secs)
    }
}
