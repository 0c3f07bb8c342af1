//! Application bootstrap: config resolution and provider/store/pipeline construction.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use applique_llm::any::AnyProvider;
use applique_llm::openai::OpenAiProvider;
use applique_store::{QdrantOps, SplitterConfig, TextSplitter, VectorStore};

use crate::config::Config;
use crate::error::RagError;
use crate::ingest::{ComponentIngestor, IngestSettings};
use crate::pipeline::{PipelineSettings, QueryPipeline};
use crate::vault::{EnvVaultProvider, VaultProvider};

pub struct AppBuilder {
    config: Config,
    config_path: PathBuf,
}

impl AppBuilder {
    /// Resolve the config path, load it and resolve secrets from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be parsed.
    pub async fn from_env(cli_path: Option<&Path>) -> anyhow::Result<Self> {
        Self::with_vault(cli_path, &EnvVaultProvider).await
    }

    /// # Errors
    ///
    /// Returns an error if the config file cannot be parsed or the vault fails.
    pub async fn with_vault(
        cli_path: Option<&Path>,
        vault: &dyn VaultProvider,
    ) -> anyhow::Result<Self> {
        let config_path = resolve_config_path(cli_path);
        let mut config = Config::load(&config_path)
            .with_context(|| format!("loading config from {}", config_path.display()))?;
        config.resolve_secrets(vault).await?;
        Ok(Self {
            config,
            config_path,
        })
    }

    #[must_use]
    pub fn from_config(config: Config) -> Self {
        Self {
            config,
            config_path: PathBuf::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    #[must_use]
    pub fn components_path(&self) -> PathBuf {
        PathBuf::from(&self.config.components.path)
    }

    /// # Errors
    ///
    /// Returns [`RagError::Configuration`] if the config does not validate.
    pub fn build_provider(&self) -> Result<AnyProvider, RagError> {
        create_provider(&self.config)
    }

    /// # Errors
    ///
    /// Returns an error if the Qdrant client cannot be created.
    pub fn build_store(&self) -> anyhow::Result<Arc<dyn VectorStore>> {
        let ops = QdrantOps::new(&self.config.store.qdrant_url)
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("connecting to Qdrant at {}", self.config.store.qdrant_url))?;
        Ok(Arc::new(ops))
    }

    /// # Errors
    ///
    /// Returns an error if validation, provider or store construction fails.
    pub fn build_pipeline(&self) -> anyhow::Result<QueryPipeline<AnyProvider>> {
        let provider = Arc::new(self.build_provider()?);
        let store = self.build_store()?;
        Ok(QueryPipeline::new(
            provider,
            store,
            PipelineSettings::from_config(&self.config),
        ))
    }

    /// # Errors
    ///
    /// Returns an error if validation, provider or store construction fails.
    pub fn build_ingestor(&self) -> anyhow::Result<ComponentIngestor<AnyProvider>> {
        let provider = Arc::new(self.build_provider()?);
        let store = self.build_store()?;
        let ingest = &self.config.ingest;
        let splitter = TextSplitter::new(SplitterConfig {
            chunk_size: ingest.chunk_size,
            chunk_overlap: ingest.chunk_overlap,
            ..SplitterConfig::default()
        });
        Ok(ComponentIngestor::new(
            provider,
            store,
            splitter,
            IngestSettings {
                max_description_chars: ingest.max_description_chars,
                embedding_timeout: self.config.timeouts.embedding(),
                store_timeout: self.config.timeouts.store(),
            },
        ))
    }
}

/// Priority: `--config` > `APPLIQUE_CONFIG` > `config/default.toml`.
#[must_use]
pub fn resolve_config_path(cli_path: Option<&Path>) -> PathBuf {
    if let Some(path) = cli_path {
        return path.to_path_buf();
    }
    if let Ok(path) = std::env::var("APPLIQUE_CONFIG") {
        return PathBuf::from(path);
    }
    PathBuf::from("config/default.toml")
}

/// Build the OpenAI-compatible provider after validating the config.
///
/// # Errors
///
/// Returns [`RagError::Configuration`] when validation fails.
pub fn create_provider(config: &Config) -> Result<AnyProvider, RagError> {
    config.validate()?;
    let api_key = config
        .secrets
        .openai_api_key
        .as_ref()
        .ok_or_else(|| RagError::configuration("OpenAI API key not resolved"))?;

    let client = applique_llm::http::client_with_timeout(config.timeouts.llm());
    let provider = OpenAiProvider::new(
        api_key.expose().to_owned(),
        config.llm.base_url.clone(),
        config.llm.model.clone(),
        Some(config.llm.embedding_model.clone()),
    )
    .with_client(client)
    .with_max_tokens(config.llm.max_tokens)
    .with_max_retries(config.llm.max_retries);

    tracing::debug!(model = provider.model(), base_url = %config.llm.base_url, "created OpenAI provider");
    Ok(AnyProvider::OpenAi(provider))
}
