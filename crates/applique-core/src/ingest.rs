//! Ingestion write-path: scraped pages to per-component collections.
//!
//! Page fetching happens elsewhere; this module consumes the JSON Lines the
//! crawler writes, one [`ScrapedPage`] per line.

use std::fmt::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use applique_llm::LlmProvider;
use applique_store::document::point_id;
use applique_store::{Document, DocumentMetadata, TextSplitter, VectorPoint, VectorStore};
use serde::{Deserialize, Serialize};

use crate::collection::CollectionName;
use crate::components::KnownComponents;
use crate::error::{RagError, timed};

/// Path segment following `/components/`, e.g. `date-picker` for
/// `https://host/components/date-picker/usage`.
#[must_use]
pub fn extract_component_name(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let mut segments = parsed.path_segments()?;
    segments.find(|s| *s == "components")?;
    segments
        .next()
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapedPage {
    pub url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub code_blocks: Vec<String>,
    #[serde(default)]
    pub api_sections: Vec<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scraped_at: Option<String>,
}

impl ScrapedPage {
    #[must_use]
    pub fn component_name(&self) -> Option<String> {
        extract_component_name(&self.url)
    }

    /// Sectioned document text plus metadata flags. `None` when the URL has no component.
    #[must_use]
    pub fn render(&self, max_description_chars: usize) -> Option<Document> {
        let component = self.component_name()?;
        let description: String = self.description.chars().take(max_description_chars).collect();

        let mut text = String::new();
        let _ = writeln!(text, "Component: {component}");
        let _ = writeln!(text, "URL: {}", self.url);
        let _ = write!(text, "\nDESCRIPTION:\n{description}\n");
        let _ = write!(text, "\nCODE EXAMPLES:\n{}\n", self.code_blocks.join(" "));
        let _ = write!(text, "\nAPI PROPS:\n{}\n", self.api_sections.join(" "));
        let _ = write!(text, "\nIMAGES:\n{}\n", self.image_urls.join(", "));

        let mut extra = serde_json::Map::new();
        extra.insert("has_code_examples".into(), (!self.code_blocks.is_empty()).into());
        extra.insert("has_api_props".into(), (!self.api_sections.is_empty()).into());
        extra.insert("has_images".into(), (!self.image_urls.is_empty()).into());
        if let Some(at) = &self.scraped_at {
            extra.insert("scraped_at".into(), at.clone().into());
        }

        Some(Document::new(
            text,
            DocumentMetadata {
                component_name: component,
                url: self.url.clone(),
                extra,
            },
        ))
    }
}

/// Parse JSON Lines, skipping blank lines.
///
/// # Errors
///
/// Returns [`RagError::Json`] on the first malformed line.
pub fn parse_pages(text: &str) -> Result<Vec<ScrapedPage>, RagError> {
    text.lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).map_err(RagError::from))
        .collect()
}

/// # Errors
///
/// Returns an error if the file cannot be read or a line is malformed.
pub async fn load_pages(path: &Path) -> Result<Vec<ScrapedPage>, RagError> {
    let text = tokio::fs::read_to_string(path).await?;
    parse_pages(&text)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentReport {
    pub component: String,
    pub collection: CollectionName,
    pub chunks: usize,
}

#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    pub ingested: Vec<ComponentReport>,
    /// Component name and the reason it was skipped.
    pub failed: Vec<(String, String)>,
    /// Pages whose URL has no component segment.
    pub skipped_pages: usize,
}

impl IngestReport {
    /// Successfully ingested components, in first-seen order.
    #[must_use]
    pub fn known_components(&self) -> KnownComponents {
        KnownComponents::new(self.ingested.iter().map(|r| r.component.as_str()))
    }

    #[must_use]
    pub fn total_chunks(&self) -> usize {
        self.ingested.iter().map(|r| r.chunks).sum()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct IngestSettings {
    pub max_description_chars: usize,
    pub embedding_timeout: Duration,
    pub store_timeout: Duration,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            max_description_chars: 2000,
            embedding_timeout: Duration::from_secs(30),
            store_timeout: Duration::from_secs(10),
        }
    }
}

pub struct ComponentIngestor<P> {
    provider: Arc<P>,
    store: Arc<dyn VectorStore>,
    splitter: TextSplitter,
    settings: IngestSettings,
}

impl<P: LlmProvider> ComponentIngestor<P> {
    #[must_use]
    pub fn new(
        provider: Arc<P>,
        store: Arc<dyn VectorStore>,
        splitter: TextSplitter,
        settings: IngestSettings,
    ) -> Self {
        Self {
            provider,
            store,
            splitter,
            settings,
        }
    }

    /// Group pages by component and rebuild one collection per component.
    /// A component that fails is logged and left out of the report's known list.
    pub async fn ingest(&self, pages: Vec<ScrapedPage>) -> IngestReport {
        let mut report = IngestReport::default();
        let mut groups: Vec<(String, Vec<Document>)> = Vec::new();

        for page in &pages {
            let Some(doc) = page.render(self.settings.max_description_chars) else {
                tracing::debug!(url = %page.url, "page has no component segment, skipping");
                report.skipped_pages += 1;
                continue;
            };
            let component = doc.metadata.component_name.clone();
            match groups.iter_mut().find(|(name, _)| *name == component) {
                Some((_, docs)) => docs.push(doc),
                None => groups.push((component, vec![doc])),
            }
        }

        tracing::info!(components = groups.len(), pages = pages.len(), "ingesting components");

        for (component, docs) in groups {
            let collection = CollectionName::for_component(&component);
            match self.ingest_component(&collection, &docs).await {
                Ok(chunks) => {
                    tracing::info!(collection = %collection, chunks, "component ingested");
                    report.ingested.push(ComponentReport {
                        component,
                        collection,
                        chunks,
                    });
                }
                Err(e) => {
                    tracing::warn!(collection = %collection, error = %e, "component ingestion failed");
                    report.failed.push((component, e.to_string()));
                }
            }
        }
        report
    }

    async fn ingest_component(
        &self,
        collection: &CollectionName,
        docs: &[Document],
    ) -> Result<usize, RagError> {
        let mut chunks: Vec<Document> = Vec::new();
        for doc in docs {
            for text in self.splitter.split(&doc.page_content) {
                let mut metadata = doc.metadata.clone();
                metadata.extra.insert("chunk_index".into(), chunks.len().into());
                chunks.push(Document::new(text, metadata));
            }
        }
        if chunks.is_empty() {
            return Err(RagError::configuration("no content to index"));
        }

        let mut points = Vec::with_capacity(chunks.len());
        for (idx, chunk) in chunks.iter().enumerate() {
            let vector = timed(
                "chunk embedding",
                self.settings.embedding_timeout,
                self.provider.embed(&chunk.page_content),
            )
            .await?;
            points.push(VectorPoint {
                id: point_id(collection.as_str(), &chunk.metadata.url, idx),
                vector,
                payload: chunk.to_payload()?,
            });
        }

        let vector_size = u64::try_from(points.first().map_or(0, |p| p.vector.len())).unwrap_or(0);
        timed(
            "collection recreate",
            self.settings.store_timeout,
            self.store.recreate_collection(collection.as_str(), vector_size),
        )
        .await?;

        let count = points.len();
        timed(
            "collection upsert",
            self.settings.store_timeout,
            self.store.upsert(collection.as_str(), points),
        )
        .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use applique_llm::mock::MockProvider;
    use applique_store::{InMemoryVectorStore, ScoredDocument, SplitterConfig};

    use super::*;

    fn page(url: &str, description: &str) -> ScrapedPage {
        ScrapedPage {
            url: url.into(),
            description: description.into(),
            ..ScrapedPage::default()
        }
    }

    fn ingestor(provider: MockProvider, store: Arc<dyn VectorStore>) -> ComponentIngestor<MockProvider> {
        ComponentIngestor::new(
            Arc::new(provider),
            store,
            TextSplitter::new(SplitterConfig {
                chunk_size: 200,
                chunk_overlap: 20,
                ..SplitterConfig::default()
            }),
            IngestSettings::default(),
        )
    }

    #[test]
    fn extract_component_from_url() {
        assert_eq!(
            extract_component_name("https://applique.myntra.com/components/date-picker").as_deref(),
            Some("date-picker")
        );
        assert_eq!(
            extract_component_name("https://applique.myntra.com/components/button/usage?tab=1").as_deref(),
            Some("button")
        );
        assert_eq!(extract_component_name("https://applique.myntra.com/foundations/color"), None);
        assert_eq!(extract_component_name("https://applique.myntra.com/components/"), None);
        assert_eq!(extract_component_name("not a url"), None);
    }

    #[test]
    fn render_builds_sections_and_flags() {
        let p = ScrapedPage {
            url: "https://x.test/components/modal".into(),
            description: "A dialog overlay.".into(),
            code_blocks: vec!["<Modal />".into(), "<Modal open />".into()],
            api_sections: vec![],
            image_urls: vec!["https://x.test/a.png".into(), "https://x.test/b.png".into()],
            scraped_at: Some("2026-01-01T00:00:00Z".into()),
        };
        let doc = p.render(2000).unwrap();
        assert!(doc.page_content.starts_with("Component: modal\nURL: https://x.test/components/modal\n"));
        assert!(doc.page_content.contains("DESCRIPTION:\nA dialog overlay.\n"));
        assert!(doc.page_content.contains("CODE EXAMPLES:\n<Modal /> <Modal open />\n"));
        assert!(doc.page_content.contains("IMAGES:\nhttps://x.test/a.png, https://x.test/b.png\n"));
        assert_eq!(doc.metadata.component_name, "modal");
        assert_eq!(doc.metadata.extra["has_code_examples"], serde_json::json!(true));
        assert_eq!(doc.metadata.extra["has_api_props"], serde_json::json!(false));
        assert_eq!(doc.metadata.extra["scraped_at"], serde_json::json!("2026-01-01T00:00:00Z"));
    }

    #[test]
    fn render_truncates_description_by_chars() {
        let doc = page("https://x.test/components/tag", "ééééé").render(3).unwrap();
        assert!(doc.page_content.contains("DESCRIPTION:\nééé\n"));
    }

    #[test]
    fn render_without_component_is_none() {
        assert!(page("https://x.test/about", "x").render(100).is_none());
    }

    #[test]
    fn parse_pages_skips_blank_lines() {
        let text = "{\"url\":\"https://x.test/components/a\"}\n\n{\"url\":\"https://x.test/components/b\",\"code_blocks\":[\"x\"]}\n";
        let pages = parse_pages(text).unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1].code_blocks, ["x"]);
    }

    #[test]
    fn parse_pages_rejects_malformed_line() {
        assert!(matches!(parse_pages("{not json}"), Err(RagError::Json(_))));
    }

    #[tokio::test]
    async fn load_pages_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pages.jsonl");
        std::fs::write(&path, "{\"url\":\"https://x.test/components/a\"}\n").unwrap();
        assert_eq!(load_pages(&path).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn ingests_one_collection_per_component() {
        let store = Arc::new(InMemoryVectorStore::new());
        let ing = ingestor(MockProvider::default(), store.clone());
        let report = ing
            .ingest(vec![
                page("https://x.test/components/button", "Buttons trigger actions."),
                page("https://x.test/about", "not a component"),
                page("https://x.test/components/Date-Picker", "Pick a date."),
                page("https://x.test/components/button/usage", "More on buttons."),
            ])
            .await;

        assert_eq!(report.skipped_pages, 1);
        assert!(report.failed.is_empty());
        assert_eq!(report.known_components().names(), ["button", "Date-Picker"]);
        assert_eq!(
            store.collection_names().unwrap(),
            ["applique_button", "applique_date_picker"]
        );
        assert_eq!(store.point_count("applique_button").unwrap(), Some(2));
        assert_eq!(report.total_chunks(), 3);
    }

    #[tokio::test]
    async fn stored_payload_decodes_as_document() {
        let store = Arc::new(InMemoryVectorStore::new());
        let ing = ingestor(MockProvider::default(), store.clone());
        ing.ingest(vec![page("https://x.test/components/tabs", "Tabs switch views.")])
            .await;

        let hits = store
            .search("applique_tabs", vec![0.1, 0.2, 0.3, 0.4], 2)
            .await
            .unwrap();
        let doc = ScoredDocument::from_scored_point(hits[0].clone()).unwrap().document;
        assert!(doc.page_content.contains("Tabs switch views."));
        assert_eq!(doc.metadata.component_name, "tabs");
        assert_eq!(doc.metadata.extra["chunk_index"], serde_json::json!(0));
    }

    #[tokio::test]
    async fn reingest_replaces_previous_points() {
        let store = Arc::new(InMemoryVectorStore::new());
        let ing = ingestor(MockProvider::default(), store.clone());
        let pages = vec![
            page("https://x.test/components/tag", "one"),
            page("https://x.test/components/tag/usage", "two"),
        ];
        ing.ingest(pages).await;
        ing.ingest(vec![page("https://x.test/components/tag", "one")]).await;
        assert_eq!(store.point_count("applique_tag").unwrap(), Some(1));
    }

    #[tokio::test]
    async fn embedding_failure_skips_component() {
        let store = Arc::new(InMemoryVectorStore::new());
        let ing = ingestor(MockProvider::default().with_failing_embed(), store.clone());
        let report = ing
            .ingest(vec![page("https://x.test/components/chip", "Chips.")])
            .await;
        assert!(report.ingested.is_empty());
        assert_eq!(report.failed[0].0, "chip");
        assert!(report.known_components().is_empty());
        assert_eq!(store.point_count("applique_chip").unwrap(), None);
    }

    #[tokio::test]
    async fn long_description_yields_several_chunks() {
        let store = Arc::new(InMemoryVectorStore::new());
        let ing = ingestor(MockProvider::default(), store.clone());
        let long = "word ".repeat(200);
        let report = ing
            .ingest(vec![page("https://x.test/components/table", &long)])
            .await;
        assert!(report.total_chunks() > 1);
        assert_eq!(
            store.point_count("applique_table").unwrap(),
            Some(report.total_chunks())
        );
    }
}
