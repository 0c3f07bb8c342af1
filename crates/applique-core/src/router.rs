//! Model-driven selection of the collections a query should be searched in.

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use applique_llm::{ChatParams, LlmProvider, Message};
use regex::Regex;

use crate::collection::{CollectionName, normalize_component_name};
use crate::components::KnownComponents;
use crate::error::timed;
use crate::prompt::{RoutingExample, RoutingPromptConfig, build_routing_prompt, default_routing_examples};

static LABEL_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:response|components?)\s*:\s*").expect("routing label regex is valid")
});

/// How a [`RoutingDecision`] was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutingSource {
    Model,
    Fallback,
    NoComponents,
}

/// Ordered, de-duplicated collections to search. Names are not checked against
/// the known components, so a decision may point at collections that do not exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingDecision {
    collections: Vec<CollectionName>,
    source: RoutingSource,
}

impl RoutingDecision {
    #[must_use]
    pub fn from_model(collections: Vec<CollectionName>) -> Self {
        Self {
            collections,
            source: RoutingSource::Model,
        }
    }

    #[must_use]
    pub fn fallback(collection: CollectionName) -> Self {
        Self {
            collections: vec![collection],
            source: RoutingSource::Fallback,
        }
    }

    #[must_use]
    pub fn no_components() -> Self {
        Self {
            collections: Vec::new(),
            source: RoutingSource::NoComponents,
        }
    }

    #[must_use]
    pub fn collections(&self) -> &[CollectionName] {
        &self.collections
    }

    #[must_use]
    pub fn source(&self) -> RoutingSource {
        self.source
    }

    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.source == RoutingSource::Fallback
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.collections.len()
    }
}

/// Parse a routing reply into collection names.
///
/// Grammar: an optional `Response:` / `Components:` label, then tokens
/// separated by commas. Each token is trimmed, stripped of surrounding quotes,
/// backticks and trailing periods, lower-cased and has `-` replaced by `_`.
/// Empty tokens are dropped and repeats keep their first position.
#[must_use]
pub fn parse_routing_response(raw: &str) -> Vec<CollectionName> {
    let body = LABEL_PREFIX.replace(raw.trim(), "");
    let mut out: Vec<CollectionName> = Vec::new();
    for token in body.split(',') {
        let token = token
            .trim()
            .trim_matches(|c| matches!(c, '"' | '\'' | '`'))
            .trim_end_matches('.')
            .trim();
        if token.is_empty() {
            continue;
        }
        let name = CollectionName::for_component(&normalize_component_name(token));
        if !out.contains(&name) {
            out.push(name);
        }
    }
    out
}

pub struct QueryRouter<P> {
    provider: Arc<P>,
    fallback: CollectionName,
    examples: Vec<RoutingExample>,
    timeout: Duration,
}

impl<P: LlmProvider> QueryRouter<P> {
    #[must_use]
    pub fn new(provider: Arc<P>, fallback: CollectionName, timeout: Duration) -> Self {
        Self {
            provider,
            fallback,
            examples: default_routing_examples(),
            timeout,
        }
    }

    #[must_use]
    pub fn with_examples(mut self, examples: Vec<RoutingExample>) -> Self {
        self.examples = examples;
        self
    }

    /// Pick the collections for `query`. Never fails: any provider error or
    /// timeout yields the single fallback collection.
    pub async fn route(&self, query: &str, known: &KnownComponents) -> RoutingDecision {
        if known.is_empty() {
            tracing::debug!("no known components, skipping routing");
            return RoutingDecision::no_components();
        }

        let prompt = build_routing_prompt(&RoutingPromptConfig {
            components: known.names(),
            examples: &self.examples,
            query,
        });
        let messages = [Message::system(prompt.system), Message::user(prompt.user)];

        let reply = timed(
            "routing",
            self.timeout,
            self.provider.chat(&messages, ChatParams::deterministic()),
        )
        .await;

        match reply {
            Ok(raw) => {
                let collections = parse_routing_response(&raw);
                tracing::info!(
                    provider = self.provider.name(),
                    collections = ?collections.iter().map(CollectionName::as_str).collect::<Vec<_>>(),
                    "query routed"
                );
                RoutingDecision::from_model(collections)
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    fallback = %self.fallback,
                    "routing failed, using fallback collection"
                );
                RoutingDecision::fallback(self.fallback.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use applique_llm::Role;
    use applique_llm::mock::MockProvider;
    use proptest::prelude::*;

    use super::*;
    use crate::collection::FALLBACK_COLLECTION;

    fn names(decision: &RoutingDecision) -> Vec<&str> {
        decision.collections().iter().map(CollectionName::as_str).collect()
    }

    fn router(provider: MockProvider) -> (QueryRouter<MockProvider>, MockProvider) {
        let handle = provider.clone();
        let router = QueryRouter::new(
            Arc::new(provider),
            CollectionName::from_raw(FALLBACK_COLLECTION),
            Duration::from_secs(5),
        );
        (router, handle)
    }

    fn known() -> KnownComponents {
        KnownComponents::new(["button", "icon", "modal", "date-picker"])
    }

    #[test]
    fn parse_simple_list() {
        let parsed = parse_routing_response("button, icon");
        let parsed: Vec<&str> = parsed.iter().map(CollectionName::as_str).collect();
        assert_eq!(parsed, ["applique_button", "applique_icon"]);
    }

    #[test]
    fn parse_normalizes_and_strips_noise() {
        let parsed = parse_routing_response("Response: \"Date-Picker, MODAL.\"");
        let parsed: Vec<&str> = parsed.iter().map(CollectionName::as_str).collect();
        assert_eq!(parsed, ["applique_date_picker", "applique_modal"]);
    }

    #[test]
    fn parse_drops_empty_tokens_and_duplicates() {
        let parsed = parse_routing_response(" , button,, button , ");
        let parsed: Vec<&str> = parsed.iter().map(CollectionName::as_str).collect();
        assert_eq!(parsed, ["applique_button"]);
    }

    #[test]
    fn parse_empty_reply() {
        assert!(parse_routing_response("").is_empty());
        assert!(parse_routing_response("  \n").is_empty());
    }

    #[tokio::test]
    async fn routes_with_model_reply() {
        let (router, mock) = router(MockProvider::with_responses(vec!["button, modal".into()]));
        let decision = router.route("button inside a modal", &known()).await;
        assert_eq!(names(&decision), ["applique_button", "applique_modal"]);
        assert_eq!(decision.source(), RoutingSource::Model);
        assert_eq!(mock.chat_count(), 1);
    }

    #[tokio::test]
    async fn routing_is_deterministic_and_lists_components() {
        let (router, mock) = router(MockProvider::with_responses(vec!["icon".into()]));
        router.route("icons?", &known()).await;
        let calls = mock.calls();
        assert_eq!(calls[0].params.temperature, Some(0.0));
        assert_eq!(calls[0].messages[0].role, Role::System);
        assert!(calls[0].messages[0].content.contains("button, icon, modal, date-picker"));
        assert_eq!(calls[0].messages[1].content, "Query: icons?");
    }

    #[tokio::test]
    async fn provider_failure_falls_back() {
        let (router, _) = router(MockProvider::failing());
        let decision = router.route("anything", &known()).await;
        assert!(decision.is_fallback());
        assert_eq!(names(&decision), ["applique_components"]);
    }

    #[tokio::test]
    async fn provider_timeout_falls_back() {
        let provider = MockProvider::with_responses(vec!["button".into()]).with_delay(500);
        let router = QueryRouter::new(
            Arc::new(provider),
            CollectionName::from_raw(FALLBACK_COLLECTION),
            Duration::from_millis(20),
        );
        let decision = router.route("anything", &known()).await;
        assert!(decision.is_fallback());
    }

    #[tokio::test]
    async fn hallucinated_names_pass_through() {
        let (router, _) = router(MockProvider::with_responses(vec!["carousel, button".into()]));
        let decision = router.route("carousel", &known()).await;
        assert_eq!(names(&decision), ["applique_carousel", "applique_button"]);
    }

    #[tokio::test]
    async fn no_cap_on_routed_collections() {
        let reply = (0..12).map(|i| format!("c{i}")).collect::<Vec<_>>().join(", ");
        let (router, _) = router(MockProvider::with_responses(vec![reply]));
        assert_eq!(router.route("q", &known()).await.len(), 12);
    }

    #[tokio::test]
    async fn empty_universe_skips_provider() {
        let (router, mock) = router(MockProvider::default());
        let decision = router.route("q", &KnownComponents::default()).await;
        assert!(decision.is_empty());
        assert_eq!(decision.source(), RoutingSource::NoComponents);
        assert_eq!(mock.chat_count(), 0);
    }

    #[tokio::test]
    async fn blank_reply_is_empty_model_decision() {
        let (router, _) = router(MockProvider::with_responses(vec!["   ".into()]));
        let decision = router.route("q", &known()).await;
        assert!(decision.is_empty());
        assert!(!decision.is_fallback());
    }

    proptest! {
        #[test]
        fn parsed_names_are_prefixed_and_unique(raw in "[a-zA-Z0-9 ,_-]{0,80}") {
            let parsed = parse_routing_response(&raw);
            for (i, name) in parsed.iter().enumerate() {
                prop_assert!(name.as_str().starts_with("applique_"));
                prop_assert!(!parsed[..i].contains(name));
            }
        }
    }
}
