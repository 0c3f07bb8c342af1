//! Component name to vector collection name mapping.
//!
//! The same function is used when ingestion creates a collection and when a
//! query looks one up, so the two sides always agree.

use std::fmt;

use serde::{Deserialize, Serialize};

pub const COLLECTION_PREFIX: &str = "applique_";

/// Collection searched when routing cannot produce a decision.
pub const FALLBACK_COLLECTION: &str = "applique_components";

/// Lower-case and replace `-` with `_`.
#[must_use]
pub fn normalize_component_name(name: &str) -> String {
    name.to_lowercase().replace('-', "_")
}

/// Name of a per-component vector collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollectionName(String);

impl CollectionName {
    #[must_use]
    pub fn for_component(component: &str) -> Self {
        Self(format!("{COLLECTION_PREFIX}{}", normalize_component_name(component)))
    }

    /// Wrap an already-formed collection name (e.g. the configured fallback).
    pub fn from_raw(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Normalized component part, if the name carries the standard prefix.
    #[must_use]
    pub fn component(&self) -> Option<&str> {
        self.0.strip_prefix(COLLECTION_PREFIX)
    }
}

impl fmt::Display for CollectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CollectionName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<CollectionName> for String {
    fn from(name: CollectionName) -> Self {
        name.0
    }
}

#[must_use]
pub fn collection_name_for(component: &str) -> CollectionName {
    CollectionName::for_component(component)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn prefixes_and_normalizes() {
        assert_eq!(collection_name_for("button").as_str(), "applique_button");
        assert_eq!(collection_name_for("Date-Picker").as_str(), "applique_date_picker");
        assert_eq!(
            collection_name_for("toggle-button-group").as_str(),
            "applique_toggle_button_group"
        );
    }

    #[test]
    fn fallback_matches_components_page() {
        assert_eq!(collection_name_for("components").as_str(), FALLBACK_COLLECTION);
    }

    #[test]
    fn component_strips_prefix() {
        assert_eq!(collection_name_for("modal").component(), Some("modal"));
        assert_eq!(CollectionName::from_raw("other").component(), None);
    }

    #[test]
    fn display_and_serde_are_plain_strings() {
        let name = collection_name_for("icon");
        assert_eq!(name.to_string(), "applique_icon");
        assert_eq!(serde_json::to_string(&name).unwrap(), "\"applique_icon\"");
    }

    proptest! {
        #[test]
        fn deterministic(name in "[a-zA-Z0-9-]{0,24}") {
            prop_assert_eq!(collection_name_for(&name), collection_name_for(&name));
        }

        #[test]
        fn injective_over_kebab_names(a in "[a-z0-9-]{1,16}", b in "[a-z0-9-]{1,16}") {
            prop_assume!(a != b);
            prop_assert_ne!(collection_name_for(&a), collection_name_for(&b));
        }

        #[test]
        fn normalization_is_idempotent(name in "[a-zA-Z0-9_-]{0,24}") {
            let once = normalize_component_name(&name);
            prop_assert_eq!(normalize_component_name(&once), once);
        }
    }
}
