//! The known-components file: one component name per line, written by ingestion.

use std::path::Path;

use crate::collection::CollectionName;
use crate::error::RagError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnownComponents {
    names: Vec<String>,
}

impl KnownComponents {
    /// Trims each name, drops blanks and keeps the first occurrence of duplicates.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out: Vec<String> = Vec::new();
        for name in names {
            let name = name.as_ref().trim();
            if !name.is_empty() && !out.iter().any(|n| n == name) {
                out.push(name.to_owned());
            }
        }
        Self { names: out }
    }

    #[must_use]
    pub fn parse(text: &str) -> Self {
        Self::new(text.lines())
    }

    /// # Errors
    ///
    /// A missing file is [`RagError::Configuration`]; other read failures are [`RagError::Io`].
    pub async fn load(path: &Path) -> Result<Self, RagError> {
        match tokio::fs::read_to_string(path).await {
            Ok(text) => {
                let known = Self::parse(&text);
                tracing::debug!(path = %path.display(), count = known.len(), "loaded known components");
                Ok(known)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(RagError::configuration(
                format!(
                    "known components file {} not found; run ingestion first",
                    path.display()
                ),
            )),
            Err(e) => Err(e.into()),
        }
    }

    /// # Errors
    ///
    /// Returns [`RagError::Io`] if the file or its parent directory cannot be written.
    pub async fn save(&self, path: &Path) -> Result<(), RagError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, self.names.join("\n")).await?;
        tracing::info!(path = %path.display(), count = self.len(), "saved known components");
        Ok(())
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    #[must_use]
    pub fn collections(&self) -> Vec<CollectionName> {
        self.iter().map(CollectionName::for_component).collect()
    }
}
