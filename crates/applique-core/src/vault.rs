use std::fmt;
use std::future::Future;
use std::pin::Pin;

use serde::Deserialize;

/// Wrapper for sensitive strings with redacted Debug/Display.
#[derive(Clone, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

pub type SecretFuture<'a> = Pin<Box<dyn Future<Output = anyhow::Result<Option<String>>> + Send + 'a>>;

/// Pluggable secret retrieval backend.
pub trait VaultProvider: Send + Sync {
    fn get_secret(&self, key: &str) -> SecretFuture<'_>;

    /// First non-blank value among `keys`, in order.
    fn get_first_secret<'a>(&'a self, keys: &'a [&'a str]) -> SecretFuture<'a> {
        Box::pin(async move {
            for key in keys {
                if let Some(val) = self.get_secret(key).await?
                    && !val.trim().is_empty()
                {
                    return Ok(Some(val));
                }
            }
            Ok(None)
        })
    }
}

/// Reads secrets from process environment variables.
pub struct EnvVaultProvider;

impl VaultProvider for EnvVaultProvider {
    fn get_secret(&self, key: &str) -> SecretFuture<'_> {
        let key = key.to_owned();
        Box::pin(async move { Ok(std::env::var(&key).ok()) })
    }
}

/// Test helper with HashMap-based secret storage.
#[cfg(test)]
#[derive(Default)]
pub struct MockVaultProvider {
    secrets: std::collections::HashMap<String, String>,
}

#[cfg(test)]
impl MockVaultProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_secret(mut self, key: &str, value: &str) -> Self {
        self.secrets.insert(key.to_owned(), value.to_owned());
        self
    }
}

#[cfg(test)]
impl VaultProvider for MockVaultProvider {
    fn get_secret(&self, key: &str) -> SecretFuture<'_> {
        let result = self.secrets.get(key).cloned();
        Box::pin(async move { Ok(result) })
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    fn secret_expose_returns_inner() {
        let secret = Secret::new("sk-test");
        assert_eq!(secret.expose(), "sk-test");
    }

    #[test]
    fn secret_debug_and_display_are_redacted() {
        let secret = Secret::new("sk-test");
        assert_eq!(format!("{secret:?}"), "[REDACTED]");
        assert_eq!(format!("{secret}"), "[REDACTED]");
    }

    #[test]
    fn secret_deserialize() {
        let secret: Secret = serde_json::from_str("\"sk-from-json\"").unwrap();
        assert_eq!(secret.expose(), "sk-from-json");
    }

    #[tokio::test]
    #[serial]
    async fn env_vault_reads_set_var() {
        let key = "APPLIQUE_TEST_VAULT_SECRET_SET";
        unsafe { std::env::set_var(key, "value") };
        let result = EnvVaultProvider.get_secret(key).await.unwrap();
        unsafe { std::env::remove_var(key) };
        assert_eq!(result.as_deref(), Some("value"));
    }

    #[tokio::test]
    #[serial]
    async fn env_vault_none_for_unset() {
        let result = EnvVaultProvider
            .get_secret("APPLIQUE_TEST_VAULT_SECRET_UNSET_XYZ")
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn first_secret_prefers_earlier_key() {
        let vault = MockVaultProvider::new()
            .with_secret("PRIMARY", "one")
            .with_secret("SECONDARY", "two");
        let got = vault.get_first_secret(&["PRIMARY", "SECONDARY"]).await.unwrap();
        assert_eq!(got.as_deref(), Some("one"));
    }

    #[tokio::test]
    async fn first_secret_skips_blank_values() {
        let vault = MockVaultProvider::new()
            .with_secret("PRIMARY", "  ")
            .with_secret("SECONDARY", "two");
        let got = vault.get_first_secret(&["PRIMARY", "SECONDARY"]).await.unwrap();
        assert_eq!(got.as_deref(), Some("two"));
    }

    #[tokio::test]
    async fn first_secret_none_when_all_missing() {
        let vault = MockVaultProvider::new();
        assert!(vault.get_first_secret(&["A", "B"]).await.unwrap().is_none());
    }
}
