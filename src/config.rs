//! Collector configuration
//!
//! Supplied by the embedding host; every field has a default so a partial
//! JSON document is enough.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "ws://localhost:4000";
pub const DEFAULT_PAGE_POLL_INTERVAL_MS: u64 = 50;
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 10_000;

#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CollectorConfig {
    /// Sent as a bearer token during the connection handshake
    pub auth_key: String,
    pub user_id: String,
    pub endpoint: String,
    pub page_poll_interval_ms: u64,
    pub connect_timeout_ms: u64,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            auth_key: String::new(),
            user_id: String::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            page_poll_interval_ms: DEFAULT_PAGE_POLL_INTERVAL_MS,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
        }
    }
}

impl std::fmt::Debug for CollectorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectorConfig")
            .field("auth_key", &"<redacted>")
            .field("user_id", &self.user_id)
            .field("endpoint", &self.endpoint)
            .field("page_poll_interval_ms", &self.page_poll_interval_ms)
            .field("connect_timeout_ms", &self.connect_timeout_ms)
            .finish()
    }
}

impl CollectorConfig {
    pub fn new(auth_key: &str, user_id: &str) -> Self {
        Self {
            auth_key: auth_key.to_string(),
            user_id: user_id.to_string(),
            ..Default::default()
        }
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }

    /// Load and validate configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content).context("Failed to parse collector config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.endpoint.starts_with("ws://") || self.endpoint.starts_with("wss://")) {
            bail!("Collector endpoint must be a ws:// or wss:// URL, got {:?}", self.endpoint);
        }
        if self.page_poll_interval_ms == 0 {
            bail!("pagePollIntervalMs must be greater than zero");
        }
        Ok(())
    }

    pub fn page_poll_interval(&self) -> Duration {
        Duration::from_millis(self.page_poll_interval_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = CollectorConfig::from_json_str(r#"{"authKey":"k1","userId":"u1"}"#).unwrap();
        assert_eq!(config.auth_key, "k1");
        assert_eq!(config.user_id, "u1");
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.page_poll_interval(), Duration::from_millis(50));
    }

    #[test]
    fn test_rejects_http_endpoint() {
        let err = CollectorConfig::from_json_str(r#"{"endpoint":"http://localhost:4000"}"#).unwrap_err();
        assert!(err.to_string().contains("ws://"));
    }

    #[test]
    fn test_rejects_zero_poll_interval() {
        let config = CollectorConfig {
            page_poll_interval_ms: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_credential() {
        let config = CollectorConfig::new("super-secret", "u1");
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("u1"));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"userId":"from-file","endpoint":"wss://collect.example"}}"#).unwrap();

        let config = CollectorConfig::from_file(file.path()).unwrap();
        assert_eq!(config.user_id, "from-file");
        assert_eq!(config.endpoint, "wss://collect.example");

        assert!(CollectorConfig::from_file("/nonexistent/clicktrail.json").is_err());
    }
}
