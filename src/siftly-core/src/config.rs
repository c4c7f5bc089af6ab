use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable overriding the configured host
pub const HOST_ENV: &str = "SIFTLY_HOST";
/// Environment variable overriding the configured API key
pub const API_KEY_ENV: &str = "SIFTLY_API_KEY";

/// Connection settings for one search service.
///
/// Supplied once when the client is built and read-only afterwards.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
    /// Base URL, e.g. `http://localhost:7700`
    #[serde(default = "default_host")]
    pub host: String,

    /// Master or scoped key; sent as a bearer token and used to sign tenant tokens
    #[serde(default)]
    pub api_key: Option<String>,

    /// Per-request timeout enforced by the transport. `None` disables it.
    #[serde(default)]
    pub timeout_ms: Option<u64>,

    /// Defaults used when a task wait is started without explicit parameters
    #[serde(default)]
    pub wait: WaitConfig,
}

fn default_host() -> String {
    "http://localhost:7700".to_string()
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
pub struct WaitConfig {
    /// Overall deadline for one wait, in milliseconds
    #[serde(default = "default_wait_timeout_ms")]
    pub timeout_ms: u64,

    /// Delay between two status queries, in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub interval_ms: u64,
}

fn default_wait_timeout_ms() -> u64 {
    5_000
}

fn default_poll_interval_ms() -> u64 {
    50
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_wait_timeout_ms(),
            interval_ms: default_poll_interval_ms(),
        }
    }
}

impl WaitConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl ClientConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Default::default()
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    pub fn with_wait(mut self, wait: WaitConfig) -> Self {
        self.wait = wait;
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Load configuration from a JSON file
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: ClientConfig = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Defaults overlaid with `SIFTLY_HOST` and `SIFTLY_API_KEY`
    pub fn from_env() -> Self {
        Self::default().merge_env(|name| std::env::var(name).ok())
    }

    fn merge_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(host) = lookup(HOST_ENV).filter(|v| !v.is_empty()) {
            self.host = host;
        }
        if let Some(key) = lookup(API_KEY_ENV).filter(|v| !v.is_empty()) {
            self.api_key = Some(key);
        }
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            api_key: None,
            timeout_ms: None,
            wait: WaitConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_wait_policy() {
        let config = ClientConfig::default();
        assert_eq!(config.wait.timeout(), Duration::from_secs(5));
        assert_eq!(config.wait.interval(), Duration::from_millis(50));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"host": "http://search:7700", "wait": {"interval_ms": 10}}"#)
                .unwrap();
        assert_eq!(config.host, "http://search:7700");
        assert!(config.api_key.is_none());
        assert_eq!(config.wait.interval_ms, 10);
        assert_eq!(config.wait.timeout_ms, 5_000);
    }

    #[test]
    fn test_env_overrides_host_and_key() {
        let config = ClientConfig::new("http://localhost:7700").merge_env(|name| match name {
            HOST_ENV => Some("http://remote:7700".to_string()),
            API_KEY_ENV => Some("masterKey".to_string()),
            _ => None,
        });
        assert_eq!(config.host, "http://remote:7700");
        assert_eq!(config.api_key.as_deref(), Some("masterKey"));
    }

    #[test]
    fn test_empty_env_values_are_ignored() {
        let config = ClientConfig::new("http://localhost:7700")
            .with_api_key("masterKey")
            .merge_env(|_| Some(String::new()));
        assert_eq!(config.host, "http://localhost:7700");
        assert_eq!(config.api_key.as_deref(), Some("masterKey"));
    }

    #[test]
    fn test_builder_timeout() {
        let config = ClientConfig::new("http://localhost:7700").with_timeout(Duration::from_secs(2));
        assert_eq!(config.timeout(), Some(Duration::from_secs(2)));
    }

    #[test]
    fn test_builder_timeout_saturates() {
        let config = ClientConfig::new("http://localhost:7700").with_timeout(Duration::MAX);
        assert_eq!(config.timeout_ms, Some(u64::MAX));
    }
}
