//! Relay configuration
//!
//! Built once at startup from the environment plus command-line overrides,
//! then handed to the client constructors by reference.

use crate::error::{Error, Result};
use std::time::Duration;

/// Environment variable holding the inference service base URL
pub const INFERENCE_URL_VAR: &str = "COLAB_SERVER_URL";

/// Environment variable holding the agent control server base URL
pub const AGENT_URL_VAR: &str = "NODE_SERVER_URL";

/// Used by the inference client when no URL is configured at all
pub const DEFAULT_INFERENCE_URL: &str = "http://localhost:5000";

pub const DEFAULT_AGENT_URL: &str = "http://localhost:3000";

/// Settings for the inference service connection
#[derive(Debug, Clone)]
pub struct InferenceConfig {
    /// Base URL, normalized by the client. `None` means [`DEFAULT_INFERENCE_URL`].
    pub base_url: Option<String>,
    /// Startup `/health` probe
    pub health_timeout: Duration,
    /// `/parse`, long enough to cover model latency
    pub parse_timeout: Duration,
    /// `/info` and `/stats`
    pub query_timeout: Duration,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            health_timeout: Duration::from_secs(5),
            parse_timeout: Duration::from_secs(30),
            query_timeout: Duration::from_secs(5),
        }
    }
}

impl InferenceConfig {
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn with_parse_timeout(mut self, timeout: Duration) -> Self {
        self.parse_timeout = timeout;
        self
    }
}

/// Settings for the agent control server connection
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub base_url: String,
    /// `/command`; agent actions such as mining can take minutes
    pub command_timeout: Duration,
    /// `/status`
    pub status_timeout: Duration,
    /// TCP connect, separate from the request timeouts so an unreachable
    /// agent is reported as such
    pub connect_timeout: Duration,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_AGENT_URL.to_string(),
            command_timeout: Duration::from_secs(120),
            status_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(5),
        }
    }
}

impl AgentConfig {
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

/// Complete relay configuration
#[derive(Debug, Clone, Default)]
pub struct RelayConfig {
    pub inference: InferenceConfig,
    pub agent: AgentConfig,
}

impl RelayConfig {
    /// Read service URLs from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read service URLs through `lookup`. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let mut config = Self::default();
        config.inference.base_url = read(INFERENCE_URL_VAR);
        if let Some(url) = read(AGENT_URL_VAR) {
            config.agent.base_url = url;
        }
        config
    }

    /// Command-line value for the inference URL; wins over the environment
    pub fn with_inference_url(mut self, url: Option<String>) -> Self {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            self.inference.base_url = Some(url);
        }
        self
    }

    /// Command-line value for the agent URL; wins over the environment
    pub fn with_agent_url(mut self, url: Option<String>) -> Self {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            self.agent.base_url = url;
        }
        self
    }

    /// The binary refuses to start without an explicitly configured inference URL.
    pub fn require_inference_url(&self) -> Result<&str> {
        self.inference.base_url.as_deref().ok_or_else(|| {
            Error::config_invalid(format!("{} not set", INFERENCE_URL_VAR))
                .with_operation("config::require_inference_url")
        })
    }
}

/// Prepend `http://` when no scheme is present and drop trailing slashes.
pub fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim();
    let with_scheme = if trimmed.starts_with("http") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    };
    with_scheme.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_normalize_adds_scheme() {
        assert_eq!(normalize_base_url("abcd.ngrok.io"), "http://abcd.ngrok.io");
        assert_eq!(normalize_base_url("localhost:5000"), "http://localhost:5000");
    }

    #[test]
    fn test_normalize_strips_trailing_slashes() {
        assert_eq!(normalize_base_url("https://abcd.ngrok.io/"), "https://abcd.ngrok.io");
        assert_eq!(normalize_base_url("http://localhost:5000//"), "http://localhost:5000");
        assert_eq!(normalize_base_url("  http://host:1/ "), "http://host:1");
    }

    #[test]
    fn test_defaults() {
        let config = RelayConfig::default();
        assert!(config.inference.base_url.is_none());
        assert_eq!(config.agent.base_url, DEFAULT_AGENT_URL);
        assert_eq!(config.inference.health_timeout, Duration::from_secs(5));
        assert_eq!(config.inference.parse_timeout, Duration::from_secs(30));
        assert_eq!(config.agent.command_timeout, Duration::from_secs(120));
        assert_eq!(config.agent.status_timeout, Duration::from_secs(5));
        assert_eq!(config.agent.connect_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_from_lookup_reads_both_urls() {
        let config = RelayConfig::from_lookup(lookup(&[
            (INFERENCE_URL_VAR, "https://abcd.ngrok.io"),
            (AGENT_URL_VAR, "http://10.0.0.2:3000"),
        ]));

        assert_eq!(config.inference.base_url.as_deref(), Some("https://abcd.ngrok.io"));
        assert_eq!(config.agent.base_url, "http://10.0.0.2:3000");
    }

    #[test]
    fn test_empty_values_are_unset() {
        let config = RelayConfig::from_lookup(lookup(&[
            (INFERENCE_URL_VAR, ""),
            (AGENT_URL_VAR, "   "),
        ]));

        assert!(config.inference.base_url.is_none());
        assert_eq!(config.agent.base_url, DEFAULT_AGENT_URL);
    }

    #[test]
    fn test_command_line_overrides_env() {
        let config = RelayConfig::from_lookup(lookup(&[(INFERENCE_URL_VAR, "http://env:5000")]))
            .with_inference_url(Some("http://arg:5000".into()))
            .with_agent_url(None);

        assert_eq!(config.inference.base_url.as_deref(), Some("http://arg:5000"));
        assert_eq!(config.agent.base_url, DEFAULT_AGENT_URL);
    }

    #[test]
    fn test_require_inference_url() {
        let config = RelayConfig::default();
        let err = config.require_inference_url().unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::ConfigInvalid);
        assert!(err.message().contains(INFERENCE_URL_VAR));

        let config = config.with_inference_url(Some("localhost:5000".into()));
        assert_eq!(config.require_inference_url().unwrap(), "localhost:5000");
    }
}
