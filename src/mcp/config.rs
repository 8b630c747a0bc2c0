//! Bridge Configuration
//!
//! Endpoint, timeouts, and loop limits for the tool bridge

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::core::{BridgeError, BridgeResult};

/// Configuration for the remote tool service and the turn driver
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// JSON-RPC endpoint of the tool service (e.g., "http://kong-gateway:8000/mcp")
    #[serde(default = "default_mcp_server_url")]
    pub mcp_server_url: String,

    /// Timeout for `initialize` and `tools/list` in milliseconds
    #[serde(default = "default_discovery_timeout_ms")]
    pub discovery_timeout_ms: u64,

    /// Timeout for `tools/call` in milliseconds
    #[serde(default = "default_call_timeout_ms")]
    pub call_timeout_ms: u64,

    /// Response header that carries the token used for the next hop
    #[serde(default = "default_secondary_token_header")]
    pub secondary_token_header: String,

    /// Maximum orchestrator steps per turn
    #[serde(default = "default_max_tool_iterations")]
    pub max_tool_iterations: usize,

    /// Optional local allow-list of tool names. `None` disables filtering.
    #[serde(default)]
    pub allowed_tools: Option<Vec<String>>,
}

fn default_mcp_server_url() -> String {
    "http://kong-gateway:8000/mcp".to_string()
}

fn default_discovery_timeout_ms() -> u64 {
    10_000
}

fn default_call_timeout_ms() -> u64 {
    30_000
}

fn default_secondary_token_header() -> String {
    "X-MCP-Token".to_string()
}

fn default_max_tool_iterations() -> usize {
    20
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            mcp_server_url: default_mcp_server_url(),
            discovery_timeout_ms: default_discovery_timeout_ms(),
            call_timeout_ms: default_call_timeout_ms(),
            secondary_token_header: default_secondary_token_header(),
            max_tool_iterations: default_max_tool_iterations(),
            allowed_tools: None,
        }
    }
}

impl BridgeConfig {
    /// Create a configuration for the given endpoint with default limits
    pub fn new(mcp_server_url: impl Into<String>) -> Self {
        Self {
            mcp_server_url: mcp_server_url.into(),
            ..Self::default()
        }
    }

    /// Load configuration from process environment variables
    pub fn from_env() -> BridgeResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    ///
    /// Unset keys keep their defaults. The result is validated.
    pub fn from_lookup<F>(lookup: F) -> BridgeResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("MCP_SERVER_URL") {
            config.mcp_server_url = url;
        }
        if let Some(ms) = lookup("MCP_DISCOVERY_TIMEOUT_MS") {
            config.discovery_timeout_ms = parse_number("MCP_DISCOVERY_TIMEOUT_MS", &ms)?;
        }
        if let Some(ms) = lookup("MCP_CALL_TIMEOUT_MS") {
            config.call_timeout_ms = parse_number("MCP_CALL_TIMEOUT_MS", &ms)?;
        }
        if let Some(header) = lookup("MCP_TOKEN_HEADER") {
            config.secondary_token_header = header;
        }
        if let Some(cap) = lookup("AGENT_MAX_TOOL_ITERATIONS") {
            config.max_tool_iterations = parse_number("AGENT_MAX_TOOL_ITERATIONS", &cap)?;
        }
        if let Some(list) = lookup("MCP_ALLOWED_TOOLS") {
            let names: Vec<String> = list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            config.allowed_tools = Some(names);
        }

        config.validate()?;
        Ok(config)
    }

    /// Set the tool service endpoint
    pub fn with_mcp_server_url(mut self, url: impl Into<String>) -> Self {
        self.mcp_server_url = url.into();
        self
    }

    /// Set the discovery timeout
    pub fn with_discovery_timeout(mut self, timeout_ms: u64) -> Self {
        self.discovery_timeout_ms = timeout_ms;
        self
    }

    /// Set the tool call timeout
    pub fn with_call_timeout(mut self, timeout_ms: u64) -> Self {
        self.call_timeout_ms = timeout_ms;
        self
    }

    /// Set the response header inspected for next-hop tokens
    pub fn with_secondary_token_header(mut self, header: impl Into<String>) -> Self {
        self.secondary_token_header = header.into();
        self
    }

    /// Set the orchestrator iteration cap
    pub fn with_max_tool_iterations(mut self, max: usize) -> Self {
        self.max_tool_iterations = max;
        self
    }

    /// Restrict discovery to the named tools
    pub fn with_allowed_tools<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_tools = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Get discovery timeout as Duration
    pub fn discovery_timeout(&self) -> Duration {
        Duration::from_millis(self.discovery_timeout_ms)
    }

    /// Get call timeout as Duration
    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }

    /// Reject settings the bridge cannot run with
    pub fn validate(&self) -> BridgeResult<()> {
        reqwest::Url::parse(&self.mcp_server_url).map_err(|e| {
            BridgeError::InvalidConfig(format!(
                "mcp_server_url '{}' is not a valid URL: {}",
                self.mcp_server_url, e
            ))
        })?;

        if self.discovery_timeout_ms == 0 || self.call_timeout_ms == 0 {
            return Err(BridgeError::InvalidConfig(
                "timeouts must be greater than zero".into(),
            ));
        }
        if self.max_tool_iterations == 0 {
            return Err(BridgeError::InvalidConfig(
                "max_tool_iterations must be greater than zero".into(),
            ));
        }
        if self.secondary_token_header.trim().is_empty() {
            return Err(BridgeError::InvalidConfig(
                "secondary_token_header must not be empty".into(),
            ));
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> BridgeResult<T> {
    raw.trim()
        .parse()
        .map_err(|_| BridgeError::InvalidConfig(format!("{} must be a number, got '{}'", key, raw)))
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
    fn test_defaults() {
        let config = BridgeConfig::default();
        assert_eq!(config.discovery_timeout(), Duration::from_secs(10));
        assert_eq!(config.call_timeout(), Duration::from_secs(30));
        assert_eq!(config.secondary_token_header, "X-MCP-Token");
        assert_eq!(config.max_tool_iterations, 20);
        assert!(config.allowed_tools.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = BridgeConfig::from_lookup(lookup(&[
            ("MCP_SERVER_URL", "http://127.0.0.1:9000/mcp"),
            ("MCP_CALL_TIMEOUT_MS", "45000"),
            ("AGENT_MAX_TOOL_ITERATIONS", "5"),
            ("MCP_ALLOWED_TOOLS", "get_employee, list_departments,,"),
        ]))
        .unwrap();

        assert_eq!(config.mcp_server_url, "http://127.0.0.1:9000/mcp");
        assert_eq!(config.call_timeout_ms, 45_000);
        assert_eq!(config.discovery_timeout_ms, 10_000);
        assert_eq!(config.max_tool_iterations, 5);
        assert_eq!(
            config.allowed_tools,
            Some(vec!["get_employee".to_string(), "list_departments".to_string()])
        );
    }

    #[test]
    fn test_from_lookup_rejects_bad_values() {
        let err = BridgeConfig::from_lookup(lookup(&[("MCP_CALL_TIMEOUT_MS", "soon")])).unwrap_err();
        assert!(matches!(err, BridgeError::InvalidConfig(_)));

        assert!(BridgeConfig::from_lookup(lookup(&[("MCP_SERVER_URL", "not a url")])).is_err());
        assert!(BridgeConfig::from_lookup(lookup(&[("AGENT_MAX_TOOL_ITERATIONS", "0")])).is_err());
    }

    #[test]
    fn test_builders_and_validation() {
        let config = BridgeConfig::new("http://127.0.0.1:8005/mcp")
            .with_discovery_timeout(2_500)
            .with_call_timeout(4_000)
            .with_secondary_token_header("X-Next-Hop");
        assert_eq!(config.discovery_timeout(), Duration::from_millis(2_500));
        assert_eq!(config.call_timeout(), Duration::from_millis(4_000));
        assert_eq!(config.secondary_token_header, "X-Next-Hop");
        assert!(config.validate().is_ok());

        assert!(config.clone().with_discovery_timeout(0).validate().is_err());
        assert!(config.with_secondary_token_header("").validate().is_err());
    }

    #[test]
    fn test_deserialize_partial_json() {
        let config: BridgeConfig =
            serde_json::from_str(r#"{"mcp_server_url": "http://localhost:8005/mcp"}"#).unwrap();
        assert_eq!(config.call_timeout_ms, 30_000);
        assert_eq!(config.max_tool_iterations, 20);
    }
}
