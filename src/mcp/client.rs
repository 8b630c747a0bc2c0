//! Remote tool client
//!
//! Speaks JSON-RPC 2.0 over HTTP POST to a single tool-service endpoint.
//! Every request carries the caller's propagation headers so the gateway in
//! front of the service can exchange tokens and enforce scopes.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use serde_json::Value;

use crate::auth::{claims, PropagationHeaders};
use crate::core::{BridgeError, BridgeResult};

use super::config::BridgeConfig;
use super::protocol::{
    call_params, extract_call_output, initialize_params, JsonRpcRequest, JsonRpcResponse,
    ToolDescriptor, METHOD_INITIALIZE, METHOD_TOOLS_CALL, METHOD_TOOLS_LIST,
};

/// Result of a successful `tools/call`
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallOutcome {
    /// First text content item, or the raw result object
    pub output: Value,
    /// Next-hop token surfaced by this particular response, if any
    pub secondary_token: Option<String>,
}

impl ToolCallOutcome {
    /// Output rendered as text for the orchestrator
    pub fn output_text(&self) -> String {
        match &self.output {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        }
    }
}

/// Reply from one round trip, before envelope inspection
struct RpcReply {
    envelope: JsonRpcResponse,
    secondary_token: Option<String>,
}

/// Request-scoped JSON-RPC client for the tool service
pub struct RemoteToolClient {
    http: Client,
    endpoint: String,
    discovery_timeout: Duration,
    call_timeout: Duration,
    secondary_token_header: String,
    next_id: AtomicU64,
    captured_secondary_token: Mutex<Option<String>>,
}

impl std::fmt::Debug for RemoteToolClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteToolClient")
            .field("endpoint", &self.endpoint)
            .field("discovery_timeout", &self.discovery_timeout)
            .field("call_timeout", &self.call_timeout)
            .field("next_id", &self.next_id.load(Ordering::SeqCst))
            .finish()
    }
}

impl RemoteToolClient {
    /// Create a client for the configured endpoint
    pub fn new(config: &BridgeConfig) -> BridgeResult<Self> {
        config.validate()?;

        let http = Client::builder()
            .build()
            .map_err(|e| BridgeError::InvalidConfig(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint: config.mcp_server_url.clone(),
            discovery_timeout: config.discovery_timeout(),
            call_timeout: config.call_timeout(),
            secondary_token_header: config.secondary_token_header.clone(),
            next_id: AtomicU64::new(1),
            captured_secondary_token: Mutex::new(None),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Reserve the next request id. Ids start at 1 and never repeat.
    pub fn next_request_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Last next-hop token observed on any `tools/call` response
    pub fn captured_secondary_token(&self) -> Option<String> {
        self.captured_secondary_token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Perform the `initialize` handshake and return the server capabilities
    pub async fn initialize(&self, headers: &PropagationHeaders) -> BridgeResult<Value> {
        tracing::debug!("[McpClient] Initializing session with {}", self.endpoint);

        let reply = self
            .round_trip(METHOD_INITIALIZE, initialize_params(), headers, self.discovery_timeout)
            .await?;

        if let Some(error) = reply.envelope.error {
            return Err(BridgeError::protocol(METHOD_INITIALIZE, error.message));
        }

        Ok(reply.envelope.result.unwrap_or_else(|| Value::Object(Default::default())))
    }

    /// List every tool the service advertises.
    ///
    /// No scope filtering happens here; the gateway owns that decision.
    pub async fn list_tools(&self, headers: &PropagationHeaders) -> BridgeResult<Vec<ToolDescriptor>> {
        let reply = self
            .round_trip(METHOD_TOOLS_LIST, Value::Object(Default::default()), headers, self.discovery_timeout)
            .await?;

        if let Some(error) = reply.envelope.error {
            return Err(BridgeError::protocol(METHOD_TOOLS_LIST, error.message));
        }

        let tools = match reply.envelope.result.as_ref().and_then(|r| r.get("tools")) {
            None | Some(Value::Null) => return Ok(Vec::new()),
            Some(tools) => tools.clone(),
        };

        let descriptors: Vec<ToolDescriptor> = serde_json::from_value(tools).map_err(|e| {
            BridgeError::protocol(METHOD_TOOLS_LIST, format!("malformed tool descriptors: {}", e))
        })?;

        tracing::info!(
            "[McpClient] Service advertises {} tools: {:?}",
            descriptors.len(),
            descriptors.iter().map(|d| d.name.as_str()).collect::<Vec<_>>()
        );

        Ok(descriptors)
    }

    /// Invoke a tool by name. Unknown names are forwarded; the service decides.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: Value,
        headers: &PropagationHeaders,
    ) -> BridgeResult<ToolCallOutcome> {
        tracing::info!("[McpClient] Calling tool '{}'", name);
        tracing::debug!("[McpClient] Arguments: {}", arguments);

        let reply = self
            .round_trip(METHOD_TOOLS_CALL, call_params(name, arguments), headers, self.call_timeout)
            .await?;

        if let Some(token) = &reply.secondary_token {
            *self
                .captured_secondary_token
                .lock()
                .unwrap_or_else(PoisonError::into_inner) = Some(token.clone());
            tracing::info!(
                "[McpClient] Captured next-hop token from '{}' response ({})",
                name,
                claims::preview(token)
            );
        }

        if let Some(error) = reply.envelope.error {
            tracing::error!(
                "[McpClient] Tool '{}' reported error: {} (data: {:?})",
                name,
                error.message,
                error.data
            );
            return Err(BridgeError::ToolInvocation {
                tool_name: name.to_string(),
                message: error.message,
                data: error.data,
            });
        }

        let result = reply
            .envelope
            .result
            .unwrap_or_else(|| Value::Object(Default::default()));

        Ok(ToolCallOutcome {
            output: extract_call_output(result),
            secondary_token: reply.secondary_token,
        })
    }

    /// One POST with a per-call timeout. Classifies transport vs protocol failures.
    async fn round_trip(
        &self,
        method: &str,
        params: Value,
        headers: &PropagationHeaders,
        timeout: Duration,
    ) -> BridgeResult<RpcReply> {
        let id = self.next_request_id();
        let request = JsonRpcRequest::new(id, method, params);

        let mut builder = self
            .http
            .post(&self.endpoint)
            .timeout(timeout)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json");
        for (name, value) in headers {
            builder = builder.header(*name, value.as_str());
        }

        let response = builder
            .json(&request)
            .send()
            .await
            .map_err(|e| classify_reqwest_error(method, e))?;

        let status = response.status();
        let secondary_token = response
            .headers()
            .get(self.secondary_token_header.as_str())
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        let body = response
            .text()
            .await
            .map_err(|e| classify_reqwest_error(method, e))?;

        tracing::debug!("[McpClient] {} #{} -> {}", method, id, status);

        if !status.is_success() {
            tracing::error!("[McpClient] {} #{} failed with HTTP {}: {}", method, id, status, body);
            return Err(BridgeError::transport(
                method,
                format!("HTTP {}: {}", status, truncate(&body, 200)),
            ));
        }

        let envelope: JsonRpcResponse = serde_json::from_str(&body).map_err(|e| {
            BridgeError::protocol(method, format!("response is not a JSON-RPC envelope: {}", e))
        })?;

        Ok(RpcReply {
            envelope,
            secondary_token,
        })
    }
}

fn classify_reqwest_error(method: &str, error: reqwest::Error) -> BridgeError {
    if error.is_builder() {
        // bad URL or header value; nothing was sent and a retry cannot help
        tracing::error!("[McpClient] {} request could not be built: {}", method, error);
        BridgeError::protocol(method, format!("request could not be built: {}", error))
    } else if error.is_timeout() {
        tracing::error!("[McpClient] {} timed out: {}", method, error);
        BridgeError::timeout(method, format!("request timed out: {}", error))
    } else {
        tracing::error!("[McpClient] {} transport failure: {}", method, error);
        BridgeError::transport(method, error.to_string())
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}
