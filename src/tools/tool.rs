//! Tool trait definition
//!
//! Every binding the orchestrator can call implements this trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Prefix that marks failed tool output for the orchestrator
pub const ERROR_PREFIX: &str = "ERROR: ";

/// Result of executing a tool
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolResult {
    /// The output of the tool
    pub output: String,
    /// Whether the tool execution resulted in an error
    pub is_error: bool,
    /// Next-hop token surfaced by the call, if any
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub secondary_token: Option<String>,
}

impl ToolResult {
    /// Create a successful tool result
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            is_error: false,
            secondary_token: None,
        }
    }

    /// Create an error tool result; the output is prefixed with `ERROR: `
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            output: format!("{}{}", ERROR_PREFIX, message.into()),
            is_error: true,
            secondary_token: None,
        }
    }

    /// Attach the token captured by this call
    pub fn with_secondary_token(mut self, token: Option<String>) -> Self {
        self.secondary_token = token;
        self
    }
}

/// JSON schema for tool input
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolInputSchema {
    /// Type (always "object")
    #[serde(rename = "type")]
    pub schema_type: String,

    /// Properties of the input object
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<Value>,

    /// Required properties
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
}

/// Tool description handed to the orchestrator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolDefinition {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub input_schema: ToolInputSchema,
}

/// Trait for tools the orchestrator can call
///
/// There is only an async entry point: every call is a network round trip.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the name of this tool
    fn name(&self) -> &str;

    /// Get a description of this tool
    fn description(&self) -> &str;

    /// Get the tool definition for the orchestrator
    fn definition(&self) -> ToolDefinition;

    /// Execute the tool with the given input.
    ///
    /// Failures come back as an error `ToolResult`, not as `Err`, so the
    /// orchestrator can keep the conversation going.
    async fn execute(&self, input: &Value) -> ToolResult;
}
