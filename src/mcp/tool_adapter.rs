//! Tool Binding
//!
//! Adapts one discovered remote tool to the framework's Tool trait

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::auth::PropagationHeaders;
use crate::core::{BridgeError, BridgeResult};
use crate::tools::{Tool, ToolDefinition, ToolResult};

use super::catalog::ArgumentSchema;
use super::client::RemoteToolClient;
use super::protocol::ToolDescriptor;

/// A remote tool bound to one request's credentials
pub struct ToolBinding {
    /// Tool name (same locally and on the service)
    name: String,

    /// Description supplied by the service
    description: String,

    /// Argument schema of the known tool kind
    schema: ArgumentSchema,

    /// Request-scoped client
    client: Arc<RemoteToolClient>,

    /// Propagation headers captured at discovery time
    headers: PropagationHeaders,
}

impl std::fmt::Debug for ToolBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolBinding")
            .field("name", &self.name)
            .field("schema", &self.schema)
            .finish()
    }
}

impl ToolBinding {
    pub fn new(
        descriptor: ToolDescriptor,
        schema: ArgumentSchema,
        client: Arc<RemoteToolClient>,
        headers: PropagationHeaders,
    ) -> Self {
        Self {
            name: descriptor.name,
            description: descriptor.description,
            schema,
            client,
            headers,
        }
    }

    pub fn schema(&self) -> &ArgumentSchema {
        &self.schema
    }

    /// Blocking invocation is not offered: every call is a network round trip.
    ///
    /// Exists for hosts that demand a blocking entry point on every tool.
    pub fn invoke_blocking(&self, _input: &Value) -> BridgeResult<ToolResult> {
        Err(BridgeError::UnsupportedOperation(format!(
            "Use async version of {} - sync calls not supported",
            self.name
        )))
    }
}

#[async_trait]
impl Tool for ToolBinding {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name.clone(),
            description: if self.description.is_empty() {
                None
            } else {
                Some(self.description.clone())
            },
            input_schema: self.schema.input_schema(),
        }
    }

    async fn execute(&self, input: &Value) -> ToolResult {
        if let Err(reason) = self.schema.validate(input) {
            tracing::warn!("[ToolBinding] Rejected arguments for '{}': {}", self.name, reason);
            return ToolResult::error(format!("Invalid arguments for {}: {}", self.name, reason));
        }

        // Undeclared fields are forwarded untouched; the service is authoritative.
        let arguments = match input {
            Value::Null => Value::Object(Default::default()),
            other => other.clone(),
        };

        tracing::info!("[ToolBinding] Executing tool '{}'", self.name);
        match self.client.call_tool(&self.name, arguments, &self.headers).await {
            Ok(outcome) => {
                tracing::info!("[ToolBinding] Tool '{}' completed successfully", self.name);
                ToolResult::success(outcome.output_text()).with_secondary_token(outcome.secondary_token)
            }
            Err(e) => {
                tracing::error!("[ToolBinding] Error calling {}: {}", self.name, e);
                ToolResult::error(format!("Error calling {}: {}", self.name, e))
            }
        }
    }
}
