//! Tool registry for managing available tools
//!
//! The registry holds the bindings available to one turn. Tools are added
//! directly or pulled from a provider.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use crate::core::BridgeResult;

use super::provider::ToolProvider;
use super::tool::{Tool, ToolDefinition, ToolResult};

/// Registry that holds all available tools
#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create a new empty tool registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, replacing any tool with the same name
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        if self.tools.insert(name.clone(), tool).is_some() {
            tracing::warn!("[ToolRegistry] Replaced existing tool '{}'", name);
        } else {
            tracing::debug!("[ToolRegistry] Registered tool '{}'", name);
        }
    }

    /// Fetch all tools from a provider and add them.
    pub async fn add_provider(&mut self, provider: &dyn ToolProvider) -> BridgeResult<usize> {
        let tools = provider.get_tools().await?;
        let count = tools.len();

        for tool in tools {
            self.register(tool);
        }

        tracing::info!(
            "[ToolRegistry] Added {} tools from provider '{}'",
            count,
            provider.name()
        );
        Ok(count)
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Definitions of every registered tool, sorted by name
    pub fn get_definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| t.definition()).collect()
    }

    /// Execute a tool by name. An unknown name is a failed result, not an error.
    pub async fn execute(&self, name: &str, input: &Value) -> ToolResult {
        let Some(tool) = self.tools.get(name) else {
            tracing::warn!("[ToolRegistry] Orchestrator requested unknown tool '{}'", name);
            return ToolResult::error(format!("Tool not found: {}", name));
        };

        tracing::debug!("[ToolRegistry] Executing '{}' with input {}", name, input);
        let result = tool.execute(input).await;
        tracing::debug!("[ToolRegistry] '{}' completed. Is error: {}", name, result.is_error);
        result
    }

    /// Get the list of tool names
    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    /// Get the number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
