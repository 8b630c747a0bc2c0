//! Tool system
//!
//! This module provides:
//! - `Tool` trait - Interface the orchestrator calls through
//! - `ToolResult` - Result type for tool execution (failures are data)
//! - `ToolRegistry` - Registry of the tools available to a turn
//! - `ToolProvider` trait - Interface for dynamic tool sources

mod provider;
mod registry;
mod tool;

pub use provider::ToolProvider;
pub use registry::ToolRegistry;
pub use tool::{Tool, ToolDefinition, ToolInputSchema, ToolResult, ERROR_PREFIX};
