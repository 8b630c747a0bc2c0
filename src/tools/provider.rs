//! Tool Provider trait
//!
//! Abstraction for dynamic tool sources such as the remote tool service

use async_trait::async_trait;
use std::sync::Arc;

use crate::core::BridgeResult;

use super::tool::Tool;

/// Trait for dynamic tool providers
#[async_trait]
pub trait ToolProvider: Send + Sync {
    /// Get all tools from this provider.
    ///
    /// Errors here are discovery failures and abort the turn.
    async fn get_tools(&self) -> BridgeResult<Vec<Arc<dyn Tool>>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &str;
}
