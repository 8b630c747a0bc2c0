//! MCP (Model Context Protocol) tool bridge
//!
//! Lets an orchestrator call tools hosted by a remote JSON-RPC service while
//! forwarding the caller's credentials on every hop.
//!
//! # Architecture
//!
//! - `RemoteToolClient`: JSON-RPC `initialize`, `tools/list`, `tools/call`
//! - `ToolCatalog`: tool kinds the bridge knows how to bind, with argument schemas
//! - `ToolBinding`: one remote tool adapted to the `Tool` trait
//! - `ToolBindingFactory`: implements `ToolProvider`, builds bindings per request
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use delegation_bridge::auth::CredentialContext;
//! use delegation_bridge::mcp::{BridgeConfig, RemoteToolClient, ToolBindingFactory, ToolCatalog};
//!
//! let config = BridgeConfig::from_env()?;
//! let context = CredentialContext::from_headers(&inbound_headers);
//! let client = Arc::new(RemoteToolClient::new(&config)?);
//! let factory = ToolBindingFactory::new(client, Arc::new(ToolCatalog::hr()), context);
//! let bindings = factory.discover().await?;
//! ```

mod catalog;
mod client;
mod config;
pub mod protocol;
mod provider;
mod tool_adapter;

#[cfg(test)]
pub(crate) mod test_support;

pub use catalog::{ArgumentSchema, ParamSpec, ParamType, ToolCatalog};
pub use client::{RemoteToolClient, ToolCallOutcome};
pub use config::BridgeConfig;
pub use protocol::ToolDescriptor;
pub use provider::ToolBindingFactory;
pub use tool_adapter::ToolBinding;
