pub mod core;

// Caller credentials and token decoding
pub mod auth;

// JSON-RPC tool service client and tool bindings
pub mod mcp;

// Tool trait and registry consumed by the orchestrator
pub mod tools;

// Audit trail of tokens seen during a turn
pub mod delegation;

// Turn driver
pub mod agent;

pub mod logging;
