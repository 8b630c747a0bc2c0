//! Core types shared across the bridge
//!
//! - `BridgeError` / `BridgeResult` - Error types

pub mod error;

pub use error::{BridgeError, BridgeResult};
