//! Bridge error types

use serde_json::Value;
use thiserror::Error;

/// Errors that can occur while discovering or invoking remote tools
#[derive(Error, Debug)]
pub enum BridgeError {
    /// Network failure, timeout, or non-2xx status from the tool service
    #[error("Transport error during '{method}': {message}")]
    Transport {
        /// JSON-RPC method that was in flight
        method: String,
        /// Human-readable failure detail
        message: String,
        /// Whether the per-call timeout elapsed
        timed_out: bool,
    },

    /// Malformed JSON, malformed envelope, or a JSON-RPC error outside `tools/call`
    #[error("Protocol error during '{method}': {message}")]
    Protocol {
        /// JSON-RPC method that produced the bad reply
        method: String,
        /// Human-readable failure detail
        message: String,
    },

    /// The remote tool explicitly reported failure
    #[error("Tool '{tool_name}' failed: {message}")]
    ToolInvocation {
        /// Name of the tool that failed
        tool_name: String,
        /// Message from the JSON-RPC error object
        message: String,
        /// Optional `data` member of the JSON-RPC error object
        data: Option<Value>,
    },

    /// Blocking invocation attempted on an async-only binding
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// Best-effort credential or claims decoding failed
    #[error("Decode error: {0}")]
    Decode(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl BridgeError {
    /// Create a transport error
    pub fn transport(method: impl Into<String>, message: impl Into<String>) -> Self {
        BridgeError::Transport {
            method: method.into(),
            message: message.into(),
            timed_out: false,
        }
    }

    /// Create a transport error caused by an elapsed timeout
    pub fn timeout(method: impl Into<String>, message: impl Into<String>) -> Self {
        BridgeError::Transport {
            method: method.into(),
            message: message.into(),
            timed_out: true,
        }
    }

    /// Create a protocol error
    pub fn protocol(method: impl Into<String>, message: impl Into<String>) -> Self {
        BridgeError::Protocol {
            method: method.into(),
            message: message.into(),
        }
    }

    /// Create a decode error
    pub fn decode(msg: impl Into<String>) -> Self {
        BridgeError::Decode(msg.into())
    }

    /// Transport failures may succeed if the caller tries again.
    ///
    /// Nothing in this crate retries; the flag is for callers.
    pub fn is_retryable(&self) -> bool {
        matches!(self, BridgeError::Transport { .. })
    }

    /// Whether this error came from an elapsed per-call timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, BridgeError::Transport { timed_out: true, .. })
    }
}

/// Result type alias for bridge operations
pub type BridgeResult<T> = Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_display() {
        let err = BridgeError::ToolInvocation {
            tool_name: "get_salary".into(),
            message: "insufficient permissions".into(),
            data: Some(json!({"required_scope": "hr:salary:read"})),
        };
        assert_eq!(
            err.to_string(),
            "Tool 'get_salary' failed: insufficient permissions"
        );

        let err = BridgeError::protocol("tools/list", "response is not valid JSON");
        assert_eq!(
            err.to_string(),
            "Protocol error during 'tools/list': response is not valid JSON"
        );
    }

    #[test]
    fn test_retry_classification() {
        assert!(BridgeError::transport("initialize", "connection refused").is_retryable());
        assert!(BridgeError::timeout("tools/call", "timed out").is_timeout());
        assert!(!BridgeError::transport("tools/call", "HTTP 502").is_timeout());
        assert!(!BridgeError::protocol("initialize", "bad").is_retryable());
        assert!(!BridgeError::decode("bad base64").is_retryable());
    }
}
