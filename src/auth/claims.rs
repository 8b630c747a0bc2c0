//! Unverified JWT inspection
//!
//! Tokens are decoded for display only. Signatures are never checked; the
//! gateway in front of each hop is the authority.

use base64::Engine;
use serde_json::{Map, Value};

use crate::core::{BridgeError, BridgeResult};

/// Claims carried in a JWT payload
pub type Claims = Map<String, Value>;

/// Strip a leading `Bearer ` (either case) from an authorization value
pub fn strip_bearer(value: &str) -> &str {
    value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .unwrap_or(value)
        .trim()
}

/// Decode the payload segment of a compact JWT without verification
pub fn decode_claims(token: &str) -> BridgeResult<Claims> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(BridgeError::decode(format!(
            "expected 3 token segments, found {}",
            parts.len()
        )));
    }

    let mut payload = parts[1].to_string();
    let remainder = payload.len() % 4;
    if remainder != 0 {
        payload.push_str(&"=".repeat(4 - remainder));
    }

    let bytes = base64::engine::general_purpose::URL_SAFE
        .decode(payload.as_bytes())
        .map_err(|e| BridgeError::decode(format!("payload is not base64url: {}", e)))?;

    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(claims)) => Ok(claims),
        Ok(_) => Err(BridgeError::decode("payload is not a JSON object")),
        Err(e) => Err(BridgeError::decode(format!("payload is not JSON: {}", e))),
    }
}

/// Short, log-safe preview of a token
pub fn preview(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 24 {
        return format!("<{} chars>", chars.len());
    }
    let head: String = chars[..12].iter().collect();
    let tail: String = chars[chars.len() - 8..].iter().collect();
    format!("{}...{}", head, tail)
}

#[cfg(test)]
pub(crate) fn encode_test_jwt(claims: &Value) -> String {
    let engine = base64::engine::general_purpose::URL_SAFE_NO_PAD;
    let header = engine.encode(br#"{"alg":"RS256","typ":"JWT"}"#);
    let payload = engine.encode(claims.to_string().as_bytes());
    format!("{}.{}.c2lnbmF0dXJl", header, payload)
}
