//! Per-request credential context
//!
//! The gateway in front of the bridge injects the caller's identity, granted
//! scopes, and delegation trail as headers. `CredentialContext` captures them
//! once per inbound request and hands out the header set that must accompany
//! every outbound hop.

use std::collections::BTreeMap;

use base64::Engine;
use reqwest::header::HeaderMap;
use serde_json::Value;

use crate::core::{BridgeError, BridgeResult};

use super::claims::strip_bearer;

/// Space-separated scope tokens granted to the caller
pub const USER_SCOPES_HEADER: &str = "X-User-Scopes";
/// Caller identity
pub const USER_SUB_HEADER: &str = "X-User-Sub";
/// Opaque delegation trail
pub const ACTOR_CHAIN_HEADER: &str = "X-Actor-Chain";
/// Bearer credential for this hop
pub const AUTHORIZATION_HEADER: &str = "Authorization";
/// Base64 JSON token-exchange response
pub const INTROSPECTION_TOKEN_HEADER: &str = "x-introspection-token";

/// Header set forwarded verbatim to the next hop
pub type PropagationHeaders = BTreeMap<&'static str, String>;

/// Raw inbound header values, any of which may be missing
#[derive(Debug, Clone, Default)]
pub struct InboundCredentials {
    pub user_scopes: Option<String>,
    pub user_sub: Option<String>,
    pub actor_chain: Option<String>,
    pub authorization: Option<String>,
    pub introspection_token: Option<String>,
}

/// Immutable authorization context for one inbound request
#[derive(Debug, Clone)]
pub struct CredentialContext {
    raw_scopes: String,
    scopes: Vec<String>,
    subject: String,
    actor_chain: String,
    primary_token: Option<String>,
    secondary_envelope: Option<String>,
    exchanged_token: Option<String>,
}

impl CredentialContext {
    /// Build a context from raw header values. Never fails.
    pub fn new(inbound: InboundCredentials) -> Self {
        let raw_scopes = inbound.user_scopes.unwrap_or_default();
        let scopes = raw_scopes.split_whitespace().map(str::to_string).collect();

        let mut ctx = Self {
            raw_scopes,
            scopes,
            subject: inbound.user_sub.unwrap_or_default(),
            actor_chain: inbound.actor_chain.unwrap_or_default(),
            primary_token: non_empty(inbound.authorization),
            secondary_envelope: non_empty(inbound.introspection_token),
            exchanged_token: None,
        };
        ctx.exchanged_token = ctx.decode_secondary();
        ctx
    }

    /// Build a context from an inbound header map (names are case-insensitive)
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let get = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };

        Self::new(InboundCredentials {
            user_scopes: get(USER_SCOPES_HEADER),
            user_sub: get(USER_SUB_HEADER),
            actor_chain: get(ACTOR_CHAIN_HEADER),
            authorization: get(AUTHORIZATION_HEADER),
            introspection_token: get(INTROSPECTION_TOKEN_HEADER),
        })
    }

    /// Decode the token-exchange envelope, if any.
    ///
    /// Failure is logged and reported as `None`.
    pub fn decode_secondary(&self) -> Option<String> {
        let envelope = self.secondary_envelope.as_deref()?;

        match decode_exchange_envelope(envelope) {
            Ok(token) => {
                tracing::info!("[Credentials] Extracted exchanged token from introspection header");
                Some(token)
            }
            Err(e) => {
                tracing::warn!("[Credentials] Ignoring introspection header: {}", e);
                None
            }
        }
    }

    /// Pure membership check against the granted scopes
    pub fn has(&self, scope: &str) -> bool {
        self.scopes.iter().any(|s| s == scope)
    }

    /// Headers to forward to the next hop.
    ///
    /// Pass `include_auth = false` when the target injects its own credentials.
    pub fn propagation_headers(&self, include_auth: bool) -> PropagationHeaders {
        let mut headers = PropagationHeaders::new();
        headers.insert(USER_SCOPES_HEADER, self.raw_scopes.clone());
        headers.insert(USER_SUB_HEADER, self.subject.clone());
        headers.insert(ACTOR_CHAIN_HEADER, self.actor_chain.clone());
        if include_auth {
            if let Some(token) = &self.primary_token {
                headers.insert(AUTHORIZATION_HEADER, token.clone());
            }
        }
        headers
    }

    /// Token that represents the first hop: the exchanged token when present,
    /// otherwise the bearer credential with its prefix removed.
    pub fn resolved_primary_token(&self) -> Option<String> {
        if let Some(token) = &self.exchanged_token {
            return Some(token.clone());
        }
        let bearer = strip_bearer(self.primary_token.as_deref()?);
        if bearer.is_empty() {
            None
        } else {
            tracing::debug!("[Credentials] No exchanged token, falling back to Authorization");
            Some(bearer.to_string())
        }
    }

    pub fn raw_scopes(&self) -> &str {
        &self.raw_scopes
    }

    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn actor_chain(&self) -> &str {
        &self.actor_chain
    }

    pub fn primary_token(&self) -> Option<&str> {
        self.primary_token.as_deref()
    }

    pub fn secondary_envelope(&self) -> Option<&str> {
        self.secondary_envelope.as_deref()
    }

    pub fn exchanged_token(&self) -> Option<&str> {
        self.exchanged_token.as_deref()
    }
}

/// base64 → JSON → `access_token`
pub fn decode_exchange_envelope(envelope: &str) -> BridgeResult<String> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(envelope.trim().as_bytes())
        .map_err(|e| BridgeError::decode(format!("envelope is not base64: {}", e)))?;

    let json: Value = serde_json::from_slice(&bytes)
        .map_err(|e| BridgeError::decode(format!("envelope is not JSON: {}", e)))?;

    match json.get("access_token").and_then(Value::as_str) {
        Some(token) if !token.is_empty() => Ok(token.to_string()),
        _ => Err(BridgeError::decode("envelope has no access_token")),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
pub(crate) fn encode_envelope(json: &Value) -> String {
    base64::engine::general_purpose::STANDARD.encode(json.to_string().as_bytes())
}
