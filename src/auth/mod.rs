//! Caller credentials
//!
//! - `CredentialContext` - identity, scopes, and tokens from inbound headers
//! - `claims` - unverified JWT payload inspection for observability

pub mod claims;
mod context;

pub use claims::{decode_claims, strip_bearer, Claims};
pub use context::{
    decode_exchange_envelope, CredentialContext, InboundCredentials, PropagationHeaders,
    ACTOR_CHAIN_HEADER, AUTHORIZATION_HEADER, INTROSPECTION_TOKEN_HEADER, USER_SCOPES_HEADER,
    USER_SUB_HEADER,
};

#[cfg(test)]
pub(crate) use context::encode_envelope;
