//! Delegation chain assembly
//!
//! Pure bookkeeping: turns the tokens seen during a turn into an ordered list
//! of hops for audit output. Nothing here carries enforcement weight.

use serde::{Deserialize, Serialize};

use crate::auth::{claims, decode_claims, strip_bearer, Claims, CredentialContext};

const PRIMARY_HOP_DESCRIPTION: &str = "Token exchanged by the gateway for the tool bridge (caller → bridge)";
const SECONDARY_HOP_DESCRIPTION: &str = "Token exchanged by the gateway for the tool service (bridge → tool service)";

/// One service boundary crossed during a turn
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DelegationHop {
    /// 1-based position in the chain
    pub hop: u32,
    pub token: String,
    /// Decoded, unverified claims; `None` when the token is not a readable JWT
    pub claims: Option<Claims>,
    pub description: String,
}

/// Assembles `DelegationHop` lists
#[derive(Debug, Clone, Copy, Default)]
pub struct DelegationChainRecorder;

impl DelegationChainRecorder {
    pub fn new() -> Self {
        Self
    }

    /// Build the chain: hop 1 is `primary`, hops 2.. follow `secondary` in order.
    ///
    /// Empty tokens are skipped; `Bearer ` prefixes are removed.
    pub fn assemble<I, S>(&self, primary: Option<&str>, secondary: I) -> Vec<DelegationHop>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut hops = Vec::new();

        if let Some(token) = primary.map(strip_bearer).filter(|t| !t.is_empty()) {
            hops.push(self.hop(1, token, PRIMARY_HOP_DESCRIPTION));
        }

        // captured tokens start at hop 2 whether or not a primary was seen
        let mut next = 2u32;
        for token in secondary {
            let token = strip_bearer(token.as_ref());
            if token.is_empty() {
                continue;
            }
            hops.push(self.hop(next, token, SECONDARY_HOP_DESCRIPTION));
            next += 1;
        }

        hops
    }

    /// Chain for a finished turn: the context's resolved primary token plus
    /// whatever the tool client captured.
    pub fn for_turn(&self, context: &CredentialContext, captured: Option<&str>) -> Vec<DelegationHop> {
        let primary = context.resolved_primary_token();
        self.assemble(primary.as_deref(), captured)
    }

    fn hop(&self, index: u32, token: &str, description: &str) -> DelegationHop {
        let claims = match decode_claims(token) {
            Ok(claims) => {
                tracing::info!(
                    "[Delegation] Hop {}: aud={} sub={} scope={}",
                    index,
                    claim_str(&claims, "aud"),
                    claim_str(&claims, "sub"),
                    claim_str(&claims, "scope"),
                );
                Some(claims)
            }
            Err(e) => {
                tracing::warn!(
                    "[Delegation] Hop {}: claims unavailable for {}: {}",
                    index,
                    claims::preview(token),
                    e
                );
                None
            }
        };

        DelegationHop {
            hop: index,
            token: token.to_string(),
            claims,
            description: description.to_string(),
        }
    }
}

fn claim_str(claims: &Claims, key: &str) -> String {
    match claims.get(key) {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => "-".to_string(),
    }
}
