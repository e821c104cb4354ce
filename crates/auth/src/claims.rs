//! Identity verdict model (transport-agnostic).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use shopkeep_core::UserId;

/// Verdict returned by the identity service for a bearer token.
///
/// Transient by design — a verdict is consumed by the request boundary and
/// discarded, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResult {
    /// Whether the token was accepted by the identity service.
    pub is_valid: bool,

    /// Claims reported for the token's subject. Expected to carry at least
    /// `id` and `is_active` when `is_valid` is true.
    pub claims: BTreeMap<String, String>,
}

impl AuthResult {
    /// The fail-closed verdict: not valid, no claims.
    ///
    /// An unreachable identity service degrades to exactly this value, so an
    /// outage is indistinguishable from a bad token.
    pub fn invalid() -> Self {
        Self {
            is_valid: false,
            claims: BTreeMap::new(),
        }
    }

    pub fn valid(claims: BTreeMap<String, String>) -> Self {
        Self {
            is_valid: true,
            claims,
        }
    }

    /// The subject's user id, if the claims carry a parseable `id`.
    pub fn user_id(&self) -> Option<UserId> {
        self.claims
            .get("id")
            .and_then(|raw| raw.parse::<i64>().ok())
            .map(UserId::new)
    }

    /// Whether the subject is marked active. Absent or malformed means no.
    pub fn is_active(&self) -> bool {
        self.claims.get("is_active").map(String::as_str) == Some("true")
    }
}
