//! Derived identity checks performed at the request boundary.
//!
//! The gate itself only reports a verdict. Turning a verdict into "this
//! caller may proceed" happens here, and both failure modes surface as
//! authorization errors — never as identity-service outages.

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::debug;

use shopkeep_core::UserId;

use crate::claims::AuthResult;
use crate::gate::IdentityGate;

/// A caller whose token the identity service accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub user_id: UserId,
    pub claims: BTreeMap<String, String>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid authentication token")]
    InvalidToken,

    #[error("inactive user")]
    InactiveUser,
}

/// Resolve a bearer token into a caller identity.
///
/// A negative verdict, and equally a positive verdict without a usable `id`
/// claim, fails with [`AuthError::InvalidToken`].
pub async fn authenticate<G: IdentityGate>(
    gate: &G,
    token: &str,
) -> Result<CallerIdentity, AuthError> {
    let verdict: AuthResult = gate.validate_token(token).await;

    if !verdict.is_valid {
        debug!("token rejected by identity service");
        return Err(AuthError::InvalidToken);
    }

    let Some(user_id) = verdict.user_id() else {
        debug!("valid verdict without a usable id claim");
        return Err(AuthError::InvalidToken);
    };

    Ok(CallerIdentity {
        user_id,
        claims: verdict.claims,
    })
}

/// Resolve a bearer token and additionally require an active subject.
pub async fn authenticate_active<G: IdentityGate>(
    gate: &G,
    token: &str,
) -> Result<CallerIdentity, AuthError> {
    let caller = authenticate(gate, token).await?;

    if caller.claims.get("is_active").map(String::as_str) != Some("true") {
        debug!(user_id = %caller.user_id, "authenticated but inactive");
        return Err(AuthError::InactiveUser);
    }

    Ok(caller)
}
