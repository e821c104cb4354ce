//! Identity gate capability trait.

use std::sync::Arc;

use async_trait::async_trait;

use crate::claims::AuthResult;

/// Capability to turn a bearer token into a verified identity.
///
/// ## Fail-closed contract
///
/// `validate_token` **never errors**. Any transport failure — unreachable
/// identity service, protocol error, undecodable response — degrades to
/// [`AuthResult::invalid`]. A dependency outage therefore reads as "denied",
/// never as an error a caller could mistake for "authorized".
///
/// Connection lifecycle (connect/close) belongs to the concrete client, not
/// this trait: the process opens the client once at startup and all requests
/// borrow it concurrently.
#[async_trait]
pub trait IdentityGate: Send + Sync {
    async fn validate_token(&self, token: &str) -> AuthResult;
}

#[async_trait]
impl<G> IdentityGate for Arc<G>
where
    G: IdentityGate + ?Sized,
{
    async fn validate_token(&self, token: &str) -> AuthResult {
        (**self).validate_token(token).await
    }
}
