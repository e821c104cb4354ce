//! HTTP identity client (fail-closed).
//!
//! The remote trust service answers `POST {base}/validate` with
//! `{"is_valid": bool, "user": {...}}`. Per the gate contract, this client
//! never surfaces a transport failure: an unreachable identity service and
//! a bad token produce the same negative verdict.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use shopkeep_auth::{AuthResult, IdentityGate};

/// Upper bound on a validation round trip, so a stalled identity service
/// cannot pin request tasks indefinitely.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum IdentityClientError {
    #[error("failed to build http client: {0}")]
    Build(String),
}

#[derive(Debug, Serialize)]
struct ValidateRequest<'a> {
    token: &'a str,
}

#[derive(Debug, Deserialize)]
struct ValidateResponse {
    is_valid: bool,
    #[serde(default)]
    user: BTreeMap<String, serde_json::Value>,
}

/// Identity gate backed by an HTTP trust service.
///
/// Connects lazily and is deliberately *not* wrapped in the connection
/// supervisor: the broker gets startup retries, the identity service does
/// not.
pub struct HttpIdentityGate {
    base_url: String,
    client: Mutex<Option<reqwest::Client>>,
}

impl HttpIdentityGate {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: Mutex::new(None),
        }
    }

    /// Build the underlying client. A no-op when already connected.
    pub fn connect(&self) -> Result<(), IdentityClientError> {
        let mut slot = self
            .client
            .lock()
            .map_err(|_| IdentityClientError::Build("client lock poisoned".to_string()))?;

        if slot.is_some() {
            return Ok(());
        }

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| IdentityClientError::Build(e.to_string()))?;

        *slot = Some(client);
        Ok(())
    }

    /// Release the client if present. Safe to call repeatedly.
    pub fn close(&self) {
        if let Ok(mut slot) = self.client.lock() {
            slot.take();
        }
    }

    fn current_client(&self) -> Option<reqwest::Client> {
        self.client.lock().ok().and_then(|slot| slot.clone())
    }

    async fn try_validate(&self, token: &str) -> Option<AuthResult> {
        let client = match self.current_client() {
            Some(client) => client,
            None => {
                debug!("validate_token called before connect; denying");
                return None;
            }
        };

        let response = client
            .post(format!("{}/validate", self.base_url))
            .json(&ValidateRequest { token })
            .send()
            .await
            .ok()?
            .error_for_status()
            .ok()?;

        let verdict: ValidateResponse = response.json().await.ok()?;

        if !verdict.is_valid {
            return Some(AuthResult::invalid());
        }

        Some(AuthResult::valid(flatten_claims(verdict.user)))
    }
}

/// Flatten the service's JSON claim values into strings.
///
/// Scalars keep their literal form (`true` becomes `"true"`, `7` becomes
/// `"7"`); strings are taken as-is; structured values are carried as their
/// compact JSON text.
fn flatten_claims(user: BTreeMap<String, serde_json::Value>) -> BTreeMap<String, String> {
    user.into_iter()
        .map(|(key, value)| {
            let flat = match value {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            (key, flat)
        })
        .collect()
}

#[async_trait]
impl IdentityGate for HttpIdentityGate {
    async fn validate_token(&self, token: &str) -> AuthResult {
        match self.try_validate(token).await {
            Some(verdict) => verdict,
            None => {
                debug!("identity service unavailable; failing closed");
                AuthResult::invalid()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn claims_flatten_scalars_to_literal_strings() {
        let user = BTreeMap::from([
            ("id".to_string(), json!(7)),
            ("is_active".to_string(), json!(true)),
            ("email".to_string(), json!("a@b.example")),
        ]);

        let claims = flatten_claims(user);
        assert_eq!(claims.get("id").map(String::as_str), Some("7"));
        assert_eq!(claims.get("is_active").map(String::as_str), Some("true"));
        assert_eq!(claims.get("email").map(String::as_str), Some("a@b.example"));
    }

    #[tokio::test]
    async fn unreachable_service_fails_closed() {
        // Port 1 is never listening locally; the request is refused fast.
        let gate = HttpIdentityGate::new("http://127.0.0.1:1");
        gate.connect().unwrap();

        let verdict = gate.validate_token("some-token").await;
        assert_eq!(verdict, AuthResult::invalid());
    }

    #[tokio::test]
    async fn validate_before_connect_denies_instead_of_erroring() {
        let gate = HttpIdentityGate::new("http://127.0.0.1:1");

        let verdict = gate.validate_token("some-token").await;
        assert!(!verdict.is_valid);
    }

    #[test]
    fn connect_is_idempotent() {
        let gate = HttpIdentityGate::new("http://127.0.0.1:1");
        gate.connect().unwrap();
        gate.connect().unwrap();
        gate.close();
        gate.close();
    }
}
