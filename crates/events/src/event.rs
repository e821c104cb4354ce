//! Domain event value.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A fact to announce on the message bus.
///
/// Events are ephemeral: constructed after a successful store commit,
/// published once, and discarded. They are never persisted or retried here.
///
/// Payload values are strings on purpose — numeric fields are carried as
/// decimal-preserving strings so precision never drifts across the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Unique event identifier (UUIDv7, time-ordered).
    pub event_id: Uuid,

    /// Topic routing key (e.g. `product.created`).
    pub routing_key: String,

    /// Flat string payload, serialized to JSON at the broker boundary.
    pub payload: BTreeMap<String, String>,

    /// When the event was constructed.
    pub occurred_at: DateTime<Utc>,
}

impl DomainEvent {
    pub fn new(routing_key: impl Into<String>, payload: BTreeMap<String, String>) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            routing_key: routing_key.into(),
            payload,
            occurred_at: Utc::now(),
        }
    }

    /// Look up a payload field by name.
    pub fn field(&self, key: &str) -> Option<&str> {
        self.payload.get(key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_lookup_returns_payload_values() {
        let mut payload = BTreeMap::new();
        payload.insert("id".to_string(), "1".to_string());

        let event = DomainEvent::new("product.created", payload);
        assert_eq!(event.routing_key, "product.created");
        assert_eq!(event.field("id"), Some("1"));
        assert_eq!(event.field("missing"), None);
    }
}
