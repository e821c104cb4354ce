//! In-memory event publisher for tests/dev.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::event::DomainEvent;
use crate::publisher::{EventPublisher, PublishError};

/// In-memory publisher that records everything handed to it.
///
/// - No IO / no broker
/// - Can be primed to fail, to exercise publish-failure paths
#[derive(Debug, Default)]
pub struct InMemoryEventPublisher {
    published: Mutex<Vec<DomainEvent>>,
    forced_error: Mutex<Option<PublishError>>,
}

impl InMemoryEventPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `publish` call fail with `error`.
    pub fn fail_with(&self, error: PublishError) {
        if let Ok(mut slot) = self.forced_error.lock() {
            *slot = Some(error);
        }
    }

    /// Snapshot of everything published so far, in publish order.
    pub fn published(&self) -> Vec<DomainEvent> {
        self.published.lock().map(|p| p.clone()).unwrap_or_default()
    }

    /// Events published under a specific routing key.
    pub fn published_with_key(&self, routing_key: &str) -> Vec<DomainEvent> {
        self.published()
            .into_iter()
            .filter(|e| e.routing_key == routing_key)
            .collect()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventPublisher {
    async fn publish(&self, event: DomainEvent) -> Result<(), PublishError> {
        if let Ok(slot) = self.forced_error.lock() {
            if let Some(error) = slot.clone() {
                return Err(error);
            }
        }

        self.published
            .lock()
            .map_err(|_| PublishError::Broker("publisher lock poisoned".to_string()))?
            .push(event);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[tokio::test]
    async fn records_published_events_in_order() {
        let publisher = InMemoryEventPublisher::new();

        publisher
            .publish(DomainEvent::new("product.created", BTreeMap::new()))
            .await
            .unwrap();
        publisher
            .publish(DomainEvent::new("product.price_changed", BTreeMap::new()))
            .await
            .unwrap();

        let all = publisher.published();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].routing_key, "product.created");
        assert_eq!(publisher.published_with_key("product.price_changed").len(), 1);
    }

    #[tokio::test]
    async fn primed_failure_surfaces_and_records_nothing() {
        let publisher = InMemoryEventPublisher::new();
        publisher.fail_with(PublishError::Broker("simulated outage".to_string()));

        let err = publisher
            .publish(DomainEvent::new("product.created", BTreeMap::new()))
            .await
            .unwrap_err();

        assert!(matches!(err, PublishError::Broker(_)));
        assert!(publisher.published().is_empty());
    }
}
