//! Event publishing abstraction.
//!
//! The publisher is **fire-and-forget**: callers learn whether the publish
//! call itself succeeded, nothing more. There is no retry, no outbox, and no
//! delivery confirmation beyond what the transport's persistent delivery
//! mode implies. Events are published only after the corresponding store
//! mutation has committed, so a lost event never implies lost state.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::event::DomainEvent;

/// Failure of a single publish call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PublishError {
    /// The publisher has no live broker connection.
    #[error("publisher is not connected")]
    NotConnected,

    /// The payload could not be serialized for the wire.
    #[error("failed to serialize event payload: {0}")]
    Serialize(String),

    /// The broker rejected or failed the publish call.
    #[error("broker publish failed: {0}")]
    Broker(String),
}

/// Transport-agnostic event publisher.
///
/// Implementations must be safe to call from many in-flight requests at
/// once; any transport-level serialization is the implementation's problem,
/// not the caller's.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: DomainEvent) -> Result<(), PublishError>;
}

#[async_trait]
impl<P> EventPublisher for Arc<P>
where
    P: EventPublisher + ?Sized,
{
    async fn publish(&self, event: DomainEvent) -> Result<(), PublishError> {
        (**self).publish(event).await
    }
}
