//! AMQP event publisher (lapin).
//!
//! One connection and one channel per process, shared by every in-flight
//! request. The exchange is declared durable and topic-typed at connect
//! time; messages go out persistent with a JSON body. Reconnection is the
//! supervisor's concern, not this client's.

use async_trait::async_trait;
use lapin::options::{BasicPublishOptions, ExchangeDeclareOptions};
use lapin::types::FieldTable;
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties, ExchangeKind};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};

use shopkeep_events::{DomainEvent, EventPublisher, PublishError};

use crate::supervisor::RetryClass;

/// Durable topic exchange all product events are routed through.
pub const PRODUCT_EVENTS_EXCHANGE: &str = "product_events";

/// Persistent delivery mode (survives a broker restart).
const DELIVERY_MODE_PERSISTENT: u8 = 2;

/// Upper bound on a single connection attempt. The underlying protocol has
/// no intrinsic deadline; leaving this unbounded would hang startup on a
/// black-holed broker address.
const CONNECT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum BrokerError {
    /// The broker could not be reached (refused, unroutable, timed out).
    #[error("broker unreachable: {0}")]
    Unreachable(String),

    /// Connected, but channel or exchange setup failed.
    #[error("broker setup failed: {0}")]
    Setup(String),
}

impl RetryClass for BrokerError {
    fn is_connection_error(&self) -> bool {
        matches!(self, Self::Unreachable(_))
    }
}

fn classify(err: lapin::Error) -> BrokerError {
    match err {
        lapin::Error::IOError(_) => BrokerError::Unreachable(err.to_string()),
        other => BrokerError::Setup(other.to_string()),
    }
}

struct Live {
    connection: Connection,
    channel: Channel,
}

/// Topic-exchange publisher over AMQP.
///
/// Routing-key-agnostic by design: the domain layer decides which keys
/// exist; this type only moves bytes.
pub struct AmqpEventPublisher {
    url: String,
    live: Mutex<Option<Live>>,
}

impl AmqpEventPublisher {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            live: Mutex::new(None),
        }
    }

    /// Establish the connection, open a channel, and declare the durable
    /// topic exchange. Calling this while already connected is a no-op.
    pub async fn connect(&self) -> Result<(), BrokerError> {
        let mut live = self.live.lock().await;
        if live.is_some() {
            return Ok(());
        }

        let connection = tokio::time::timeout(
            CONNECT_TIMEOUT,
            Connection::connect(&self.url, ConnectionProperties::default()),
        )
        .await
        .map_err(|_| BrokerError::Unreachable(format!("connect timed out after {CONNECT_TIMEOUT:?}")))?
        .map_err(classify)?;

        let channel = connection.create_channel().await.map_err(classify)?;

        channel
            .exchange_declare(
                PRODUCT_EVENTS_EXCHANGE,
                ExchangeKind::Topic,
                ExchangeDeclareOptions {
                    durable: true,
                    ..ExchangeDeclareOptions::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(classify)?;

        info!(exchange = PRODUCT_EVENTS_EXCHANGE, "connected to broker and declared exchange");
        *live = Some(Live { connection, channel });
        Ok(())
    }

    /// Release the connection if open. Safe to call repeatedly.
    pub async fn close(&self) -> Result<(), BrokerError> {
        let mut live = self.live.lock().await;
        if let Some(state) = live.take() {
            state
                .connection
                .close(200, "shutdown")
                .await
                .map_err(classify)?;
            debug!("broker connection closed");
        }
        Ok(())
    }

    async fn channel(&self) -> Option<Channel> {
        self.live.lock().await.as_ref().map(|l| l.channel.clone())
    }
}

#[async_trait]
impl EventPublisher for AmqpEventPublisher {
    async fn publish(&self, event: DomainEvent) -> Result<(), PublishError> {
        let Some(channel) = self.channel().await else {
            return Err(PublishError::NotConnected);
        };

        let body = serde_json::to_vec(&event.payload)
            .map_err(|e| PublishError::Serialize(e.to_string()))?;

        let properties = BasicProperties::default()
            .with_delivery_mode(DELIVERY_MODE_PERSISTENT)
            .with_content_type("application/json".into());

        channel
            .basic_publish(
                PRODUCT_EVENTS_EXCHANGE,
                &event.routing_key,
                BasicPublishOptions::default(),
                &body,
                properties,
            )
            .await
            .map_err(|e| PublishError::Broker(e.to_string()))?
            .await
            .map_err(|e| PublishError::Broker(e.to_string()))?;

        debug!(routing_key = %event.routing_key, "published event");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_failures_classify_as_connection_errors() {
        let err = classify(lapin::Error::IOError(std::sync::Arc::new(
            std::io::Error::from(std::io::ErrorKind::ConnectionRefused),
        )));
        assert!(err.is_connection_error());
    }

    #[test]
    fn protocol_failures_are_not_retried() {
        let err = classify(lapin::Error::ChannelsLimitReached);
        assert!(!err.is_connection_error());
    }

    #[tokio::test]
    async fn publish_without_a_connection_reports_not_connected() {
        let publisher = AmqpEventPublisher::new("amqp://localhost:5672");

        let err = publisher
            .publish(DomainEvent::new("product.created", Default::default()))
            .await
            .unwrap_err();

        assert_eq!(err, PublishError::NotConnected);
    }

    #[tokio::test]
    async fn close_without_a_connection_is_a_no_op() {
        let publisher = AmqpEventPublisher::new("amqp://localhost:5672");
        publisher.close().await.unwrap();
        publisher.close().await.unwrap();
    }
}
