//! `shopkeep-infra` — concrete external connections and process wiring.
//!
//! Everything here touches the outside world: the AMQP broker client, the
//! HTTP identity client, the connection supervisor that makes broker
//! startup resilient, and the `AppContext` that wires the process together.

pub mod amqp;
pub mod bootstrap;
pub mod config;
pub mod identity;
pub mod supervisor;

pub use amqp::{AmqpEventPublisher, BrokerError, PRODUCT_EVENTS_EXCHANGE};
pub use bootstrap::AppContext;
pub use config::Config;
pub use identity::HttpIdentityGate;
pub use supervisor::{connect_with_retry, RetryClass, RetryPolicy, SupervisorError};
