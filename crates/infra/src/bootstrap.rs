//! Process startup wiring.
//!
//! Both external clients are constructed exactly once here and shared by
//! reference across every request for the life of the process. Requests
//! borrow them; only shutdown closes them.

use std::sync::Arc;

use anyhow::Context as _;
use tracing::info;

use shopkeep_products::{InMemoryProductStore, ProductService};

use crate::amqp::AmqpEventPublisher;
use crate::config::Config;
use crate::identity::HttpIdentityGate;
use crate::supervisor::{connect_with_retry, RetryPolicy};

/// Everything a request handler borrows: the identity gate, the event
/// publisher, and the product lifecycle manager wired over both.
pub struct AppContext {
    pub identity: Arc<HttpIdentityGate>,
    pub publisher: Arc<AmqpEventPublisher>,
    pub products: ProductService<Arc<InMemoryProductStore>, Arc<AmqpEventPublisher>>,
}

impl AppContext {
    /// Bring the process up.
    ///
    /// The identity gate connects lazily with no retry loop; the broker
    /// connection goes through the supervisor and is fatal to startup once
    /// its attempts are exhausted.
    pub async fn start(config: Config) -> anyhow::Result<Self> {
        let identity = Arc::new(HttpIdentityGate::new(config.identity_url));
        identity
            .connect()
            .context("failed to initialize identity client")?;

        let publisher = Arc::new(AmqpEventPublisher::new(config.amqp_url));
        connect_with_retry(&RetryPolicy::default(), || publisher.connect())
            .await
            .context("failed to establish broker connection")?;

        let store = Arc::new(InMemoryProductStore::new());
        let products = ProductService::new(store, Arc::clone(&publisher));

        info!("application context ready");
        Ok(Self {
            identity,
            publisher,
            products,
        })
    }

    /// Tear down both shared connections. Idempotent.
    pub async fn shutdown(&self) -> anyhow::Result<()> {
        self.publisher
            .close()
            .await
            .context("failed to close broker connection")?;
        self.identity.close();
        info!("application context shut down");
        Ok(())
    }
}
