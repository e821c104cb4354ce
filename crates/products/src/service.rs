//! Product lifecycle manager.
//!
//! The orchestrator behind the boundary layer: it enforces ownership,
//! applies mutations against the store, and decides when a domain event
//! must fire.
//!
//! ## Store commit vs. event publish
//!
//! For a single request, the store mutation always commits *before* the
//! corresponding event is constructed and published. Publish failures are
//! logged and absorbed: there is no outbox and no rollback, so a successful
//! mutation reads as success to the caller even if its event never reaches
//! the bus. Only the store mutation is durable.
//!
//! ## Ownership masking
//!
//! An update or delete by a non-owner fails with the same `NotFound` as a
//! missing row; the two cases are observationally indistinguishable to
//! callers.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use shopkeep_core::{DomainError, DomainResult, Price, ProductId, UserId};
use shopkeep_events::{DomainEvent, EventPublisher};

use crate::product::{NewProduct, Product, ProductPatch};
use crate::store::{ProductStore, StoreError};

/// Routing key announced when a product is created.
pub const PRODUCT_CREATED: &str = "product.created";

/// Routing key announced when a product's price changes.
pub const PRODUCT_PRICE_CHANGED: &str = "product.price_changed";

/// Product lifecycle manager.
///
/// Holds shared handles to the store and the publisher; many in-flight
/// requests borrow the same instance concurrently.
#[derive(Debug, Clone)]
pub struct ProductService<S, P> {
    store: S,
    publisher: P,
}

impl<S, P> ProductService<S, P>
where
    S: ProductStore,
    P: EventPublisher,
{
    pub fn new(store: S, publisher: P) -> Self {
        Self { store, publisher }
    }

    pub async fn get_by_id(&self, id: ProductId) -> DomainResult<Product> {
        match self.store.get(id).await {
            Ok(product) => Ok(product),
            Err(StoreError::NotFound) => {
                debug!(product_id = %id, "product not found");
                Err(DomainError::NotFound)
            }
            Err(StoreError::Backend(msg)) => Err(DomainError::store(msg)),
        }
    }

    pub async fn list_all(&self) -> DomainResult<Vec<Product>> {
        self.store.list_all().await.map_err(store_failure)
    }

    /// Create a product owned by `owner_id` and announce it.
    ///
    /// The `product.created` event is built only after the insert commits.
    /// If publishing fails, the creation stands and the product is returned.
    pub async fn create(&self, new: NewProduct, owner_id: UserId) -> DomainResult<Product> {
        let product = self
            .store
            .insert(new, owner_id)
            .await
            .map_err(store_failure)?;

        info!(product_id = %product.id, name = %product.name, "created product");

        match self.publisher.publish(created_event(&product)).await {
            Ok(()) => {
                info!(product_id = %product.id, "published product.created");
            }
            Err(err) => {
                warn!(
                    product_id = %product.id,
                    error = %err,
                    "failed to publish product.created; creation stands"
                );
            }
        }

        Ok(product)
    }

    /// Apply a partial update on behalf of `caller_id`.
    ///
    /// Emits `product.price_changed` if and only if the patch carried a
    /// price and the persisted price differs from the previous one under
    /// exact decimal comparison.
    pub async fn update(
        &self,
        id: ProductId,
        patch: ProductPatch,
        caller_id: UserId,
    ) -> DomainResult<Product> {
        let mut product = self.get_by_id(id).await?;
        let previous_price = product.price;

        if product.owner_id != caller_id {
            debug!(product_id = %id, caller = %caller_id, "non-owner update masked as not found");
            return Err(DomainError::NotFound);
        }

        let price_patched = patch.price.is_some();
        product.apply_patch(&patch)?;

        let product = self.store.update(product).await.map_err(store_failure)?;
        info!(product_id = %product.id, name = %product.name, "updated product");

        if price_patched && product.price != previous_price {
            let event = price_changed_event(&product, previous_price);
            if let Err(err) = self.publisher.publish(event).await {
                warn!(
                    product_id = %product.id,
                    error = %err,
                    "failed to publish product.price_changed; update stands"
                );
            }
        }

        Ok(product)
    }

    /// Delete a product on behalf of `caller_id`. Deletion is silent — no
    /// event is announced.
    pub async fn delete(&self, id: ProductId, caller_id: UserId) -> DomainResult<()> {
        let product = self.get_by_id(id).await?;

        if product.owner_id != caller_id {
            debug!(product_id = %id, caller = %caller_id, "non-owner delete masked as not found");
            return Err(DomainError::NotFound);
        }

        match self.store.delete(id).await {
            Ok(()) => {
                info!(product_id = %id, name = %product.name, "deleted product");
                Ok(())
            }
            Err(StoreError::NotFound) => Err(DomainError::NotFound),
            Err(StoreError::Backend(msg)) => Err(DomainError::store(msg)),
        }
    }
}

fn store_failure(err: StoreError) -> DomainError {
    match err {
        StoreError::NotFound => DomainError::NotFound,
        StoreError::Backend(msg) => DomainError::store(msg),
    }
}

fn created_event(product: &Product) -> DomainEvent {
    let mut payload = BTreeMap::new();
    payload.insert("id".to_string(), product.id.to_string());
    payload.insert("name".to_string(), product.name.clone());
    payload.insert("description".to_string(), product.description.clone());
    payload.insert("price".to_string(), product.price.to_wire());
    payload.insert("owner_id".to_string(), product.owner_id.to_string());

    DomainEvent::new(PRODUCT_CREATED, payload)
}

fn price_changed_event(product: &Product, previous: Price) -> DomainEvent {
    let mut payload = BTreeMap::new();
    payload.insert("id".to_string(), product.id.to_string());
    payload.insert("owner_id".to_string(), product.owner_id.to_string());
    payload.insert("previous_price".to_string(), previous.to_wire());
    payload.insert("new_price".to_string(), product.price.to_wire());

    DomainEvent::new(PRODUCT_PRICE_CHANGED, payload)
}
