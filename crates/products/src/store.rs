//! Abstract product store contract plus an in-memory implementation.
//!
//! The relational mapping (tables, migrations) is outside this repository;
//! any transactional store with commit semantics satisfies this trait. Each
//! call commits before returning, so callers can rely on "returned means
//! durable".

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;

use shopkeep_core::{ProductId, UserId};

use crate::product::{NewProduct, Product};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No row with the requested id.
    #[error("product not found")]
    NotFound,

    /// The backend failed (connection, transaction, lock).
    #[error("store backend failure: {0}")]
    Backend(String),
}

/// Transactional product store.
///
/// Implementations own timestamp maintenance: `insert` sets `created_at`
/// and `updated_at` to the same instant, `update` refreshes `updated_at`.
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn get(&self, id: ProductId) -> Result<Product, StoreError>;

    /// All rows. Iteration order carries no meaning for callers.
    async fn list_all(&self) -> Result<Vec<Product>, StoreError>;

    /// Persist a new row, assigning its id and timestamps.
    async fn insert(&self, new: NewProduct, owner_id: UserId) -> Result<Product, StoreError>;

    /// Persist the given row over the existing one with the same id.
    async fn update(&self, product: Product) -> Result<Product, StoreError>;

    async fn delete(&self, id: ProductId) -> Result<(), StoreError>;
}

#[async_trait]
impl<S> ProductStore for Arc<S>
where
    S: ProductStore + ?Sized,
{
    async fn get(&self, id: ProductId) -> Result<Product, StoreError> {
        (**self).get(id).await
    }

    async fn list_all(&self) -> Result<Vec<Product>, StoreError> {
        (**self).list_all().await
    }

    async fn insert(&self, new: NewProduct, owner_id: UserId) -> Result<Product, StoreError> {
        (**self).insert(new, owner_id).await
    }

    async fn update(&self, product: Product) -> Result<Product, StoreError> {
        (**self).update(product).await
    }

    async fn delete(&self, id: ProductId) -> Result<(), StoreError> {
        (**self).delete(id).await
    }
}

#[derive(Debug, Default)]
struct Rows {
    by_id: BTreeMap<i64, Product>,
    next_id: i64,
}

/// Mutex-guarded in-memory store (tests/dev).
///
/// Ids are assigned from a monotonically increasing counter, mirroring an
/// autoincrement primary key.
#[derive(Debug, Default)]
pub struct InMemoryProductStore {
    rows: Mutex<Rows>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn locked(&self) -> Result<std::sync::MutexGuard<'_, Rows>, StoreError> {
        self.rows
            .lock()
            .map_err(|_| StoreError::Backend("store lock poisoned".to_string()))
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn get(&self, id: ProductId) -> Result<Product, StoreError> {
        let rows = self.locked()?;
        rows.by_id.get(&id.as_i64()).cloned().ok_or(StoreError::NotFound)
    }

    async fn list_all(&self) -> Result<Vec<Product>, StoreError> {
        let rows = self.locked()?;
        Ok(rows.by_id.values().cloned().collect())
    }

    async fn insert(&self, new: NewProduct, owner_id: UserId) -> Result<Product, StoreError> {
        let mut rows = self.locked()?;
        rows.next_id += 1;

        let now = Utc::now();
        let product = Product {
            id: ProductId::new(rows.next_id),
            name: new.name,
            description: new.description,
            price: new.price,
            quantity: new.quantity,
            owner_id,
            created_at: now,
            updated_at: now,
        };

        rows.by_id.insert(product.id.as_i64(), product.clone());
        Ok(product)
    }

    async fn update(&self, mut product: Product) -> Result<Product, StoreError> {
        let mut rows = self.locked()?;

        if !rows.by_id.contains_key(&product.id.as_i64()) {
            return Err(StoreError::NotFound);
        }

        product.updated_at = Utc::now();
        rows.by_id.insert(product.id.as_i64(), product.clone());
        Ok(product)
    }

    async fn delete(&self, id: ProductId) -> Result<(), StoreError> {
        let mut rows = self.locked()?;
        rows.by_id
            .remove(&id.as_i64())
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}
