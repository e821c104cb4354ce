//! `shopkeep-products` — the owned-product catalog.
//!
//! Three layers live here:
//!
//! - the [`Product`] entity and its creation/patch payloads,
//! - the abstract [`ProductStore`] contract (plus an in-memory
//!   implementation standing in for the out-of-scope relational mapping),
//! - the [`ProductService`] lifecycle manager, which enforces ownership and
//!   decides when a domain event must fire.

pub mod product;
pub mod service;
pub mod store;

pub use product::{NewProduct, Product, ProductPatch};
pub use service::{ProductService, PRODUCT_CREATED, PRODUCT_PRICE_CHANGED};
pub use store::{InMemoryProductStore, ProductStore, StoreError};
