//! `shopkeep-events` — domain event mechanics (mechanics only).
//!
//! This crate defines what an event *is* and how one is handed to a broker
//! client. It knows nothing about which events exist; event construction
//! belongs to the domain crates.

pub mod event;
pub mod in_memory;
pub mod publisher;

pub use event::DomainEvent;
pub use in_memory::InMemoryEventPublisher;
pub use publisher::{EventPublisher, PublishError};
