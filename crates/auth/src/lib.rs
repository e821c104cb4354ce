//! `shopkeep-auth` — identity verification boundary.
//!
//! This crate is intentionally decoupled from transports and storage: it
//! defines the fail-closed verdict model, the gate capability trait, and the
//! derived checks the request boundary performs on a verdict.

pub mod boundary;
pub mod claims;
pub mod gate;

pub use boundary::{authenticate, authenticate_active, AuthError, CallerIdentity};
pub use claims::AuthResult;
pub use gate::IdentityGate;
