//! # docvault-database
//!
//! Persistence for DocVault. The [`store`] module defines the contracts the
//! services depend on. [`repositories`] implements them over PostgreSQL and
//! [`memory`] implements them in process for tests and single-node use.
//!
//! Uniqueness rules (version numbers per document, global checksums, token
//! strings) are enforced here, never by read-then-write in callers.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::{DatabasePool, Repositories, SchemaReport};
pub use store::{DocumentStore, PolicyStore, TokenStore, VersionStore};
