//! Persistence contracts used by the DocVault services.
//!
//! Each trait has a PostgreSQL implementation in
//! [`repositories`](crate::repositories) and an in-process implementation in
//! [`memory`](crate::memory).

pub mod document;
pub mod policy;
pub mod token;
pub mod version;

pub use document::DocumentStore;
pub use policy::PolicyStore;
pub use token::TokenStore;
pub use version::VersionStore;
