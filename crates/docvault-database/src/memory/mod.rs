//! In-process store implementations.
//!
//! Suitable for tests and single-node development. Each store enforces the
//! same uniqueness and conditional-write rules as its PostgreSQL counterpart.

pub mod audit;
pub mod document;
pub mod policy;
pub mod token;
pub mod version;

pub use audit::MemoryAuditSink;
pub use document::MemoryDocumentStore;
pub use policy::MemoryPolicyStore;
pub use token::MemoryTokenStore;
pub use version::MemoryVersionStore;
