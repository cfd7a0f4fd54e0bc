//! PostgreSQL implementations of the DocVault stores.

pub mod audit;
pub mod document;
pub mod policy;
pub mod token;
pub mod version;

pub use audit::AuditLogRepository;
pub use document::DocumentRepository;
pub use policy::PolicyRepository;
pub use token::TokenRepository;
pub use version::VersionRepository;
