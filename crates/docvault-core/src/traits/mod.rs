//! Core traits defined in `docvault-core` and implemented by other crates.

pub mod audit;

pub use audit::AuditSink;
