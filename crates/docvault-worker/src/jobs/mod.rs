//! Built-in maintenance jobs.

pub mod token_cleanup;

pub use token_cleanup::TokenCleanupJob;
