//! # docvault-core
//!
//! Core crate for DocVault. Contains the unified error system, configuration
//! schemas, typed identifiers, and the audit contract that every other crate
//! emits through.
//!
//! This crate has **no** internal dependencies on other DocVault crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ConflictKind, ErrorKind};
pub use result::AppResult;
