//! # docvault-entity
//!
//! Domain entity models for DocVault. Every struct in this crate
//! represents a database table row or a domain value object. All entities
//! derive `Debug`, `Clone`, `Serialize`, `Deserialize`, and database
//! entities additionally derive `sqlx::FromRow`.
//!
//! Input validation lives next to the type it guards, as plain functions
//! returning [`AppResult`](docvault_core::AppResult).

pub mod audit;
pub mod document;
pub mod policy;
pub mod token;
pub mod version;
