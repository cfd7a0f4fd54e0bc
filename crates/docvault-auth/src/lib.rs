//! # docvault-auth
//!
//! Authorization primitives for DocVault.
//!
//! ## Modules
//!
//! - `policy` — pure access policy evaluation with grantor reporting
//! - `token` — cryptographically random, URL-safe download token strings

pub mod policy;
pub mod token;

pub use policy::{AccessDecision, DecisionSource, PolicyEngine};
pub use token::TokenGenerator;
