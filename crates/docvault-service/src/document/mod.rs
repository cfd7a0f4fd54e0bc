//! Document lifecycle workflow.

pub mod service;

pub use service::{DeletionSummary, DocumentService};
