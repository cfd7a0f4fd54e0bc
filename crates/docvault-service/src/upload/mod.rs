//! Upload confirmation workflow.

pub mod service;

pub use service::{ConfirmUpload, UploadService};
