//! Download request and redemption workflow.

pub mod service;

pub use service::{DownloadGrant, DownloadService};
