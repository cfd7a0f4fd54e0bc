//! # docvault-service
//!
//! Business logic service layer for DocVault. The ledger and token services
//! own version numbering and token lifecycles; the workflow services
//! (upload, access, download, document) authorize callers and drive them.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references. [`Services::build`] wires the
//! whole graph from a [`StoreSet`].

pub mod access;
pub mod audit;
pub mod context;
pub mod document;
pub mod download;
pub mod ledger;
pub mod registry;
pub mod token;
pub mod upload;

pub use access::{AccessGuard, AccessService};
pub use audit::AuditLogger;
pub use context::RequestContext;
pub use document::{DeletionSummary, DocumentService};
pub use download::{DownloadGrant, DownloadService};
pub use ledger::LedgerService;
pub use registry::{Services, StoreSet};
pub use token::TokenService;
pub use upload::{ConfirmUpload, UploadService};

#[cfg(test)]
pub(crate) mod testing;
