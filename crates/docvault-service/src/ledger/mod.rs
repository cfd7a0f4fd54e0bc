//! Document version ledger.

pub mod service;

pub use service::LedgerService;
