//! Scheduled maintenance for DocVault.
//!
//! This crate provides:
//! - A cron scheduler that owns the maintenance timetable
//! - Job implementations the scheduler (or the CLI) runs

pub mod jobs;
pub mod scheduler;

pub use jobs::TokenCleanupJob;
pub use scheduler::MaintenanceScheduler;
