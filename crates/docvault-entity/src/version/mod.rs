//! Document version entities.

pub mod model;
pub mod stats;
pub mod validation;

pub use model::{DocumentVersion, NewDocumentVersion};
pub use stats::VersionStats;
