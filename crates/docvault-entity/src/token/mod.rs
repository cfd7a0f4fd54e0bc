//! Download token entities.

pub mod model;
pub mod validation;

pub use model::{DownloadToken, NewDownloadToken, TokenState};
