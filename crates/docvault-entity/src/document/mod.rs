//! Document directory entities.

pub mod model;

pub use model::{DocumentRecord, NewDocument};
