//! Download token string generation.

pub mod generator;

pub use generator::TokenGenerator;
