//! Access policy evaluation.

pub mod engine;

pub use engine::{AccessDecision, DecisionSource, PolicyEngine};
