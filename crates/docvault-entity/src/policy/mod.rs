//! Access policy entities and the evaluation inputs they apply to.

pub mod action;
pub mod model;
pub mod subject;
pub mod validation;

pub use action::{ActionSet, PolicyAction};
pub use model::{AccessPolicy, NewAccessPolicy, ResourceType, SubjectType, UpdateAccessPolicy};
pub use subject::{Resource, Subject};
