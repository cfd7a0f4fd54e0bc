//! Authorization guard and grant/revoke/check workflows.

pub mod guard;
pub mod service;

pub use guard::AccessGuard;
pub use service::AccessService;
