//! Audit sink trait for pluggable audit persistence.

use async_trait::async_trait;

use crate::events::AuditEvent;
use crate::result::AppResult;

/// Destination for audit events (database table, in-memory buffer).
///
/// Callers never let a sink failure roll back the operation being audited.
#[async_trait]
pub trait AuditSink: Send + Sync + std::fmt::Debug + 'static {
    /// Persist one event.
    async fn log_event(&self, event: AuditEvent) -> AppResult<()>;
}
