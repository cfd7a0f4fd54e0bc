//! Audit logger that never blocks or fails the audited operation.

use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use docvault_core::events::{AuditEvent, AuditEventKind, AuditOutcome};
use docvault_core::traits::AuditSink;

/// Hands audit events to a sink on a background task.
///
/// Sink failures are logged and dropped.
#[derive(Debug, Clone)]
pub struct AuditLogger {
    /// Destination for events.
    sink: Arc<dyn AuditSink>,
}

impl AuditLogger {
    /// Creates a new audit logger.
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        Self { sink }
    }

    /// Record an event without waiting for the write.
    pub fn log_event(
        &self,
        kind: AuditEventKind,
        subject_id: Option<Uuid>,
        resource_id: Option<Uuid>,
        outcome: AuditOutcome,
        detail: serde_json::Value,
    ) {
        self.dispatch(AuditEvent::new(kind, subject_id, resource_id, outcome, detail));
    }

    /// Record a prepared event without waiting for the write.
    pub fn dispatch(&self, event: AuditEvent) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!(kind = %event.kind, "No async runtime available, audit event dropped");
            return;
        };

        let sink = Arc::clone(&self.sink);
        handle.spawn(async move {
            let kind = event.kind;
            match sink.log_event(event).await {
                Ok(()) => debug!(kind = %kind, "Audit event recorded"),
                Err(e) => warn!(kind = %kind, error = %e, "Failed to record audit event"),
            }
        });
    }
}
