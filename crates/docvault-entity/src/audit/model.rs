//! Audit log entry entity model.

use chrono::{DateTime, Utc};
use docvault_core::events::AuditEvent;
use docvault_core::types::id::AuditLogId;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An immutable audit log row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuditLogEntry {
    /// Unique audit entry identifier.
    pub id: AuditLogId,
    /// Event kind (e.g., `"version_created"`, `"policy_granted"`).
    pub kind: String,
    /// The acting subject, if any.
    pub subject_id: Option<Uuid>,
    /// The affected resource, if any.
    pub resource_id: Option<Uuid>,
    /// `"success"`, `"denied"`, or `"failure"`.
    pub outcome: String,
    /// Structured detail.
    pub detail: serde_json::Value,
    /// When the event occurred.
    pub created_at: DateTime<Utc>,
}

impl From<AuditEvent> for AuditLogEntry {
    fn from(event: AuditEvent) -> Self {
        Self {
            id: AuditLogId::new(),
            kind: event.kind.as_str().to_string(),
            subject_id: event.subject_id,
            resource_id: event.resource_id,
            outcome: event.outcome.as_str().to_string(),
            detail: event.detail,
            created_at: event.occurred_at,
        }
    }
}
