//! Audit events emitted by DocVault operations.
//!
//! Every policy grant decision and every version creation or deletion
//! produces one [`AuditEvent`]. Events are handed to an
//! [`AuditSink`](crate::traits::AuditSink) on a fire-and-forget basis.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventKind {
    /// A new document version was recorded.
    VersionCreated,
    /// A single document version was removed.
    VersionDeleted,
    /// All versions of a document were removed in a cascade.
    VersionsPurged,
    /// An access policy was granted.
    PolicyGranted,
    /// An access policy was modified.
    PolicyUpdated,
    /// An access policy was revoked.
    PolicyRevoked,
    /// An access check was answered.
    AccessChecked,
    /// A download token was issued.
    TokenIssued,
    /// A download token was redeemed.
    TokenConsumed,
    /// A document was soft-deleted.
    DocumentDeleted,
}

impl AuditEventKind {
    /// Stable storage name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VersionCreated => "version_created",
            Self::VersionDeleted => "version_deleted",
            Self::VersionsPurged => "versions_purged",
            Self::PolicyGranted => "policy_granted",
            Self::PolicyUpdated => "policy_updated",
            Self::PolicyRevoked => "policy_revoked",
            Self::AccessChecked => "access_checked",
            Self::TokenIssued => "token_issued",
            Self::TokenConsumed => "token_consumed",
            Self::DocumentDeleted => "document_deleted",
        }
    }
}

impl std::fmt::Display for AuditEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether the audited operation went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditOutcome {
    /// The operation succeeded or access was allowed.
    Success,
    /// Access was denied or the operation was refused.
    Denied,
    /// The operation failed.
    Failure,
}

impl AuditOutcome {
    /// Stable storage name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Denied => "denied",
            Self::Failure => "failure",
        }
    }
}

impl std::fmt::Display for AuditOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One audit record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// What happened.
    pub kind: AuditEventKind,
    /// Who did it (a user id, or `None` for system maintenance).
    pub subject_id: Option<Uuid>,
    /// What it was done to.
    pub resource_id: Option<Uuid>,
    /// How it ended.
    pub outcome: AuditOutcome,
    /// Free-form structured detail.
    pub detail: serde_json::Value,
    /// When it happened.
    pub occurred_at: DateTime<Utc>,
}

impl AuditEvent {
    /// Build an event stamped with the current time.
    pub fn new(
        kind: AuditEventKind,
        subject_id: Option<Uuid>,
        resource_id: Option<Uuid>,
        outcome: AuditOutcome,
        detail: serde_json::Value,
    ) -> Self {
        Self {
            kind,
            subject_id,
            resource_id,
            outcome,
            detail,
            occurred_at: Utc::now(),
        }
    }
}
