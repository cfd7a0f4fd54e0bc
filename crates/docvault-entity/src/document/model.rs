//! Document record entity model.

use chrono::{DateTime, Utc};
use docvault_core::types::id::{DocumentId, UserId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A document header. Content lives in its versions.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DocumentRecord {
    /// Unique document identifier.
    pub id: DocumentId,
    /// Display title.
    pub title: String,
    /// Owning user.
    pub owner_id: UserId,
    /// Soft-deletion timestamp.
    pub deleted_at: Option<DateTime<Utc>>,
    /// When the document was created.
    pub created_at: DateTime<Utc>,
}

impl DocumentRecord {
    /// Whether the document has been soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Data required to register a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDocument {
    /// Caller-chosen id, or `None` to generate one.
    pub id: Option<DocumentId>,
    /// Display title.
    pub title: String,
    /// Owning user.
    pub owner_id: UserId,
}
