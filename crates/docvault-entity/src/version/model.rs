//! Document version entity model.

use chrono::{DateTime, Utc};
use docvault_core::types::id::{DocumentId, UserId, VersionId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One immutable, numbered snapshot of a document's content.
///
/// Rows are only ever inserted or deleted, never updated.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DocumentVersion {
    /// Unique version identifier.
    pub id: VersionId,
    /// The document this version belongs to.
    pub document_id: DocumentId,
    /// Sequential version number, starting at 1.
    pub version: i32,
    /// Original filename.
    pub filename: String,
    /// MIME type (`type/subtype`).
    pub mime_type: String,
    /// Size in bytes.
    pub size: i64,
    /// Opaque locator of the bytes in object storage.
    pub storage_key: String,
    /// Which storage backend holds the bytes.
    pub storage_provider: String,
    /// Lowercase SHA-256 hex digest, unique across the system.
    pub checksum: Option<String>,
    /// Normalized tags.
    pub tags: Option<Vec<String>>,
    /// Free-form metadata.
    pub metadata: Option<serde_json::Value>,
    /// User who uploaded this version.
    pub uploaded_by: UserId,
    /// When this version was recorded.
    pub created_at: DateTime<Utc>,
}

/// Data required to record a new document version.
///
/// `version` is `None` when the ledger should assign the next number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDocumentVersion {
    /// The document receiving the version.
    pub document_id: DocumentId,
    /// Explicit version number, or `None` to auto-assign.
    pub version: Option<i32>,
    /// Original filename.
    pub filename: String,
    /// MIME type.
    pub mime_type: String,
    /// Size in bytes.
    pub size: i64,
    /// Object storage locator.
    pub storage_key: String,
    /// Storage backend tag.
    pub storage_provider: String,
    /// SHA-256 hex digest, if known.
    pub checksum: Option<String>,
    /// Tags, normalized on create.
    pub tags: Option<Vec<String>>,
    /// Free-form metadata.
    pub metadata: Option<serde_json::Value>,
    /// Uploader.
    pub uploaded_by: UserId,
}

impl NewDocumentVersion {
    /// Materialize a row with the given id, number, and timestamp.
    pub fn into_version(self, id: VersionId, version: i32, created_at: DateTime<Utc>) -> DocumentVersion {
        DocumentVersion {
            id,
            document_id: self.document_id,
            version,
            filename: self.filename,
            mime_type: self.mime_type,
            size: self.size,
            storage_key: self.storage_key,
            storage_provider: self.storage_provider,
            checksum: self.checksum,
            tags: self.tags,
            metadata: self.metadata,
            uploaded_by: self.uploaded_by,
            created_at,
        }
    }
}
