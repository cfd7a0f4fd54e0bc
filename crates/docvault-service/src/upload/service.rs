//! Upload confirmation: records a stored blob as the next document version.
//!
//! The bytes are already in the storage backend when this runs; the caller
//! reports where they landed and what they hash to.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use docvault_core::error::{AppError, ConflictKind};
use docvault_core::result::AppResult;
use docvault_core::types::id::DocumentId;
use docvault_entity::policy::PolicyAction;
use docvault_entity::version::validation::normalize_checksum;
use docvault_entity::version::{DocumentVersion, NewDocumentVersion};

use crate::access::AccessGuard;
use crate::context::RequestContext;
use crate::ledger::LedgerService;

/// What the client reports after finishing an upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmUpload {
    /// Original file name.
    pub filename: String,
    /// MIME type.
    pub mime_type: String,
    /// Size in bytes.
    pub size: i64,
    /// Key in the storage backend.
    pub storage_key: String,
    /// Storage backend name.
    pub storage_provider: String,
    /// SHA-256 hex digest of the content.
    pub checksum: Option<String>,
    /// Free-form labels.
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    /// Free-form JSON object.
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

/// Turns confirmed uploads into ledger entries.
#[derive(Debug, Clone)]
pub struct UploadService {
    /// Authorization guard.
    guard: AccessGuard,
    /// Version ledger.
    ledger: Arc<LedgerService>,
}

impl UploadService {
    /// Creates a new upload service.
    pub fn new(guard: AccessGuard, ledger: Arc<LedgerService>) -> Self {
        Self { guard, ledger }
    }

    /// Record an upload as the next version of `document_id`.
    ///
    /// Requires `write` on the document. Content already recorded anywhere
    /// in the ledger is rejected with a checksum conflict.
    pub async fn confirm_upload(
        &self,
        ctx: &RequestContext,
        document_id: DocumentId,
        upload: ConfirmUpload,
    ) -> AppResult<DocumentVersion> {
        let document = self.guard.load_live_document(document_id).await?;
        self.guard
            .authorize(ctx, &document, PolicyAction::Write)
            .await?;

        let checksum = upload
            .checksum
            .as_deref()
            .map(normalize_checksum)
            .transpose()?;
        if let Some(sum) = checksum.as_deref() {
            if let Some(existing) = self.ledger.find_by_checksum(sum).await? {
                return Err(AppError::conflict(
                    ConflictKind::Checksum,
                    format!(
                        "Content already stored as version {} of document {}",
                        existing.version, existing.document_id
                    ),
                ));
            }
        }

        let version = self
            .ledger
            .create(NewDocumentVersion {
                document_id,
                version: None,
                filename: upload.filename,
                mime_type: upload.mime_type,
                size: upload.size,
                storage_key: upload.storage_key,
                storage_provider: upload.storage_provider,
                checksum,
                tags: upload.tags,
                metadata: upload.metadata,
                uploaded_by: ctx.user_id,
            })
            .await?;

        info!(
            user_id = %ctx.user_id,
            document_id = %document_id,
            version = version.version,
            "Upload confirmed"
        );
        Ok(version)
    }
}
