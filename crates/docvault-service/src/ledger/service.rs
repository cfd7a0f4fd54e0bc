//! Version ledger service: numbering, checksum dedup, and history queries.
//!
//! Version numbers are `max + 1` per document. Two writers may compute the
//! same number; the store's unique `(document_id, version)` rule rejects the
//! loser, which re-reads the maximum and tries again a bounded number of times.
//! A duplicate checksum is terminal.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use docvault_core::config::LedgerConfig;
use docvault_core::error::{AppError, ConflictKind};
use docvault_core::events::{AuditEventKind, AuditOutcome};
use docvault_core::result::AppResult;
use docvault_core::types::id::{DocumentId, VersionId};
use docvault_database::store::VersionStore;
use docvault_entity::version::validation::{normalize_checksum, validate_new_version};
use docvault_entity::version::{DocumentVersion, NewDocumentVersion, VersionStats};

use crate::audit::AuditLogger;
use crate::context::RequestContext;

/// Owns version numbering and checksum deduplication.
#[derive(Debug, Clone)]
pub struct LedgerService {
    /// Version storage.
    versions: Arc<dyn VersionStore>,
    /// Audit logger.
    audit: AuditLogger,
    /// Validation limits and retry bound.
    config: LedgerConfig,
}

impl LedgerService {
    /// Creates a new ledger service.
    pub fn new(versions: Arc<dyn VersionStore>, audit: AuditLogger, config: LedgerConfig) -> Self {
        Self {
            versions,
            audit,
            config,
        }
    }

    /// Record a new version.
    ///
    /// Without an explicit number the next one is assigned, retrying on a lost
    /// numbering race up to `max_version_retries` times. An explicit number is
    /// never retried.
    pub async fn create(&self, input: NewDocumentVersion) -> AppResult<DocumentVersion> {
        let input = validate_new_version(input, &self.config)?;
        let explicit = input.version;
        if let Some(number) = explicit {
            self.ensure_ahead_of_history(input.document_id, number).await?;
        }
        let retries = if explicit.is_some() {
            0
        } else {
            self.config.max_version_retries
        };

        let mut attempt = 0;
        let created = loop {
            let number = match explicit {
                Some(number) => number,
                None => self.next_version_number(input.document_id).await?,
            };
            let row = input
                .clone()
                .into_version(VersionId::new(), number, Utc::now());

            match self.versions.insert(&row).await {
                Ok(created) => break created,
                Err(e) if e.is_conflict(ConflictKind::VersionNumber) && attempt < retries => {
                    attempt += 1;
                    warn!(
                        document_id = %input.document_id,
                        version = number,
                        attempt,
                        "Version number taken by a concurrent writer, retrying"
                    );
                }
                Err(e) => return Err(e),
            }
        };

        info!(
            document_id = %created.document_id,
            version_id = %created.id,
            version = created.version,
            size = created.size,
            "Document version created"
        );
        self.audit.log_event(
            AuditEventKind::VersionCreated,
            Some(created.uploaded_by.into_uuid()),
            Some(created.document_id.into_uuid()),
            AuditOutcome::Success,
            serde_json::json!({
                "version_id": created.id,
                "version": created.version,
                "checksum": created.checksum,
            }),
        );

        Ok(created)
    }

    /// The number `create` would assign next: `max + 1`, or 1 for a new document.
    pub async fn next_version_number(&self, document_id: DocumentId) -> AppResult<i32> {
        let max = self.versions.max_version(document_id).await?.unwrap_or(0);
        max.checked_add(1)
            .ok_or_else(|| AppError::internal(format!("Version counter exhausted for {document_id}")))
    }

    /// An explicit number must be above every number the document already has.
    /// Taking an existing slot is a conflict; going backwards into a free one
    /// is rejected as input.
    async fn ensure_ahead_of_history(&self, document_id: DocumentId, number: i32) -> AppResult<()> {
        let Some(max) = self.versions.max_version(document_id).await? else {
            return Ok(());
        };
        if number > max {
            return Ok(());
        }
        if self
            .versions
            .find_by_document_and_version(document_id, number)
            .await?
            .is_some()
        {
            return Err(AppError::conflict(
                ConflictKind::VersionNumber,
                format!("Version {number} of document {document_id} already exists"),
            ));
        }
        Err(AppError::validation(format!(
            "Version {number} is not above the latest version {max} of document {document_id}"
        )))
    }

    /// The highest-numbered version of a document.
    pub async fn find_latest(&self, document_id: DocumentId) -> AppResult<Option<DocumentVersion>> {
        self.versions.find_latest(document_id).await
    }

    /// A specific numbered version.
    pub async fn find_by_document_and_version(
        &self,
        document_id: DocumentId,
        version: i32,
    ) -> AppResult<Option<DocumentVersion>> {
        self.versions
            .find_by_document_and_version(document_id, version)
            .await
    }

    /// The version holding this content, in any document.
    pub async fn find_by_checksum(&self, checksum: &str) -> AppResult<Option<DocumentVersion>> {
        let checksum = normalize_checksum(checksum)?;
        self.versions.find_by_checksum(&checksum).await
    }

    /// Full history of a document, newest first.
    pub async fn list_by_document(&self, document_id: DocumentId) -> AppResult<Vec<DocumentVersion>> {
        self.versions.list_by_document(document_id).await
    }

    /// Remove one version.
    pub async fn delete(&self, ctx: &RequestContext, id: VersionId) -> AppResult<bool> {
        let existing = self.versions.find_by_id(id).await?;
        let deleted = self.versions.delete(id).await?;

        if let (true, Some(version)) = (deleted, existing) {
            info!(
                user_id = %ctx.user_id,
                document_id = %version.document_id,
                version = version.version,
                "Document version deleted"
            );
            self.audit.log_event(
                AuditEventKind::VersionDeleted,
                Some(ctx.user_id.into_uuid()),
                Some(version.document_id.into_uuid()),
                AuditOutcome::Success,
                serde_json::json!({ "version_id": id, "version": version.version }),
            );
        }
        Ok(deleted)
    }

    /// Remove every version of a document.
    pub async fn delete_all_for_document(
        &self,
        ctx: &RequestContext,
        document_id: DocumentId,
    ) -> AppResult<u64> {
        let removed = self.versions.delete_all_for_document(document_id).await?;

        info!(
            user_id = %ctx.user_id,
            document_id = %document_id,
            removed,
            "Document versions purged"
        );
        self.audit.log_event(
            AuditEventKind::VersionsPurged,
            Some(ctx.user_id.into_uuid()),
            Some(document_id.into_uuid()),
            AuditOutcome::Success,
            serde_json::json!({ "removed": removed }),
        );
        Ok(removed)
    }

    /// Aggregate totals over the whole ledger.
    pub async fn stats(&self) -> AppResult<VersionStats> {
        self.versions.stats().await
    }
}
