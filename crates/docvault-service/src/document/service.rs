//! Document lifecycle: creation, history, and cascading deletion.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use docvault_core::error::AppError;
use docvault_core::events::{AuditEventKind, AuditOutcome};
use docvault_core::result::AppResult;
use docvault_core::types::id::{DocumentId, VersionId};
use docvault_database::store::{DocumentStore, PolicyStore};
use docvault_entity::document::{DocumentRecord, NewDocument};
use docvault_entity::policy::{PolicyAction, ResourceType};
use docvault_entity::version::DocumentVersion;

use crate::access::AccessGuard;
use crate::audit::AuditLogger;
use crate::context::RequestContext;
use crate::ledger::LedgerService;

/// What a document deletion removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionSummary {
    /// Versions removed from the ledger.
    pub versions_removed: u64,
    /// Policies naming the document that were removed.
    pub policies_removed: u64,
}

/// Creates documents and removes them with everything that hangs off them.
#[derive(Debug, Clone)]
pub struct DocumentService {
    /// Authorization guard.
    guard: AccessGuard,
    /// Document directory.
    documents: Arc<dyn DocumentStore>,
    /// Policy storage.
    policies: Arc<dyn PolicyStore>,
    /// Version ledger.
    ledger: Arc<LedgerService>,
    /// Audit logger.
    audit: AuditLogger,
}

impl DocumentService {
    /// Creates a new document service.
    pub fn new(
        guard: AccessGuard,
        documents: Arc<dyn DocumentStore>,
        policies: Arc<dyn PolicyStore>,
        ledger: Arc<LedgerService>,
        audit: AuditLogger,
    ) -> Self {
        Self {
            guard,
            documents,
            policies,
            ledger,
            audit,
        }
    }

    /// Register a document owned by the caller.
    pub async fn create_document(
        &self,
        ctx: &RequestContext,
        title: &str,
    ) -> AppResult<DocumentRecord> {
        if !ctx.is_active {
            return Err(AppError::business_rule("Inactive users cannot create documents"));
        }
        let title = title.trim();
        if title.is_empty() {
            return Err(AppError::validation("Document title is required"));
        }

        let document = self
            .documents
            .create(&NewDocument {
                id: None,
                title: title.to_string(),
                owner_id: ctx.user_id,
            })
            .await?;
        info!(user_id = %ctx.user_id, document_id = %document.id, "Document created");
        Ok(document)
    }

    /// Fetch a document header. Requires `read`.
    pub async fn get_document(
        &self,
        ctx: &RequestContext,
        document_id: DocumentId,
    ) -> AppResult<DocumentRecord> {
        let document = self.guard.load_live_document(document_id).await?;
        self.guard
            .authorize(ctx, &document, PolicyAction::Read)
            .await?;
        Ok(document)
    }

    /// Version history, newest first. Requires `read`.
    pub async fn list_versions(
        &self,
        ctx: &RequestContext,
        document_id: DocumentId,
    ) -> AppResult<Vec<DocumentVersion>> {
        self.get_document(ctx, document_id).await?;
        self.ledger.list_by_document(document_id).await
    }

    /// Remove one version. Requires `delete` on its document.
    pub async fn delete_version(
        &self,
        ctx: &RequestContext,
        document_id: DocumentId,
        version: i32,
    ) -> AppResult<VersionId> {
        let document = self.guard.load_live_document(document_id).await?;
        self.guard
            .authorize(ctx, &document, PolicyAction::Delete)
            .await?;

        let existing = self
            .ledger
            .find_by_document_and_version(document_id, version)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Version {version} of document {document_id} not found"))
            })?;
        if !self.ledger.delete(ctx, existing.id).await? {
            return Err(AppError::not_found(format!(
                "Version {version} of document {document_id} not found"
            )));
        }
        Ok(existing.id)
    }

    /// Delete a document with all its versions and the policies naming it.
    ///
    /// Only the owner or an admin may do this. Class-wide policies are kept.
    pub async fn delete_document(
        &self,
        ctx: &RequestContext,
        document_id: DocumentId,
    ) -> AppResult<DeletionSummary> {
        let document = self.guard.load_live_document(document_id).await?;
        let owns = ctx.is_active && document.owner_id == ctx.user_id;
        if !owns && !ctx.is_active_admin() {
            self.audit.log_event(
                AuditEventKind::DocumentDeleted,
                Some(ctx.user_id.into_uuid()),
                Some(document_id.into_uuid()),
                AuditOutcome::Denied,
                serde_json::Value::Null,
            );
            return Err(AppError::business_rule(
                "Only the owner or an admin may delete a document",
            ));
        }

        if !self.documents.soft_delete(document_id, Utc::now()).await? {
            return Err(AppError::not_found(format!("Document {document_id} not found")));
        }
        let versions_removed = self.ledger.delete_all_for_document(ctx, document_id).await?;
        let policies_removed = self
            .policies
            .delete_by_resource(ResourceType::Document, document_id.into_uuid())
            .await?;

        let summary = DeletionSummary {
            versions_removed,
            policies_removed,
        };
        info!(
            user_id = %ctx.user_id,
            document_id = %document_id,
            versions_removed,
            policies_removed,
            "Document deleted"
        );
        self.audit.log_event(
            AuditEventKind::DocumentDeleted,
            Some(ctx.user_id.into_uuid()),
            Some(document_id.into_uuid()),
            AuditOutcome::Success,
            serde_json::to_value(summary)?,
        );
        Ok(summary)
    }
}
