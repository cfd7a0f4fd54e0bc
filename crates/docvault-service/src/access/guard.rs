//! Shared authorization checks for the workflow services.
//!
//! Resolution order:
//! 1. Inactive caller — denied.
//! 2. Missing document — not found. Deleted document — denied by the engine.
//! 3. Admin bypass.
//! 4. Owner bypass.
//! 5. Policy engine over the caller's applicable policy snapshot.

use std::sync::Arc;

use docvault_auth::policy::{AccessDecision, DecisionSource, PolicyEngine};
use docvault_core::error::AppError;
use docvault_core::result::AppResult;
use docvault_core::types::id::DocumentId;
use docvault_database::store::{DocumentStore, PolicyStore};
use docvault_entity::document::DocumentRecord;
use docvault_entity::policy::{AccessPolicy, PolicyAction, Resource, ResourceType};

use crate::context::RequestContext;

/// Loads documents and policy snapshots and answers "may this caller act".
#[derive(Debug, Clone)]
pub struct AccessGuard {
    /// Document directory.
    documents: Arc<dyn DocumentStore>,
    /// Policy storage.
    policies: Arc<dyn PolicyStore>,
    /// Pure evaluator.
    engine: PolicyEngine,
}

impl AccessGuard {
    /// Creates a new access guard.
    pub fn new(documents: Arc<dyn DocumentStore>, policies: Arc<dyn PolicyStore>) -> Self {
        Self {
            documents,
            policies,
            engine: PolicyEngine::new(),
        }
    }

    /// The policy engine used for decisions.
    pub fn engine(&self) -> &PolicyEngine {
        &self.engine
    }

    /// Load a document header, soft-deleted ones included.
    pub async fn load_document(&self, id: DocumentId) -> AppResult<DocumentRecord> {
        self.documents
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Document {id} not found")))
    }

    /// Load a document that has not been deleted.
    pub async fn load_live_document(&self, id: DocumentId) -> AppResult<DocumentRecord> {
        let document = self.load_document(id).await?;
        if document.is_deleted() {
            return Err(AppError::not_found(format!("Document {id} not found")));
        }
        Ok(document)
    }

    /// The engine's view of a document.
    pub fn resource_for(document: &DocumentRecord) -> Resource {
        Resource {
            resource_type: ResourceType::Document,
            id: document.id.into_uuid(),
            owner_id: Some(document.owner_id),
            is_accessible: !document.is_deleted(),
        }
    }

    /// Policies that could apply to the caller on this resource.
    pub async fn snapshot(
        &self,
        ctx: &RequestContext,
        resource: &Resource,
    ) -> AppResult<Vec<AccessPolicy>> {
        self.policies
            .find_applicable(
                &ctx.subject().subject_keys(),
                resource.resource_type,
                resource.id,
            )
            .await
    }

    /// Decide an action on a document, including the owner bypass.
    pub async fn decide(
        &self,
        ctx: &RequestContext,
        document: &DocumentRecord,
        action: PolicyAction,
    ) -> AppResult<AccessDecision> {
        let subject = ctx.subject();
        let resource = Self::resource_for(document);

        if subject.is_active
            && resource.is_accessible
            && !subject.is_admin
            && self.engine.is_owner(&subject, &resource)
        {
            return Ok(AccessDecision {
                allowed: true,
                source: DecisionSource::Owner,
                granted_by: None,
            });
        }

        // Admins and denied-up-front callers need no snapshot.
        let policies = if subject.is_admin || !subject.is_active || !resource.is_accessible {
            Vec::new()
        } else {
            self.snapshot(ctx, &resource).await?
        };
        Ok(self.engine.decide(&subject, &resource, action, &policies))
    }

    /// Require an action on a document, failing with `NotAuthorized`.
    pub async fn authorize(
        &self,
        ctx: &RequestContext,
        document: &DocumentRecord,
        action: PolicyAction,
    ) -> AppResult<AccessDecision> {
        let decision = self.decide(ctx, document, action).await?;
        if !decision.allowed {
            return Err(AppError::authorization(format!(
                "Not permitted to {action} document {}",
                document.id
            )));
        }
        Ok(decision)
    }

    /// Whether the caller may grant or revoke access on a document:
    /// admin, owner, or holder of `manage`.
    pub async fn can_manage(
        &self,
        ctx: &RequestContext,
        document: &DocumentRecord,
    ) -> AppResult<bool> {
        Ok(self.decide(ctx, document, PolicyAction::Manage).await?.allowed)
    }
}
