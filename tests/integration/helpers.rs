//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use uuid::Uuid;

use docvault_core::config::{LedgerConfig, TokenConfig};
use docvault_core::types::id::{DocumentId, UserId};
use docvault_database::store::DocumentStore;
use docvault_database::memory::{
    MemoryAuditSink, MemoryDocumentStore, MemoryPolicyStore, MemoryTokenStore, MemoryVersionStore,
};
use docvault_entity::policy::{NewAccessPolicy, PolicyAction, ResourceType, SubjectType};
use docvault_service::{ConfirmUpload, RequestContext, Services, StoreSet};

/// Test application context
pub struct TestApp {
    /// Fully wired services over in-memory stores
    pub services: Services,
    /// Captured audit events
    pub audit: MemoryAuditSink,
    /// Direct token store access for seeding
    pub tokens: MemoryTokenStore,
}

impl TestApp {
    /// Create a new test application
    pub fn new() -> Self {
        let audit = MemoryAuditSink::new();
        let tokens = MemoryTokenStore::new();
        let documents: Arc<dyn DocumentStore> = Arc::new(MemoryDocumentStore::new());
        let stores = StoreSet {
            versions: Arc::new(MemoryVersionStore::with_documents(Arc::clone(&documents))),
            policies: Arc::new(MemoryPolicyStore::new()),
            tokens: Arc::new(tokens.clone()),
            documents,
            audit_sink: Arc::new(audit.clone()),
        };
        let services = Services::build(stores, &LedgerConfig::default(), &TokenConfig::default())
            .expect("Failed to build services");
        Self {
            services,
            audit,
            tokens,
        }
    }

    /// Create a document owned by a fresh user
    pub async fn create_document(&self, title: &str) -> (RequestContext, DocumentId) {
        let owner = RequestContext::user(UserId::new());
        let document = self
            .services
            .documents
            .create_document(&owner, title)
            .await
            .expect("Failed to create document");
        (owner, document.id)
    }

    /// Confirm an upload as `ctx`
    pub async fn upload(
        &self,
        ctx: &RequestContext,
        document_id: DocumentId,
        checksum: Option<String>,
    ) -> docvault_core::AppResult<docvault_entity::version::DocumentVersion> {
        self.services
            .upload
            .confirm_upload(ctx, document_id, upload_body(checksum))
            .await
    }

    /// Grant `actions` on a document to a user, as `grantor`
    pub async fn grant(
        &self,
        grantor: &RequestContext,
        user: UserId,
        document_id: DocumentId,
        actions: &[PolicyAction],
        priority: i32,
    ) {
        self.services
            .access
            .grant(grantor, policy_for(user, document_id, actions, priority))
            .await
            .expect("Failed to grant policy");
    }

    /// Let spawned audit writes finish
    pub async fn settle(&self) {
        for _ in 0..16 {
            tokio::task::yield_now().await;
        }
    }
}

/// An upload confirmation body
pub fn upload_body(checksum: Option<String>) -> ConfirmUpload {
    ConfirmUpload {
        filename: "site-plan.pdf".to_string(),
        mime_type: "application/pdf".to_string(),
        size: 1_048_576,
        storage_key: format!("vault/{}", Uuid::new_v4()),
        storage_provider: "s3".to_string(),
        checksum,
        tags: None,
        metadata: None,
    }
}

/// A user policy on one document
pub fn policy_for(
    user: UserId,
    document_id: DocumentId,
    actions: &[PolicyAction],
    priority: i32,
) -> NewAccessPolicy {
    NewAccessPolicy {
        name: "integration grant".to_string(),
        description: None,
        subject_type: SubjectType::User,
        subject_id: user.to_string(),
        resource_type: ResourceType::Document,
        resource_id: Some(document_id.into_uuid()),
        actions: actions.to_vec(),
        is_active: true,
        priority,
    }
}

/// A random SHA-256 hex digest
pub fn checksum() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}
