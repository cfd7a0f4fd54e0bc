//! Fixtures shared by the service tests.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use docvault_auth::token::TokenGenerator;
use docvault_core::config::{LedgerConfig, TokenConfig};
use docvault_core::types::id::{DocumentId, UserId};
use docvault_database::memory::{
    MemoryAuditSink, MemoryDocumentStore, MemoryPolicyStore, MemoryTokenStore, MemoryVersionStore,
};
use docvault_database::store::{DocumentStore, TokenStore};
use docvault_entity::document::NewDocument;
use docvault_entity::policy::{NewAccessPolicy, PolicyAction, ResourceType, SubjectType};
use docvault_entity::token::{DownloadToken, NewDownloadToken};
use docvault_entity::version::NewDocumentVersion;

use crate::registry::{Services, StoreSet};
use crate::upload::ConfirmUpload;

/// Let spawned audit writes run to completion.
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

/// A random, well-formed SHA-256 hex digest.
pub fn checksum() -> String {
    format!(
        "{}{}",
        Uuid::new_v4().simple(),
        Uuid::new_v4().simple()
    )
}

/// A valid version for `document_id` without a checksum.
pub fn new_version(document_id: DocumentId, uploaded_by: Option<UserId>) -> NewDocumentVersion {
    NewDocumentVersion {
        document_id,
        version: None,
        filename: "report.pdf".to_string(),
        mime_type: "application/pdf".to_string(),
        size: 2048,
        storage_key: format!("documents/{document_id}/{}", Uuid::new_v4()),
        storage_provider: "local".to_string(),
        checksum: None,
        tags: None,
        metadata: None,
        uploaded_by: uploaded_by.unwrap_or_default(),
    }
}

/// A confirmed upload body.
pub fn confirm_upload(checksum: Option<String>) -> ConfirmUpload {
    ConfirmUpload {
        filename: "drawing.dwg".to_string(),
        mime_type: "application/acad".to_string(),
        size: 4096,
        storage_key: format!("uploads/{}", Uuid::new_v4()),
        storage_provider: "local".to_string(),
        checksum,
        tags: Some(vec!["Draft".to_string()]),
        metadata: Some(serde_json::json!({ "source": "test" })),
    }
}

/// A policy granting `actions` on one document to one user.
pub fn user_grant(
    user: UserId,
    document_id: DocumentId,
    actions: &[PolicyAction],
    priority: i32,
) -> NewAccessPolicy {
    NewAccessPolicy {
        name: format!("grant-{user}"),
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

/// Services over memory stores, with handles for seeding and inspection.
pub struct Harness {
    pub services: Services,
    pub audit: MemoryAuditSink,
    documents: MemoryDocumentStore,
    tokens: MemoryTokenStore,
}

impl Harness {
    pub fn new() -> Self {
        let audit = MemoryAuditSink::new();
        let documents = MemoryDocumentStore::new();
        let tokens = MemoryTokenStore::new();
        let stores = StoreSet {
            versions: Arc::new(MemoryVersionStore::with_documents(Arc::new(documents.clone()))),
            policies: Arc::new(MemoryPolicyStore::new()),
            tokens: Arc::new(tokens.clone()),
            documents: Arc::new(documents.clone()),
            audit_sink: Arc::new(audit.clone()),
        };
        let services = Services::build(stores, &LedgerConfig::default(), &TokenConfig::default())
            .expect("default config is valid");
        Self {
            services,
            audit,
            documents,
            tokens,
        }
    }

    /// A fresh document with no versions and its owner.
    pub async fn document(&self) -> (UserId, DocumentId) {
        let owner = UserId::new();
        (owner, self.document_for(owner).await)
    }

    pub async fn document_for(&self, owner: UserId) -> DocumentId {
        self.documents
            .create(&NewDocument {
                id: None,
                title: "Quarterly report".to_string(),
                owner_id: owner,
            })
            .await
            .expect("create document")
            .id
    }

    /// A document with one version, and its owner.
    pub async fn document_with_version(&self) -> (UserId, DocumentId) {
        let owner = UserId::new();
        (owner, self.document_with_version_for(owner).await)
    }

    pub async fn document_with_version_for(&self, owner: UserId) -> DocumentId {
        let doc = self.document_for(owner).await;
        self.services
            .ledger
            .create(new_version(doc, Some(owner)))
            .await
            .expect("create version");
        doc
    }

    /// Store a token directly, skipping the expiry window check.
    pub async fn insert_raw_token(
        &self,
        document_id: DocumentId,
        issued_to: UserId,
        expires_at: DateTime<Utc>,
    ) -> DownloadToken {
        self.tokens
            .insert(&NewDownloadToken {
                token: TokenGenerator::default().generate(),
                document_id,
                issued_to,
                expires_at,
            })
            .await
            .expect("insert token")
    }
}
