//! In-memory document directory.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use docvault_core::error::{AppError, ConflictKind};
use docvault_core::result::AppResult;
use docvault_core::types::id::DocumentId;
use docvault_entity::document::{DocumentRecord, NewDocument};

use crate::store::DocumentStore;

/// In-memory document store.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocumentStore {
    documents: Arc<Mutex<HashMap<DocumentId, DocumentRecord>>>,
}

impl MemoryDocumentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn create(&self, document: &NewDocument) -> AppResult<DocumentRecord> {
        let mut documents = self.documents.lock().await;
        let id = document.id.unwrap_or_default();
        if documents.contains_key(&id) {
            return Err(AppError::conflict(
                ConflictKind::Other,
                format!("Document {id} already exists"),
            ));
        }
        let record = DocumentRecord {
            id,
            title: document.title.clone(),
            owner_id: document.owner_id,
            deleted_at: None,
            created_at: Utc::now(),
        };
        documents.insert(id, record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: DocumentId) -> AppResult<Option<DocumentRecord>> {
        Ok(self.documents.lock().await.get(&id).cloned())
    }

    async fn soft_delete(&self, id: DocumentId, now: DateTime<Utc>) -> AppResult<bool> {
        let mut documents = self.documents.lock().await;
        match documents.get_mut(&id) {
            Some(doc) if doc.deleted_at.is_none() => {
                doc.deleted_at = Some(now);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
