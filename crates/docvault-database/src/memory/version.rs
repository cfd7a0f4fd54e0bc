//! In-memory version store using a Tokio mutex.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use docvault_core::error::{AppError, ConflictKind};
use docvault_core::result::AppResult;
use docvault_core::types::id::{DocumentId, VersionId};
use docvault_entity::version::{DocumentVersion, VersionStats};

use crate::store::{DocumentStore, VersionStore};

#[derive(Debug, Default)]
struct InnerState {
    versions: HashMap<VersionId, DocumentVersion>,
    /// Checksum to owning version, mirroring the global unique index.
    checksums: HashMap<String, VersionId>,
}

/// In-memory version store. Both uniqueness rules are checked under one lock.
///
/// Built with [`MemoryVersionStore::with_documents`], inserts for a document
/// missing from the directory fail with `NotFound`, as the foreign key does in
/// PostgreSQL. A standalone store accepts any document id.
#[derive(Debug, Clone, Default)]
pub struct MemoryVersionStore {
    state: Arc<Mutex<InnerState>>,
    documents: Option<Arc<dyn DocumentStore>>,
}

impl MemoryVersionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store that only accepts versions of registered documents.
    pub fn with_documents(documents: Arc<dyn DocumentStore>) -> Self {
        Self {
            state: Arc::default(),
            documents: Some(documents),
        }
    }
}

#[async_trait]
impl VersionStore for MemoryVersionStore {
    async fn insert(&self, version: &DocumentVersion) -> AppResult<DocumentVersion> {
        // Document rows are only ever soft-deleted, so the check cannot go stale.
        if let Some(documents) = &self.documents {
            if documents.find_by_id(version.document_id).await?.is_none() {
                return Err(AppError::not_found(format!(
                    "Document {} not found",
                    version.document_id
                )));
            }
        }

        let mut state = self.state.lock().await;

        let taken = state
            .versions
            .values()
            .any(|v| v.document_id == version.document_id && v.version == version.version);
        if taken {
            return Err(AppError::conflict(
                ConflictKind::VersionNumber,
                format!(
                    "Version {} of document {} already exists",
                    version.version, version.document_id
                ),
            ));
        }
        if let Some(checksum) = &version.checksum {
            if state.checksums.contains_key(checksum) {
                return Err(AppError::conflict(
                    ConflictKind::Checksum,
                    "Content with this checksum already exists",
                ));
            }
            state.checksums.insert(checksum.clone(), version.id);
        }

        state.versions.insert(version.id, version.clone());
        Ok(version.clone())
    }

    async fn max_version(&self, document_id: DocumentId) -> AppResult<Option<i32>> {
        let state = self.state.lock().await;
        Ok(state
            .versions
            .values()
            .filter(|v| v.document_id == document_id)
            .map(|v| v.version)
            .max())
    }

    async fn find_by_id(&self, id: VersionId) -> AppResult<Option<DocumentVersion>> {
        Ok(self.state.lock().await.versions.get(&id).cloned())
    }

    async fn find_latest(&self, document_id: DocumentId) -> AppResult<Option<DocumentVersion>> {
        let state = self.state.lock().await;
        Ok(state
            .versions
            .values()
            .filter(|v| v.document_id == document_id)
            .max_by_key(|v| v.version)
            .cloned())
    }

    async fn find_by_document_and_version(
        &self,
        document_id: DocumentId,
        version: i32,
    ) -> AppResult<Option<DocumentVersion>> {
        let state = self.state.lock().await;
        Ok(state
            .versions
            .values()
            .find(|v| v.document_id == document_id && v.version == version)
            .cloned())
    }

    async fn find_by_checksum(&self, checksum: &str) -> AppResult<Option<DocumentVersion>> {
        let state = self.state.lock().await;
        Ok(state
            .checksums
            .get(checksum)
            .and_then(|id| state.versions.get(id))
            .cloned())
    }

    async fn list_by_document(&self, document_id: DocumentId) -> AppResult<Vec<DocumentVersion>> {
        let state = self.state.lock().await;
        let mut versions: Vec<DocumentVersion> = state
            .versions
            .values()
            .filter(|v| v.document_id == document_id)
            .cloned()
            .collect();
        versions.sort_by(|a, b| b.version.cmp(&a.version));
        Ok(versions)
    }

    async fn delete(&self, id: VersionId) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        match state.versions.remove(&id) {
            Some(removed) => {
                if let Some(checksum) = removed.checksum {
                    state.checksums.remove(&checksum);
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_all_for_document(&self, document_id: DocumentId) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        let doomed: Vec<VersionId> = state
            .versions
            .values()
            .filter(|v| v.document_id == document_id)
            .map(|v| v.id)
            .collect();
        for id in &doomed {
            if let Some(checksum) = state.versions.remove(id).and_then(|v| v.checksum) {
                state.checksums.remove(&checksum);
            }
        }
        Ok(doomed.len() as u64)
    }

    async fn stats(&self) -> AppResult<VersionStats> {
        let state = self.state.lock().await;
        let mut size_by_mime_type: BTreeMap<String, i64> = BTreeMap::new();
        let mut documents = HashSet::new();
        let mut total_size = 0i64;

        for version in state.versions.values() {
            total_size += version.size;
            documents.insert(version.document_id);
            *size_by_mime_type.entry(version.mime_type.clone()).or_default() += version.size;
        }

        let total_versions = state.versions.len() as i64;
        Ok(VersionStats {
            total_versions,
            total_size,
            size_by_mime_type,
            avg_versions_per_document: VersionStats::average(total_versions, documents.len() as i64),
        })
    }
}
