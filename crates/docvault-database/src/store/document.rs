//! Document directory storage contract.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use docvault_core::result::AppResult;
use docvault_core::types::id::DocumentId;
use docvault_entity::document::{DocumentRecord, NewDocument};

/// Storage for document headers.
#[async_trait]
pub trait DocumentStore: Send + Sync + std::fmt::Debug + 'static {
    /// Register a document.
    async fn create(&self, document: &NewDocument) -> AppResult<DocumentRecord>;

    /// Find a document by id, including soft-deleted ones.
    async fn find_by_id(&self, id: DocumentId) -> AppResult<Option<DocumentRecord>>;

    /// Mark a document deleted. Returns `false` if it was missing or already deleted.
    async fn soft_delete(&self, id: DocumentId, now: DateTime<Utc>) -> AppResult<bool>;
}
