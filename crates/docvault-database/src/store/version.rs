//! Version ledger storage contract.

use async_trait::async_trait;

use docvault_core::result::AppResult;
use docvault_core::types::id::{DocumentId, VersionId};
use docvault_entity::version::{DocumentVersion, VersionStats};

/// Append-only storage for document versions.
#[async_trait]
pub trait VersionStore: Send + Sync + std::fmt::Debug + 'static {
    /// Persist a fully assigned version.
    ///
    /// Fails with `Conflict(VersionNumber)` when `(document_id, version)` is
    /// taken and `Conflict(Checksum)` when the checksum exists anywhere.
    async fn insert(&self, version: &DocumentVersion) -> AppResult<DocumentVersion>;

    /// Highest version number recorded for a document.
    async fn max_version(&self, document_id: DocumentId) -> AppResult<Option<i32>>;

    /// Find a version by its id.
    async fn find_by_id(&self, id: VersionId) -> AppResult<Option<DocumentVersion>>;

    /// The version with the highest number for a document.
    async fn find_latest(&self, document_id: DocumentId) -> AppResult<Option<DocumentVersion>>;

    /// A specific numbered version.
    async fn find_by_document_and_version(
        &self,
        document_id: DocumentId,
        version: i32,
    ) -> AppResult<Option<DocumentVersion>>;

    /// The version carrying a (lowercase) checksum, in any document.
    async fn find_by_checksum(&self, checksum: &str) -> AppResult<Option<DocumentVersion>>;

    /// All versions of a document, newest first.
    async fn list_by_document(&self, document_id: DocumentId) -> AppResult<Vec<DocumentVersion>>;

    /// Remove one version. Returns whether a row was removed.
    async fn delete(&self, id: VersionId) -> AppResult<bool>;

    /// Remove every version of a document. Returns the number removed.
    async fn delete_all_for_document(&self, document_id: DocumentId) -> AppResult<u64>;

    /// Aggregate totals over all versions.
    async fn stats(&self) -> AppResult<VersionStats>;
}
