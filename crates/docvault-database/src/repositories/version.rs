//! Document version repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use docvault_core::error::{AppError, ConflictKind, ErrorKind};
use docvault_core::result::AppResult;
use docvault_core::types::id::{DocumentId, VersionId};
use docvault_entity::version::{DocumentVersion, VersionStats};

use crate::store::VersionStore;

/// Repository for the append-only `document_versions` table.
#[derive(Debug, Clone)]
pub struct VersionRepository {
    pool: PgPool,
}

impl VersionRepository {
    /// Create a new version repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VersionStore for VersionRepository {
    async fn insert(&self, version: &DocumentVersion) -> AppResult<DocumentVersion> {
        sqlx::query_as::<_, DocumentVersion>(
            "INSERT INTO document_versions (id, document_id, version, filename, mime_type, size, \
             storage_key, storage_provider, checksum, tags, metadata, uploaded_by, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) RETURNING *",
        )
        .bind(version.id)
        .bind(version.document_id)
        .bind(version.version)
        .bind(&version.filename)
        .bind(&version.mime_type)
        .bind(version.size)
        .bind(&version.storage_key)
        .bind(&version.storage_provider)
        .bind(&version.checksum)
        .bind(&version.tags)
        .bind(&version.metadata)
        .bind(version.uploaded_by)
        .bind(version.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some("document_versions_document_id_version_key") =>
            {
                AppError::conflict(
                    ConflictKind::VersionNumber,
                    format!(
                        "Version {} of document {} already exists",
                        version.version, version.document_id
                    ),
                )
            }
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some("document_versions_checksum_key") =>
            {
                AppError::conflict(
                    ConflictKind::Checksum,
                    "Content with this checksum already exists",
                )
            }
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some("document_versions_document_id_fkey") =>
            {
                AppError::not_found(format!("Document {} not found", version.document_id))
            }
            _ => AppError::with_source(ErrorKind::Storage, "Failed to create document version", e),
        })
    }

    async fn max_version(&self, document_id: DocumentId) -> AppResult<Option<i32>> {
        sqlx::query_scalar::<_, Option<i32>>(
            "SELECT MAX(version) FROM document_versions WHERE document_id = $1",
        )
        .bind(document_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to read max version", e))
    }

    async fn find_by_id(&self, id: VersionId) -> AppResult<Option<DocumentVersion>> {
        sqlx::query_as::<_, DocumentVersion>("SELECT * FROM document_versions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to find version", e))
    }

    async fn find_latest(&self, document_id: DocumentId) -> AppResult<Option<DocumentVersion>> {
        sqlx::query_as::<_, DocumentVersion>(
            "SELECT * FROM document_versions WHERE document_id = $1 \
             ORDER BY version DESC LIMIT 1",
        )
        .bind(document_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to find latest version", e))
    }

    async fn find_by_document_and_version(
        &self,
        document_id: DocumentId,
        version: i32,
    ) -> AppResult<Option<DocumentVersion>> {
        sqlx::query_as::<_, DocumentVersion>(
            "SELECT * FROM document_versions WHERE document_id = $1 AND version = $2",
        )
        .bind(document_id)
        .bind(version)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to find version", e))
    }

    async fn find_by_checksum(&self, checksum: &str) -> AppResult<Option<DocumentVersion>> {
        sqlx::query_as::<_, DocumentVersion>(
            "SELECT * FROM document_versions WHERE checksum = $1",
        )
        .bind(checksum)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to find version by checksum", e)
        })
    }

    async fn list_by_document(&self, document_id: DocumentId) -> AppResult<Vec<DocumentVersion>> {
        sqlx::query_as::<_, DocumentVersion>(
            "SELECT * FROM document_versions WHERE document_id = $1 ORDER BY version DESC",
        )
        .bind(document_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to list versions", e))
    }

    async fn delete(&self, id: VersionId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM document_versions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to delete version", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_all_for_document(&self, document_id: DocumentId) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM document_versions WHERE document_id = $1")
            .bind(document_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Storage, "Failed to delete document versions", e)
            })?;
        Ok(result.rows_affected())
    }

    async fn stats(&self) -> AppResult<VersionStats> {
        let (total_versions, total_size, documents) = sqlx::query_as::<_, (i64, i64, i64)>(
            "SELECT COUNT(*)::BIGINT, COALESCE(SUM(size), 0)::BIGINT, \
             COUNT(DISTINCT document_id)::BIGINT FROM document_versions",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to compute stats", e))?;

        let by_mime = sqlx::query_as::<_, (String, i64)>(
            "SELECT mime_type, COALESCE(SUM(size), 0)::BIGINT FROM document_versions \
             GROUP BY mime_type",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to compute size by MIME type", e)
        })?;

        Ok(VersionStats {
            total_versions,
            total_size,
            size_by_mime_type: by_mime.into_iter().collect(),
            avg_versions_per_document: VersionStats::average(total_versions, documents),
        })
    }
}
