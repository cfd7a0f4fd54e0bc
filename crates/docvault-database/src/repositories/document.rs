//! Document repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use docvault_core::error::{AppError, ConflictKind, ErrorKind};
use docvault_core::result::AppResult;
use docvault_core::types::id::DocumentId;
use docvault_entity::document::{DocumentRecord, NewDocument};

use crate::store::DocumentStore;

/// Repository for the `documents` table.
#[derive(Debug, Clone)]
pub struct DocumentRepository {
    pool: PgPool,
}

impl DocumentRepository {
    /// Create a new document repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentStore for DocumentRepository {
    async fn create(&self, document: &NewDocument) -> AppResult<DocumentRecord> {
        let id = document.id.unwrap_or_default();
        sqlx::query_as::<_, DocumentRecord>(
            "INSERT INTO documents (id, title, owner_id) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(id)
        .bind(&document.title)
        .bind(document.owner_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.constraint() == Some("documents_pkey") => {
                AppError::conflict(ConflictKind::Other, format!("Document {id} already exists"))
            }
            _ => AppError::with_source(ErrorKind::Storage, "Failed to create document", e),
        })
    }

    async fn find_by_id(&self, id: DocumentId) -> AppResult<Option<DocumentRecord>> {
        sqlx::query_as::<_, DocumentRecord>("SELECT * FROM documents WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to find document", e))
    }

    async fn soft_delete(&self, id: DocumentId, now: DateTime<Utc>) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE documents SET deleted_at = $2 WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to delete document", e))?;
        Ok(result.rows_affected() > 0)
    }
}
