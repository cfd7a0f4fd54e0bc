//! Download token repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use docvault_core::error::{AppError, ConflictKind, ErrorKind};
use docvault_core::result::AppResult;
use docvault_core::types::id::{DocumentId, TokenId, UserId};
use docvault_entity::token::{DownloadToken, NewDownloadToken};

use crate::store::TokenStore;

/// Repository for the `download_tokens` table.
#[derive(Debug, Clone)]
pub struct TokenRepository {
    pool: PgPool,
}

impl TokenRepository {
    /// Create a new token repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenStore for TokenRepository {
    async fn insert(&self, token: &NewDownloadToken) -> AppResult<DownloadToken> {
        sqlx::query_as::<_, DownloadToken>(
            "INSERT INTO download_tokens (token, document_id, issued_to, expires_at) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(&token.token)
        .bind(token.document_id)
        .bind(token.issued_to)
        .bind(token.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some("download_tokens_token_key") =>
            {
                AppError::conflict(ConflictKind::Token, "Download token string already exists")
            }
            _ => AppError::with_source(ErrorKind::Storage, "Failed to create download token", e),
        })
    }

    async fn find_by_id(&self, id: TokenId) -> AppResult<Option<DownloadToken>> {
        sqlx::query_as::<_, DownloadToken>("SELECT * FROM download_tokens WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to find token", e))
    }

    async fn find_by_value(&self, token: &str) -> AppResult<Option<DownloadToken>> {
        sqlx::query_as::<_, DownloadToken>("SELECT * FROM download_tokens WHERE token = $1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to find token", e))
    }

    async fn exists_by_value(&self, token: &str) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM download_tokens WHERE token = $1)",
        )
        .bind(token)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to check token", e))
    }

    async fn mark_used(&self, id: TokenId, now: DateTime<Utc>) -> AppResult<Option<DownloadToken>> {
        sqlx::query_as::<_, DownloadToken>(
            "UPDATE download_tokens SET used_at = $2 \
             WHERE id = $1 AND used_at IS NULL RETURNING *",
        )
        .bind(id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to consume token", e))
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM download_tokens WHERE expires_at < $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Storage, "Failed to delete expired tokens", e)
            })?;
        Ok(result.rows_affected())
    }

    async fn find_by_document(&self, document_id: DocumentId) -> AppResult<Vec<DownloadToken>> {
        sqlx::query_as::<_, DownloadToken>(
            "SELECT * FROM download_tokens WHERE document_id = $1 ORDER BY created_at DESC",
        )
        .bind(document_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to list tokens", e))
    }

    async fn find_by_issued_to(&self, user_id: UserId) -> AppResult<Vec<DownloadToken>> {
        sqlx::query_as::<_, DownloadToken>(
            "SELECT * FROM download_tokens WHERE issued_to = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to list tokens", e))
    }
}
