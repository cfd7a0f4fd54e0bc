//! Download token storage contract.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use docvault_core::result::AppResult;
use docvault_core::types::id::{DocumentId, TokenId, UserId};
use docvault_entity::token::{DownloadToken, NewDownloadToken};

/// Storage for download tokens.
#[async_trait]
pub trait TokenStore: Send + Sync + std::fmt::Debug + 'static {
    /// Persist a token. Fails with `Conflict(Token)` if the string is taken.
    async fn insert(&self, token: &NewDownloadToken) -> AppResult<DownloadToken>;

    /// Find a token by record id.
    async fn find_by_id(&self, id: TokenId) -> AppResult<Option<DownloadToken>>;

    /// Find a token by its string.
    async fn find_by_value(&self, token: &str) -> AppResult<Option<DownloadToken>>;

    /// Whether a token string is already in use.
    async fn exists_by_value(&self, token: &str) -> AppResult<bool>;

    /// Set `used_at = now` only if it is still unset.
    ///
    /// Returns the updated token, or `None` when no unused token with this id
    /// exists. This single conditional write is what guarantees at most one
    /// successful consumption.
    async fn mark_used(&self, id: TokenId, now: DateTime<Utc>) -> AppResult<Option<DownloadToken>>;

    /// Remove every token with `expires_at < now`, used or not.
    async fn delete_expired(&self, now: DateTime<Utc>) -> AppResult<u64>;

    /// Tokens for a document, newest first.
    async fn find_by_document(&self, document_id: DocumentId) -> AppResult<Vec<DownloadToken>>;

    /// Tokens issued to a user, newest first.
    async fn find_by_issued_to(&self, user_id: UserId) -> AppResult<Vec<DownloadToken>>;
}
