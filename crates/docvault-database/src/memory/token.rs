//! In-memory token store using `dashmap`.
//!
//! `mark_used` runs under the entry's shard write lock, which makes the
//! check-and-set on `used_at` a single atomic step.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use docvault_core::error::{AppError, ConflictKind};
use docvault_core::result::AppResult;
use docvault_core::types::id::{DocumentId, TokenId, UserId};
use docvault_entity::token::{DownloadToken, NewDownloadToken};

use crate::store::TokenStore;

/// In-memory token store.
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStore {
    tokens: Arc<DashMap<TokenId, DownloadToken>>,
    /// Token string to record id, mirroring the unique index.
    by_value: Arc<DashMap<String, TokenId>>,
}

impl MemoryTokenStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    fn newest_first(mut tokens: Vec<DownloadToken>) -> Vec<DownloadToken> {
        tokens.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        tokens
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn insert(&self, token: &NewDownloadToken) -> AppResult<DownloadToken> {
        match self.by_value.entry(token.token.clone()) {
            Entry::Occupied(_) => Err(AppError::conflict(
                ConflictKind::Token,
                "Download token string already exists",
            )),
            Entry::Vacant(slot) => {
                let row = DownloadToken {
                    id: TokenId::new(),
                    token: token.token.clone(),
                    document_id: token.document_id,
                    issued_to: token.issued_to,
                    expires_at: token.expires_at,
                    used_at: None,
                    created_at: Utc::now(),
                };
                self.tokens.insert(row.id, row.clone());
                slot.insert(row.id);
                Ok(row)
            }
        }
    }

    async fn find_by_id(&self, id: TokenId) -> AppResult<Option<DownloadToken>> {
        Ok(self.tokens.get(&id).map(|t| t.clone()))
    }

    async fn find_by_value(&self, token: &str) -> AppResult<Option<DownloadToken>> {
        let Some(id) = self.by_value.get(token).map(|id| *id) else {
            return Ok(None);
        };
        Ok(self.tokens.get(&id).map(|t| t.clone()))
    }

    async fn exists_by_value(&self, token: &str) -> AppResult<bool> {
        Ok(self.by_value.contains_key(token))
    }

    async fn mark_used(&self, id: TokenId, now: DateTime<Utc>) -> AppResult<Option<DownloadToken>> {
        let Some(mut token) = self.tokens.get_mut(&id) else {
            return Ok(None);
        };
        if token.used_at.is_some() {
            return Ok(None);
        }
        token.used_at = Some(now);
        Ok(Some(token.clone()))
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let expired: Vec<TokenId> = self
            .tokens
            .iter()
            .filter(|t| t.expires_at < now)
            .map(|t| t.id)
            .collect();

        let mut removed = 0u64;
        for id in expired {
            if let Some((_, token)) = self.tokens.remove_if(&id, |_, t| t.expires_at < now) {
                self.by_value.remove(&token.token);
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn find_by_document(&self, document_id: DocumentId) -> AppResult<Vec<DownloadToken>> {
        Ok(Self::newest_first(
            self.tokens
                .iter()
                .filter(|t| t.document_id == document_id)
                .map(|t| t.clone())
                .collect(),
        ))
    }

    async fn find_by_issued_to(&self, user_id: UserId) -> AppResult<Vec<DownloadToken>> {
        Ok(Self::newest_first(
            self.tokens
                .iter()
                .filter(|t| t.issued_to == user_id)
                .map(|t| t.clone())
                .collect(),
        ))
    }
}
