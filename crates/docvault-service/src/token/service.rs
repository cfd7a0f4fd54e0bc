//! Download token service.
//!
//! State machine: `Issued -> Used` through [`TokenService::consume`], and
//! `Issued -> Expired` implicitly once `now > expires_at`. Both are terminal.
//!
//! Issuance assumes the caller already holds read access to the document;
//! the download workflow enforces that before calling in.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use docvault_auth::token::TokenGenerator;
use docvault_core::config::TokenConfig;
use docvault_core::error::{AppError, ConflictKind};
use docvault_core::result::AppResult;
use docvault_core::types::id::{DocumentId, TokenId, UserId};
use docvault_database::store::{DocumentStore, TokenStore};
use docvault_entity::token::validation::{validate_expiry, validate_token_format};
use docvault_entity::token::{DownloadToken, NewDownloadToken, TokenState};

use crate::ledger::LedgerService;

/// Issues, validates, and consumes single-use download tokens.
#[derive(Debug, Clone)]
pub struct TokenService {
    /// Token storage.
    tokens: Arc<dyn TokenStore>,
    /// Document directory, for existence checks.
    documents: Arc<dyn DocumentStore>,
    /// Version ledger, for existence checks.
    ledger: Arc<LedgerService>,
    /// Token string generator.
    generator: TokenGenerator,
    /// Lifetimes and generation bounds.
    config: TokenConfig,
}

impl TokenService {
    /// Creates a new token service.
    pub fn new(
        tokens: Arc<dyn TokenStore>,
        documents: Arc<dyn DocumentStore>,
        ledger: Arc<LedgerService>,
        config: TokenConfig,
    ) -> AppResult<Self> {
        let generator = TokenGenerator::from_config(&config)?;
        Ok(Self {
            tokens,
            documents,
            ledger,
            generator,
            config,
        })
    }

    /// Maximum lifetime of a token.
    pub fn max_ttl(&self) -> Duration {
        Duration::seconds(self.config.max_ttl_seconds)
    }

    /// Expiry for a requested lifetime, or the configured default.
    ///
    /// Lifetimes longer than [`Self::max_ttl`] are rejected before any date
    /// arithmetic happens.
    pub fn expiry_for(&self, ttl: Option<Duration>, now: DateTime<Utc>) -> AppResult<DateTime<Utc>> {
        let ttl = ttl.unwrap_or_else(|| Duration::seconds(self.config.default_ttl_seconds));
        if ttl > self.max_ttl() {
            return Err(AppError::validation(format!(
                "Token lifetime may not exceed {} seconds",
                self.config.max_ttl_seconds
            )));
        }
        now.checked_add_signed(ttl)
            .ok_or_else(|| AppError::validation("Token lifetime is out of range"))
    }

    /// Issue a token for `document_id` to `issued_to`, valid until `expires_at`.
    pub async fn issue(
        &self,
        document_id: DocumentId,
        issued_to: UserId,
        expires_at: DateTime<Utc>,
    ) -> AppResult<DownloadToken> {
        validate_expiry(expires_at, Utc::now(), self.max_ttl())?;
        self.ensure_document_exists(document_id).await?;

        let token = self.unique_token_string().await?;
        let record = NewDownloadToken {
            token,
            document_id,
            issued_to,
            expires_at,
        };

        let issued = match self.tokens.insert(&record).await {
            Ok(issued) => issued,
            // Lost a race for the same string between the check and the insert.
            Err(e) if e.is_conflict(ConflictKind::Token) => {
                warn!(document_id = %document_id, "Token string collided on insert, regenerating");
                let retry = NewDownloadToken {
                    token: self.unique_token_string().await?,
                    ..record
                };
                self.tokens.insert(&retry).await?
            }
            Err(e) => return Err(e),
        };

        info!(
            token_id = %issued.id,
            document_id = %document_id,
            issued_to = %issued_to,
            expires_at = %issued.expires_at,
            "Download token issued"
        );
        Ok(issued)
    }

    /// Check a presented token without consuming it.
    ///
    /// Fails with `Validation` for a malformed string, `NotFound` for an
    /// unknown one, then `AlreadyUsed`, `Expired`, or `NotAuthorized`.
    pub async fn validate(&self, token: &str, requester: UserId) -> AppResult<DownloadToken> {
        validate_token_format(token)?;
        let found = self
            .tokens
            .find_by_value(token)
            .await?
            .ok_or_else(|| AppError::not_found("Download token not found"))?;

        match found.state(Utc::now()) {
            TokenState::Used => Err(AppError::already_used("Download token has already been used")),
            TokenState::Expired => Err(AppError::expired("Download token has expired")),
            TokenState::Issued if found.issued_to != requester => Err(AppError::authorization(
                "Download token was issued to a different subject",
            )),
            TokenState::Issued => {
                debug!(token_id = %found.id, "Download token validated");
                Ok(found)
            }
        }
    }

    /// Mark a token used. Succeeds exactly once per token.
    pub async fn consume(&self, id: TokenId) -> AppResult<DownloadToken> {
        let now = Utc::now();
        let current = self
            .tokens
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Download token {id} not found")))?;

        match current.state(now) {
            TokenState::Used => {
                return Err(AppError::already_used("Download token has already been used"));
            }
            TokenState::Expired => return Err(AppError::expired("Download token has expired")),
            TokenState::Issued => {}
        }

        let consumed = self
            .tokens
            .mark_used(id, now)
            .await?
            .ok_or_else(|| AppError::already_used("Download token has already been used"))?;

        info!(
            token_id = %id,
            document_id = %consumed.document_id,
            issued_to = %consumed.issued_to,
            "Download token consumed"
        );
        Ok(consumed)
    }

    /// Remove every expired token, used or not.
    pub async fn delete_expired(&self) -> AppResult<u64> {
        let removed = self.tokens.delete_expired(Utc::now()).await?;
        if removed > 0 {
            info!(removed, "Expired download tokens deleted");
        }
        Ok(removed)
    }

    /// Tokens issued for a document.
    pub async fn find_by_document(&self, document_id: DocumentId) -> AppResult<Vec<DownloadToken>> {
        self.tokens.find_by_document(document_id).await
    }

    /// Tokens issued to a user.
    pub async fn find_by_issued_to(&self, user_id: UserId) -> AppResult<Vec<DownloadToken>> {
        self.tokens.find_by_issued_to(user_id).await
    }

    /// A document exists when its record is live and it has at least one version.
    async fn ensure_document_exists(&self, document_id: DocumentId) -> AppResult<()> {
        let live = self
            .documents
            .find_by_id(document_id)
            .await?
            .is_some_and(|d| !d.is_deleted());
        if !live || self.ledger.find_latest(document_id).await?.is_none() {
            return Err(AppError::not_found(format!(
                "Document {document_id} not found"
            )));
        }
        Ok(())
    }

    async fn unique_token_string(&self) -> AppResult<String> {
        for _ in 0..self.config.max_generation_attempts {
            let candidate = self.generator.generate();
            if !self.tokens.exists_by_value(&candidate).await? {
                return Ok(candidate);
            }
            warn!("Generated download token already exists, regenerating");
        }
        Err(AppError::conflict(
            ConflictKind::Token,
            "Could not generate a unique download token",
        ))
    }
}

#[cfg(test)]
mod tests {
    use futures::future::join_all;

    use docvault_core::ErrorKind;

    use super::*;
    use crate::testing::Harness;

    #[tokio::test]
    async fn test_issue_validate_consume_once() {
        let h = Harness::new();
        let (owner, doc) = h.document_with_version().await;
        let tokens = &h.services.tokens;

        let token = tokens
            .issue(doc, owner, Utc::now() + Duration::minutes(10))
            .await
            .unwrap();
        assert!((32..=64).contains(&token.token.len()));

        let validated = tokens.validate(&token.token, owner).await.unwrap();
        assert_eq!(validated.id, token.id);
        assert!(validated.used_at.is_none());

        tokens.consume(token.id).await.unwrap();
        let err = tokens.consume(token.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::AlreadyUsed);
        let err = tokens.validate(&token.token, owner).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::AlreadyUsed);
    }

    #[tokio::test]
    async fn test_expiry_window_enforced_at_issue() {
        let h = Harness::new();
        let (owner, doc) = h.document_with_version().await;
        let tokens = &h.services.tokens;

        let past = tokens.issue(doc, owner, Utc::now() - Duration::minutes(1)).await;
        assert_eq!(past.unwrap_err().kind, ErrorKind::Validation);

        let too_far = tokens.issue(doc, owner, Utc::now() + Duration::hours(25)).await;
        assert_eq!(too_far.unwrap_err().kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_expiry_for_bounds_requested_lifetime() {
        let h = Harness::new();
        let tokens = &h.services.tokens;
        let now = Utc::now();

        assert_eq!(tokens.expiry_for(None, now).unwrap(), now + Duration::minutes(15));
        assert_eq!(
            tokens.expiry_for(Some(Duration::minutes(5)), now).unwrap(),
            now + Duration::minutes(5)
        );

        let err = tokens.expiry_for(Some(Duration::MAX), now).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        let err = tokens.expiry_for(Some(Duration::hours(25)), now).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_issue_requires_live_document_with_versions() {
        let h = Harness::new();
        let tokens = &h.services.tokens;
        let later = Utc::now() + Duration::minutes(5);

        let unknown = tokens.issue(DocumentId::new(), UserId::new(), later).await;
        assert_eq!(unknown.unwrap_err().kind, ErrorKind::NotFound);

        let (owner, empty) = h.document().await;
        let no_versions = tokens.issue(empty, owner, later).await;
        assert_eq!(no_versions.unwrap_err().kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_expired_token_rejected_even_if_unused() {
        let h = Harness::new();
        let (owner, doc) = h.document_with_version().await;
        let stale = h.insert_raw_token(doc, owner, Utc::now() - Duration::seconds(1)).await;

        let err = h.services.tokens.validate(&stale.token, owner).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Expired);
        assert!(err.is_business_rule_violation());
        let err = h.services.tokens.consume(stale.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Expired);
    }

    #[tokio::test]
    async fn test_validate_rejects_other_subject_and_bad_format() {
        let h = Harness::new();
        let (owner, doc) = h.document_with_version().await;
        let tokens = &h.services.tokens;
        let token = tokens
            .issue(doc, owner, Utc::now() + Duration::minutes(10))
            .await
            .unwrap();

        let err = tokens.validate(&token.token, UserId::new()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);

        let err = tokens.validate("short", owner).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let unknown = "A".repeat(43);
        let err = tokens.validate(&unknown, owner).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_concurrent_consume_has_one_winner() {
        let h = Harness::new();
        let (owner, doc) = h.document_with_version().await;
        let tokens = h.services.tokens.clone();
        let token = tokens
            .issue(doc, owner, Utc::now() + Duration::minutes(10))
            .await
            .unwrap();

        let id = token.id;
        let attempts = (0..10).map(|_| {
            let tokens = tokens.clone();
            tokio::spawn(async move { tokens.consume(id).await })
        });
        let outcomes: Vec<AppResult<DownloadToken>> = join_all(attempts)
            .await
            .into_iter()
            .map(|joined| joined.expect("task panicked"))
            .collect();

        let wins = outcomes.iter().filter(|r| r.is_ok()).count();
        assert_eq!(wins, 1);
        assert!(
            outcomes
                .iter()
                .filter_map(|r| r.as_ref().err())
                .all(|e| e.kind == ErrorKind::AlreadyUsed)
        );
    }

    #[tokio::test]
    async fn test_delete_expired_and_lookups() {
        let h = Harness::new();
        let (owner, doc) = h.document_with_version().await;
        let tokens = &h.services.tokens;
        tokens
            .issue(doc, owner, Utc::now() + Duration::minutes(10))
            .await
            .unwrap();
        h.insert_raw_token(doc, owner, Utc::now() - Duration::minutes(1)).await;

        assert_eq!(tokens.find_by_document(doc).await.unwrap().len(), 2);
        assert_eq!(tokens.delete_expired().await.unwrap(), 1);
        assert_eq!(tokens.find_by_issued_to(owner).await.unwrap().len(), 1);
    }
}
