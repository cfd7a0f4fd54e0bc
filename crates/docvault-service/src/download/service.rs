//! Download workflow: authorize, issue a single-use token, then redeem it
//! for the storage locator of the latest version.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use docvault_core::error::AppError;
use docvault_core::events::{AuditEventKind, AuditOutcome};
use docvault_core::result::AppResult;
use docvault_core::types::id::DocumentId;
use docvault_entity::policy::PolicyAction;
use docvault_entity::token::DownloadToken;
use docvault_entity::version::DocumentVersion;

use crate::access::AccessGuard;
use crate::audit::AuditLogger;
use crate::context::RequestContext;
use crate::ledger::LedgerService;
use crate::token::TokenService;

/// A redeemed token together with the version it unlocks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadGrant {
    /// The consumed token.
    pub token: DownloadToken,
    /// The version whose storage locator may now be served.
    pub version: DocumentVersion,
}

/// Issues and redeems download tokens on behalf of authorized callers.
#[derive(Debug, Clone)]
pub struct DownloadService {
    /// Authorization guard.
    guard: AccessGuard,
    /// Token lifecycle.
    tokens: Arc<TokenService>,
    /// Version ledger.
    ledger: Arc<LedgerService>,
    /// Audit logger.
    audit: AuditLogger,
}

impl DownloadService {
    /// Creates a new download service.
    pub fn new(
        guard: AccessGuard,
        tokens: Arc<TokenService>,
        ledger: Arc<LedgerService>,
        audit: AuditLogger,
    ) -> Self {
        Self {
            guard,
            tokens,
            ledger,
            audit,
        }
    }

    /// Issue a token for the caller. Requires `read` on the document.
    ///
    /// `ttl` defaults to the configured lifetime and may not exceed the
    /// configured maximum.
    pub async fn request_download(
        &self,
        ctx: &RequestContext,
        document_id: DocumentId,
        ttl: Option<Duration>,
    ) -> AppResult<DownloadToken> {
        let document = self.guard.load_live_document(document_id).await?;
        self.guard
            .authorize(ctx, &document, PolicyAction::Read)
            .await?;

        let expires_at = self.tokens.expiry_for(ttl, Utc::now())?;
        let token = self.tokens.issue(document_id, ctx.user_id, expires_at).await?;

        self.audit.log_event(
            AuditEventKind::TokenIssued,
            Some(ctx.user_id.into_uuid()),
            Some(document_id.into_uuid()),
            AuditOutcome::Success,
            serde_json::json!({
                "token_id": token.id,
                "expires_at": token.expires_at,
            }),
        );
        Ok(token)
    }

    /// Redeem a token presented by the caller.
    ///
    /// The token is consumed only after every check has passed, so a failed
    /// redemption leaves it usable.
    pub async fn redeem(&self, ctx: &RequestContext, token: &str) -> AppResult<DownloadGrant> {
        let validated = match self.tokens.validate(token, ctx.user_id).await {
            Ok(validated) => validated,
            Err(e) => {
                self.audit.log_event(
                    AuditEventKind::TokenConsumed,
                    Some(ctx.user_id.into_uuid()),
                    None,
                    AuditOutcome::Denied,
                    serde_json::json!({ "reason": e.kind.to_string() }),
                );
                return Err(e);
            }
        };

        let document_id = validated.document_id;
        self.guard.load_live_document(document_id).await?;
        let version = self
            .ledger
            .find_latest(document_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Document {document_id} has no versions")))?;

        let consumed = self.tokens.consume(validated.id).await?;

        info!(
            user_id = %ctx.user_id,
            token_id = %consumed.id,
            document_id = %document_id,
            version = version.version,
            "Download token redeemed"
        );
        self.audit.log_event(
            AuditEventKind::TokenConsumed,
            Some(ctx.user_id.into_uuid()),
            Some(document_id.into_uuid()),
            AuditOutcome::Success,
            serde_json::json!({
                "token_id": consumed.id,
                "version_id": version.id,
                "version": version.version,
            }),
        );

        Ok(DownloadGrant {
            token: consumed,
            version,
        })
    }
}
