//! Download token entity model.

use chrono::{DateTime, Utc};
use docvault_core::types::id::{DocumentId, TokenId, UserId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Lifecycle state of a token at a given instant.
///
/// `Expired` is never stored; it is derived from `expires_at` when asked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenState {
    /// Unused and not yet expired.
    Issued,
    /// Consumed once; terminal.
    Used,
    /// Past its expiry without being consumed; terminal.
    Expired,
}

impl TokenState {
    /// Return the state as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Issued => "issued",
            Self::Used => "used",
            Self::Expired => "expired",
        }
    }
}

impl std::fmt::Display for TokenState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single-use, time-boxed capability to fetch one document.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DownloadToken {
    /// Unique record identifier.
    pub id: TokenId,
    /// Random URL-safe token string.
    pub token: String,
    /// Document the token unlocks.
    pub document_id: DocumentId,
    /// The only subject allowed to redeem it.
    pub issued_to: UserId,
    /// Instant after which the token is dead.
    pub expires_at: DateTime<Utc>,
    /// Set exactly once on consumption.
    pub used_at: Option<DateTime<Utc>>,
    /// When the token was issued.
    pub created_at: DateTime<Utc>,
}

impl DownloadToken {
    /// Whether the token has been consumed.
    pub fn is_used(&self) -> bool {
        self.used_at.is_some()
    }

    /// Whether `now` is past the expiry.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Lifecycle state at `now`. A used token stays `Used` after expiry.
    pub fn state(&self, now: DateTime<Utc>) -> TokenState {
        if self.is_used() {
            TokenState::Used
        } else if self.is_expired_at(now) {
            TokenState::Expired
        } else {
            TokenState::Issued
        }
    }
}

/// Data required to persist a freshly issued token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDownloadToken {
    /// Token string.
    pub token: String,
    /// Target document.
    pub document_id: DocumentId,
    /// Recipient.
    pub issued_to: UserId,
    /// Expiry instant.
    pub expires_at: DateTime<Utc>,
}
