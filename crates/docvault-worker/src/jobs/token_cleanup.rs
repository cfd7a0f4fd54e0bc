//! Expired download token cleanup.

use std::sync::Arc;

use docvault_core::result::AppResult;
use docvault_service::TokenService;

/// Deletes download tokens whose expiry has passed, used or not.
#[derive(Debug, Clone)]
pub struct TokenCleanupJob {
    /// Token lifecycle service.
    tokens: Arc<TokenService>,
}

impl TokenCleanupJob {
    /// Create a new cleanup job
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self { tokens }
    }

    /// Run one cleanup pass and return how many tokens were removed.
    pub async fn run(&self) -> AppResult<u64> {
        tracing::debug!("Running expired token cleanup");
        let removed = self.tokens.delete_expired().await?;
        tracing::info!(removed, "Expired token cleanup finished");
        Ok(removed)
    }
}
