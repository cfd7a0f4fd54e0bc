//! Download token configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Smallest random payload that still encodes to 32 URL-safe characters.
pub const MIN_TOKEN_BYTES: usize = 24;
/// Largest random payload that still encodes to at most 64 URL-safe characters.
pub const MAX_TOKEN_BYTES: usize = 48;

/// Lifetime and generation settings for single-use download tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Lifetime used when the caller does not ask for one (seconds).
    #[serde(default = "default_ttl")]
    pub default_ttl_seconds: i64,
    /// Upper bound on any token lifetime (seconds, default 24h).
    #[serde(default = "default_max_ttl")]
    pub max_ttl_seconds: i64,
    /// Number of random bytes behind each token string.
    #[serde(default = "default_token_bytes")]
    pub token_bytes: usize,
    /// How many fresh strings to try before giving up on a collision.
    #[serde(default = "default_max_generation_attempts")]
    pub max_generation_attempts: u32,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            default_ttl_seconds: default_ttl(),
            max_ttl_seconds: default_max_ttl(),
            token_bytes: default_token_bytes(),
            max_generation_attempts: default_max_generation_attempts(),
        }
    }
}

impl TokenConfig {
    /// Reject lifetimes and sizes outside the supported window.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.max_ttl_seconds <= 0 {
            return Err(AppError::configuration(
                "tokens.max_ttl_seconds must be positive",
            ));
        }
        if self.default_ttl_seconds <= 0 || self.default_ttl_seconds > self.max_ttl_seconds {
            return Err(AppError::configuration(format!(
                "tokens.default_ttl_seconds must be within 1..={}",
                self.max_ttl_seconds
            )));
        }
        if !(MIN_TOKEN_BYTES..=MAX_TOKEN_BYTES).contains(&self.token_bytes) {
            return Err(AppError::configuration(format!(
                "tokens.token_bytes must be within {MIN_TOKEN_BYTES}..={MAX_TOKEN_BYTES}"
            )));
        }
        if self.max_generation_attempts == 0 {
            return Err(AppError::configuration(
                "tokens.max_generation_attempts must be at least 1",
            ));
        }
        Ok(())
    }
}

fn default_ttl() -> i64 {
    900
}

fn default_max_ttl() -> i64 {
    86_400
}

fn default_token_bytes() -> usize {
    32
}

fn default_max_generation_attempts() -> u32 {
    5
}
