//! Token string and expiry validation.

use chrono::{DateTime, Duration, Utc};
use docvault_core::{AppError, AppResult};

/// Shortest accepted token string.
pub const MIN_TOKEN_LENGTH: usize = 32;
/// Longest accepted token string.
pub const MAX_TOKEN_LENGTH: usize = 64;

/// Token strings are 32..=64 characters from the URL-safe base64 alphabet.
pub fn validate_token_format(token: &str) -> AppResult<()> {
    let len = token.len();
    if !(MIN_TOKEN_LENGTH..=MAX_TOKEN_LENGTH).contains(&len) {
        return Err(AppError::validation("Malformed download token"));
    }
    if !token
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    {
        return Err(AppError::validation("Malformed download token"));
    }
    Ok(())
}

/// Expiry is strictly after `now` and no further out than `max_ttl`.
pub fn validate_expiry(
    expires_at: DateTime<Utc>,
    now: DateTime<Utc>,
    max_ttl: Duration,
) -> AppResult<DateTime<Utc>> {
    if expires_at <= now {
        return Err(AppError::validation("Token expiry must be in the future"));
    }
    if expires_at > now + max_ttl {
        return Err(AppError::validation(format!(
            "Token expiry exceeds the maximum window of {} seconds",
            max_ttl.num_seconds()
        )));
    }
    Ok(expires_at)
}
