//! Random, URL-safe token strings.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;

use docvault_core::config::TokenConfig;
use docvault_core::config::token::{MAX_TOKEN_BYTES, MIN_TOKEN_BYTES};
use docvault_core::error::AppError;

/// Generates download token strings from the OS-seeded thread RNG.
#[derive(Debug, Clone)]
pub struct TokenGenerator {
    byte_len: usize,
}

impl TokenGenerator {
    /// Create a generator producing `byte_len` random bytes per token.
    ///
    /// 24..=48 bytes encode to 32..=64 unpadded URL-safe characters.
    pub fn new(byte_len: usize) -> Result<Self, AppError> {
        if !(MIN_TOKEN_BYTES..=MAX_TOKEN_BYTES).contains(&byte_len) {
            return Err(AppError::configuration(format!(
                "Token length must be {MIN_TOKEN_BYTES}..={MAX_TOKEN_BYTES} bytes, got {byte_len}"
            )));
        }
        Ok(Self { byte_len })
    }

    /// Create a generator from token configuration.
    pub fn from_config(config: &TokenConfig) -> Result<Self, AppError> {
        Self::new(config.token_bytes)
    }

    /// Produce a fresh token string.
    pub fn generate(&self) -> String {
        let mut bytes = vec![0u8; self.byte_len];
        rand::thread_rng().fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }
}

impl Default for TokenGenerator {
    fn default() -> Self {
        Self { byte_len: 32 }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_length_bounds() {
        assert_eq!(TokenGenerator::new(24).unwrap().generate().len(), 32);
        assert_eq!(TokenGenerator::new(48).unwrap().generate().len(), 64);
        assert_eq!(TokenGenerator::default().generate().len(), 43);
        assert!(TokenGenerator::new(23).is_err());
        assert!(TokenGenerator::new(49).is_err());
    }

    #[test]
    fn test_url_safe_alphabet() {
        let token = TokenGenerator::default().generate();
        assert!(
            token
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        );
    }

    #[test]
    fn test_tokens_do_not_repeat() {
        let generator = TokenGenerator::default();
        let tokens: HashSet<String> = (0..1000).map(|_| generator.generate()).collect();
        assert_eq!(tokens.len(), 1000);
    }
}
