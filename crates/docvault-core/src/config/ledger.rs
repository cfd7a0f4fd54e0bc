//! Document version ledger configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Limits applied when recording new document versions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Maximum accepted content size in bytes (default 5 GiB).
    #[serde(default = "default_max_file_size")]
    pub max_file_size_bytes: i64,
    /// How many times `create` re-reads the next version number after
    /// losing a concurrent insert race.
    #[serde(default = "default_max_version_retries")]
    pub max_version_retries: u32,
    /// Maximum number of distinct tags on one version.
    #[serde(default = "default_max_tags")]
    pub max_tags: usize,
    /// Maximum filename length in characters.
    #[serde(default = "default_max_filename_length")]
    pub max_filename_length: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_file_size_bytes: default_max_file_size(),
            max_version_retries: default_max_version_retries(),
            max_tags: default_max_tags(),
            max_filename_length: default_max_filename_length(),
        }
    }
}

impl LedgerConfig {
    /// Reject nonsensical limits.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.max_file_size_bytes <= 0 {
            return Err(AppError::configuration(
                "ledger.max_file_size_bytes must be positive",
            ));
        }
        if self.max_version_retries == 0 {
            return Err(AppError::configuration(
                "ledger.max_version_retries must be at least 1",
            ));
        }
        Ok(())
    }
}

fn default_max_file_size() -> i64 {
    5_368_709_120 // 5 GiB
}

fn default_max_version_retries() -> u32 {
    3
}

fn default_max_tags() -> usize {
    20
}

fn default_max_filename_length() -> usize {
    255
}
