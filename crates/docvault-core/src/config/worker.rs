//! Background worker configuration.

use serde::{Deserialize, Serialize};

/// Maintenance scheduler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether the maintenance scheduler runs alongside the service.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Six-field cron expression for expired-token cleanup.
    #[serde(default = "default_token_cleanup_cron")]
    pub token_cleanup_cron: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            token_cleanup_cron: default_token_cleanup_cron(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_token_cleanup_cron() -> String {
    "0 */15 * * * *".to_string()
}
