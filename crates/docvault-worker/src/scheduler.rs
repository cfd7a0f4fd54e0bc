//! Cron scheduler for periodic maintenance tasks.

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};

use docvault_core::config::WorkerConfig;
use docvault_core::error::AppError;

use crate::jobs::TokenCleanupJob;

/// Cron-based scheduler for periodic background tasks
pub struct MaintenanceScheduler {
    /// The underlying job scheduler
    scheduler: JobScheduler,
    /// Expired token cleanup
    token_cleanup: TokenCleanupJob,
}

impl std::fmt::Debug for MaintenanceScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaintenanceScheduler")
            .field("token_cleanup", &self.token_cleanup)
            .finish()
    }
}

impl MaintenanceScheduler {
    /// Create a new maintenance scheduler
    pub async fn new(token_cleanup: TokenCleanupJob) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {e}")))?;

        Ok(Self {
            scheduler,
            token_cleanup,
        })
    }

    /// Register all scheduled tasks from configuration
    pub async fn register_default_tasks(&self, config: &WorkerConfig) -> Result<(), AppError> {
        self.register_token_cleanup(&config.token_cleanup_cron)
            .await?;

        tracing::info!("All scheduled tasks registered");
        Ok(())
    }

    /// Start the scheduler
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {e}")))?;

        tracing::info!("Maintenance scheduler started");
        Ok(())
    }

    /// Shutdown the scheduler
    pub async fn shutdown(&self) -> Result<(), AppError> {
        let mut scheduler = self.scheduler.clone();
        scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {e}")))?;

        tracing::info!("Maintenance scheduler shut down");
        Ok(())
    }

    /// Expired token cleanup on `cron`
    async fn register_token_cleanup(&self, cron: &str) -> Result<(), AppError> {
        let cleanup = self.token_cleanup.clone();
        let job = CronJob::new_async(cron, move |_uuid, _lock| {
            let cleanup = cleanup.clone();
            Box::pin(async move {
                if let Err(e) = cleanup.run().await {
                    tracing::error!(error = %e, "Expired token cleanup failed");
                }
            })
        })
        .map_err(|e| {
            AppError::configuration(format!("Invalid token_cleanup schedule '{cron}': {e}"))
        })?;

        self.scheduler.add(job).await.map_err(|e| {
            AppError::internal(format!("Failed to add token_cleanup schedule: {e}"))
        })?;

        tracing::info!(cron, "Registered: token_cleanup");
        Ok(())
    }
}
