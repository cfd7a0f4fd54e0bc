//! PostgreSQL pool for the DocVault stores.
//!
//! [`DatabasePool`] owns the connection pool, brings the schema up to date,
//! and hands out the repositories that back each store.

use std::time::Duration;

use serde::Serialize;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{info, warn};

use docvault_core::config::DatabaseConfig;
use docvault_core::error::{AppError, ErrorKind};
use docvault_core::result::AppResult;

use crate::migration::{MIGRATOR, run_migrations};
use crate::repositories::{
    AuditLogRepository, DocumentRepository, PolicyRepository, TokenRepository, VersionRepository,
};

/// Schema state after [`DatabasePool::prepare`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SchemaReport {
    /// Migrations embedded in this build.
    pub known: usize,
    /// Migrations recorded as applied in the database.
    pub applied: i64,
    /// Highest applied migration version.
    pub latest: Option<i64>,
}

impl SchemaReport {
    /// Whether every embedded migration has been applied.
    pub fn is_current(&self) -> bool {
        usize::try_from(self.applied).is_ok_and(|applied| applied >= self.known)
    }
}

/// One PostgreSQL repository per store, all on the same pool.
#[derive(Debug, Clone)]
pub struct Repositories {
    /// Document versions.
    pub versions: VersionRepository,
    /// Access policies.
    pub policies: PolicyRepository,
    /// Download tokens.
    pub tokens: TokenRepository,
    /// Document directory.
    pub documents: DocumentRepository,
    /// Audit log.
    pub audit: AuditLogRepository,
}

/// Shared PostgreSQL pool behind every DocVault repository.
#[derive(Debug, Clone)]
pub struct DatabasePool {
    pool: PgPool,
}

impl DatabasePool {
    /// Open the pool described by `config`.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        let target = redact_credentials(&config.url);
        info!(
            url = %target,
            max_connections = config.max_connections,
            "Opening DocVault database pool"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
            .connect(&config.url)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to connect to {target}"),
                    e,
                )
            })?;

        Ok(Self { pool })
    }

    /// Repositories for every store.
    pub fn repositories(&self) -> Repositories {
        Repositories {
            versions: VersionRepository::new(self.pool.clone()),
            policies: PolicyRepository::new(self.pool.clone()),
            tokens: TokenRepository::new(self.pool.clone()),
            documents: DocumentRepository::new(self.pool.clone()),
            audit: AuditLogRepository::new(self.pool.clone()),
        }
    }

    /// Round-trip a trivial query.
    pub async fn ping(&self) -> AppResult<()> {
        let one: i32 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Storage, "Database ping failed", e))?;
        if one != 1 {
            return Err(AppError::storage("Database ping returned an unexpected value"));
        }
        Ok(())
    }

    /// Ping, apply pending migrations, and report the resulting schema state.
    pub async fn prepare(&self) -> AppResult<SchemaReport> {
        self.ping().await?;
        run_migrations(&self.pool).await?;

        let report = self.schema_report().await?;
        if report.is_current() {
            info!(applied = report.applied, latest = ?report.latest, "Schema is current");
        } else {
            warn!(
                known = report.known,
                applied = report.applied,
                "Schema is behind the embedded migrations"
            );
        }
        Ok(report)
    }

    /// Applied migrations as recorded by sqlx.
    pub async fn schema_report(&self) -> AppResult<SchemaReport> {
        let (applied, latest): (i64, Option<i64>) = sqlx::query_as(
            "SELECT COUNT(*), MAX(version) FROM _sqlx_migrations WHERE success",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to read migration history", e))?;

        Ok(SchemaReport {
            known: MIGRATOR.iter().count(),
            applied,
            latest,
        })
    }

    /// Close every connection.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("DocVault database pool closed");
    }
}

/// Replace the password in `user:password@host` URLs so they can be logged.
pub fn redact_credentials(url: &str) -> String {
    let (scheme, rest) = match url.split_once("://") {
        Some((scheme, rest)) => (Some(scheme), rest),
        None => (None, url),
    };
    let Some((userinfo, host)) = rest.rsplit_once('@') else {
        return url.to_string();
    };
    let Some((user, _)) = userinfo.split_once(':') else {
        return url.to_string();
    };

    match scheme {
        Some(scheme) => format!("{scheme}://{user}:****@{host}"),
        None => format!("{user}:****@{host}"),
    }
}
