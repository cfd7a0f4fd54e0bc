//! Audit log repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use docvault_core::error::{AppError, ErrorKind};
use docvault_core::events::AuditEvent;
use docvault_core::result::AppResult;
use docvault_core::traits::AuditSink;
use docvault_entity::audit::AuditLogEntry;

/// Repository for the append-only `audit_log` table.
#[derive(Debug, Clone)]
pub struct AuditLogRepository {
    pool: PgPool,
}

impl AuditLogRepository {
    /// Create a new audit log repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Most recent entries for a resource.
    pub async fn find_by_resource(&self, resource_id: Uuid, limit: i64) -> AppResult<Vec<AuditLogEntry>> {
        sqlx::query_as::<_, AuditLogEntry>(
            "SELECT * FROM audit_log WHERE resource_id = $1 ORDER BY created_at DESC LIMIT $2",
        )
        .bind(resource_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to read audit log", e))
    }
}

#[async_trait]
impl AuditSink for AuditLogRepository {
    async fn log_event(&self, event: AuditEvent) -> AppResult<()> {
        let entry = AuditLogEntry::from(event);
        sqlx::query(
            "INSERT INTO audit_log (id, kind, subject_id, resource_id, outcome, detail, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(entry.id)
        .bind(&entry.kind)
        .bind(entry.subject_id)
        .bind(entry.resource_id)
        .bind(&entry.outcome)
        .bind(&entry.detail)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to write audit entry", e))?;
        Ok(())
    }
}
