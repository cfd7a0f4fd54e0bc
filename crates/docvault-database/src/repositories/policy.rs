//! Access policy repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use docvault_core::error::{AppError, ErrorKind};
use docvault_core::result::AppResult;
use docvault_core::types::id::PolicyId;
use docvault_entity::policy::{
    AccessPolicy, NewAccessPolicy, ResourceType, SubjectType, UpdateAccessPolicy,
};

use crate::store::PolicyStore;

/// Repository for the `access_policies` table.
#[derive(Debug, Clone)]
pub struct PolicyRepository {
    pool: PgPool,
}

impl PolicyRepository {
    /// Create a new policy repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PolicyStore for PolicyRepository {
    async fn create(&self, policy: &NewAccessPolicy) -> AppResult<AccessPolicy> {
        sqlx::query_as::<_, AccessPolicy>(
            "INSERT INTO access_policies (name, description, subject_type, subject_id, \
             resource_type, resource_id, actions, is_active, priority) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING *",
        )
        .bind(&policy.name)
        .bind(&policy.description)
        .bind(policy.subject_type)
        .bind(&policy.subject_id)
        .bind(policy.resource_type)
        .bind(policy.resource_id)
        .bind(&policy.actions)
        .bind(policy.is_active)
        .bind(policy.priority)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to create policy", e))
    }

    async fn find_by_id(&self, id: PolicyId) -> AppResult<Option<AccessPolicy>> {
        sqlx::query_as::<_, AccessPolicy>("SELECT * FROM access_policies WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to find policy", e))
    }

    async fn update(
        &self,
        id: PolicyId,
        changes: &UpdateAccessPolicy,
    ) -> AppResult<Option<AccessPolicy>> {
        sqlx::query_as::<_, AccessPolicy>(
            "UPDATE access_policies SET \
             actions = COALESCE($2, actions), \
             priority = COALESCE($3, priority), \
             is_active = COALESCE($4, is_active), \
             updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&changes.actions)
        .bind(changes.priority)
        .bind(changes.is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to update policy", e))
    }

    async fn delete(&self, id: PolicyId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM access_policies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to delete policy", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_resource(
        &self,
        resource_type: ResourceType,
        resource_id: Uuid,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            "DELETE FROM access_policies WHERE resource_type = $1 AND resource_id = $2",
        )
        .bind(resource_type)
        .bind(resource_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to delete resource policies", e)
        })?;
        Ok(result.rows_affected())
    }

    async fn delete_by_subject(
        &self,
        subject_type: SubjectType,
        subject_id: &str,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            "DELETE FROM access_policies WHERE subject_type = $1 AND subject_id = $2",
        )
        .bind(subject_type)
        .bind(subject_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to delete subject policies", e)
        })?;
        Ok(result.rows_affected())
    }

    async fn find_applicable(
        &self,
        subject_keys: &[String],
        resource_type: ResourceType,
        resource_id: Uuid,
    ) -> AppResult<Vec<AccessPolicy>> {
        sqlx::query_as::<_, AccessPolicy>(
            "SELECT * FROM access_policies \
             WHERE subject_id = ANY($1) AND resource_type = $2 \
             AND (resource_id IS NULL OR resource_id = $3) \
             ORDER BY priority ASC, created_at ASC",
        )
        .bind(subject_keys)
        .bind(resource_type)
        .bind(resource_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to load applicable policies", e)
        })
    }

    async fn list_by_resource(
        &self,
        resource_type: ResourceType,
        resource_id: Uuid,
    ) -> AppResult<Vec<AccessPolicy>> {
        sqlx::query_as::<_, AccessPolicy>(
            "SELECT * FROM access_policies WHERE resource_type = $1 AND resource_id = $2 \
             ORDER BY priority ASC, created_at ASC",
        )
        .bind(resource_type)
        .bind(resource_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to list policies", e))
    }
}
