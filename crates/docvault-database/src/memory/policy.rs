//! In-memory policy store using a Tokio mutex.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use docvault_core::result::AppResult;
use docvault_core::types::id::PolicyId;
use docvault_entity::policy::{
    AccessPolicy, NewAccessPolicy, ResourceType, SubjectType, UpdateAccessPolicy,
};

use crate::store::PolicyStore;

/// In-memory policy store.
#[derive(Debug, Clone, Default)]
pub struct MemoryPolicyStore {
    policies: Arc<Mutex<HashMap<PolicyId, AccessPolicy>>>,
}

impl MemoryPolicyStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn by_priority(mut policies: Vec<AccessPolicy>) -> Vec<AccessPolicy> {
    policies.sort_by(|a, b| {
        a.priority
            .cmp(&b.priority)
            .then_with(|| a.created_at.cmp(&b.created_at))
    });
    policies
}

#[async_trait]
impl PolicyStore for MemoryPolicyStore {
    async fn create(&self, policy: &NewAccessPolicy) -> AppResult<AccessPolicy> {
        let now = Utc::now();
        let row = AccessPolicy {
            id: PolicyId::new(),
            name: policy.name.clone(),
            description: policy.description.clone(),
            subject_type: policy.subject_type,
            subject_id: policy.subject_id.clone(),
            resource_type: policy.resource_type,
            resource_id: policy.resource_id,
            actions: policy.actions.clone(),
            is_active: policy.is_active,
            priority: policy.priority,
            created_at: now,
            updated_at: now,
        };
        self.policies.lock().await.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find_by_id(&self, id: PolicyId) -> AppResult<Option<AccessPolicy>> {
        Ok(self.policies.lock().await.get(&id).cloned())
    }

    async fn update(
        &self,
        id: PolicyId,
        changes: &UpdateAccessPolicy,
    ) -> AppResult<Option<AccessPolicy>> {
        let mut policies = self.policies.lock().await;
        Ok(policies.get_mut(&id).map(|policy| {
            changes.apply_to(policy, Utc::now());
            policy.clone()
        }))
    }

    async fn delete(&self, id: PolicyId) -> AppResult<bool> {
        Ok(self.policies.lock().await.remove(&id).is_some())
    }

    async fn delete_by_resource(
        &self,
        resource_type: ResourceType,
        resource_id: Uuid,
    ) -> AppResult<u64> {
        let mut policies = self.policies.lock().await;
        let before = policies.len();
        policies.retain(|_, p| {
            !(p.resource_type == resource_type && p.resource_id == Some(resource_id))
        });
        Ok((before - policies.len()) as u64)
    }

    async fn delete_by_subject(
        &self,
        subject_type: SubjectType,
        subject_id: &str,
    ) -> AppResult<u64> {
        let mut policies = self.policies.lock().await;
        let before = policies.len();
        policies.retain(|_, p| !(p.subject_type == subject_type && p.subject_id == subject_id));
        Ok((before - policies.len()) as u64)
    }

    async fn find_applicable(
        &self,
        subject_keys: &[String],
        resource_type: ResourceType,
        resource_id: Uuid,
    ) -> AppResult<Vec<AccessPolicy>> {
        let policies = self.policies.lock().await;
        Ok(by_priority(
            policies
                .values()
                .filter(|p| {
                    subject_keys.contains(&p.subject_id)
                        && p.resource_type == resource_type
                        && p.resource_id.is_none_or(|id| id == resource_id)
                })
                .cloned()
                .collect(),
        ))
    }

    async fn list_by_resource(
        &self,
        resource_type: ResourceType,
        resource_id: Uuid,
    ) -> AppResult<Vec<AccessPolicy>> {
        let policies = self.policies.lock().await;
        Ok(by_priority(
            policies
                .values()
                .filter(|p| p.resource_type == resource_type && p.resource_id == Some(resource_id))
                .cloned()
                .collect(),
        ))
    }
}
