//! Access policy storage contract.

use async_trait::async_trait;
use uuid::Uuid;

use docvault_core::result::AppResult;
use docvault_core::types::id::PolicyId;
use docvault_entity::policy::{
    AccessPolicy, NewAccessPolicy, ResourceType, SubjectType, UpdateAccessPolicy,
};

/// Storage for access policies.
#[async_trait]
pub trait PolicyStore: Send + Sync + std::fmt::Debug + 'static {
    /// Persist a validated policy.
    async fn create(&self, policy: &NewAccessPolicy) -> AppResult<AccessPolicy>;

    /// Find a policy by id.
    async fn find_by_id(&self, id: PolicyId) -> AppResult<Option<AccessPolicy>>;

    /// Apply the set fields and bump `updated_at`. `None` if the id is unknown.
    async fn update(
        &self,
        id: PolicyId,
        changes: &UpdateAccessPolicy,
    ) -> AppResult<Option<AccessPolicy>>;

    /// Remove one policy.
    async fn delete(&self, id: PolicyId) -> AppResult<bool>;

    /// Remove every policy naming a specific resource.
    async fn delete_by_resource(
        &self,
        resource_type: ResourceType,
        resource_id: Uuid,
    ) -> AppResult<u64>;

    /// Remove every policy granted to a subject.
    async fn delete_by_subject(&self, subject_type: SubjectType, subject_id: &str)
    -> AppResult<u64>;

    /// Policies whose `subject_id` is one of `subject_keys` and that cover the
    /// resource (specifically or class-wide), ordered by ascending priority.
    ///
    /// Inactive policies are included; the engine filters them.
    async fn find_applicable(
        &self,
        subject_keys: &[String],
        resource_type: ResourceType,
        resource_id: Uuid,
    ) -> AppResult<Vec<AccessPolicy>>;

    /// Policies that name a specific resource, ordered by ascending priority.
    async fn list_by_resource(
        &self,
        resource_type: ResourceType,
        resource_id: Uuid,
    ) -> AppResult<Vec<AccessPolicy>>;
}
