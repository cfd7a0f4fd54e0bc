//! Evaluation inputs: who is asking and what they are asking about.

use docvault_core::types::id::UserId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::model::{AccessPolicy, ResourceType, SubjectType};

/// The acting subject of an access check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    /// User id.
    pub id: UserId,
    /// Role names held by the user.
    pub roles: Vec<String>,
    /// Inactive subjects are denied everything.
    pub is_active: bool,
    /// Admins bypass the policy list.
    pub is_admin: bool,
}

impl Subject {
    /// An active, non-admin user with the given roles.
    pub fn user(id: UserId, roles: Vec<String>) -> Self {
        Self {
            id,
            roles,
            is_active: true,
            is_admin: false,
        }
    }

    /// An active admin.
    pub fn admin(id: UserId) -> Self {
        Self {
            id,
            roles: Vec::new(),
            is_active: true,
            is_admin: true,
        }
    }

    /// Whether `policy` names this subject directly or through a role.
    pub fn matches(&self, policy: &AccessPolicy) -> bool {
        match policy.subject_type {
            SubjectType::User => policy.subject_id == self.id.to_string(),
            SubjectType::Role => self.roles.iter().any(|r| r == &policy.subject_id),
        }
    }

    /// The `subject_id` strings under which policies for this subject are stored.
    pub fn subject_keys(&self) -> Vec<String> {
        let mut keys = Vec::with_capacity(self.roles.len() + 1);
        keys.push(self.id.to_string());
        keys.extend(self.roles.iter().cloned());
        keys
    }
}

/// The target of an access check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    /// Kind of resource.
    pub resource_type: ResourceType,
    /// Resource id.
    pub id: Uuid,
    /// Owner or uploader, if the resource has one.
    pub owner_id: Option<UserId>,
    /// `false` once the resource is soft-deleted.
    pub is_accessible: bool,
}

impl Resource {
    /// Whether `policy` covers this resource.
    pub fn matches(&self, policy: &AccessPolicy) -> bool {
        policy.resource_type == self.resource_type
            && policy.resource_id.is_none_or(|id| id == self.id)
    }
}
