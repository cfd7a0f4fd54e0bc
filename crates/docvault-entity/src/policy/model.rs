//! Access policy entity model.

use chrono::{DateTime, Utc};
use docvault_core::types::id::PolicyId;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::action::{ActionSet, PolicyAction};

/// Who a policy is granted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "subject_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SubjectType {
    /// A single user; `subject_id` is the user's UUID.
    User,
    /// Every holder of a role; `subject_id` is the role name.
    Role,
}

impl SubjectType {
    /// Return the type as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Role => "role",
        }
    }
}

impl std::fmt::Display for SubjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SubjectType {
    type Err = docvault_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Self::User),
            "role" => Ok(Self::Role),
            _ => Err(docvault_core::AppError::validation(format!(
                "Invalid subject type: '{s}'"
            ))),
        }
    }
}

/// What class of resource a policy covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "resource_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    /// A document.
    Document,
    /// A user account.
    User,
}

impl ResourceType {
    /// Return the type as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::User => "user",
        }
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ResourceType {
    type Err = docvault_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "document" => Ok(Self::Document),
            "user" => Ok(Self::User),
            _ => Err(docvault_core::AppError::validation(format!(
                "Invalid resource type: '{s}'"
            ))),
        }
    }
}

/// A grant of actions to a subject over one resource or a whole resource class.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AccessPolicy {
    /// Unique policy identifier.
    pub id: PolicyId,
    /// Short name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Kind of subject.
    pub subject_type: SubjectType,
    /// User UUID or role name.
    pub subject_id: String,
    /// Kind of resource.
    pub resource_type: ResourceType,
    /// Specific resource, or `None` for every resource of the type.
    pub resource_id: Option<Uuid>,
    /// Granted actions.
    pub actions: Vec<PolicyAction>,
    /// Inactive policies are ignored by evaluation.
    pub is_active: bool,
    /// 1..=1000, lower value takes precedence.
    pub priority: i32,
    /// When the policy was created.
    pub created_at: DateTime<Utc>,
    /// When the policy was last modified.
    pub updated_at: DateTime<Utc>,
}

impl AccessPolicy {
    /// Whether this policy's action list contains `action`.
    pub fn grants(&self, action: PolicyAction) -> bool {
        self.actions.contains(&action)
    }

    /// The granted actions as a set.
    pub fn action_set(&self) -> ActionSet {
        self.actions.iter().copied().collect()
    }
}

/// Data required to create a new policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAccessPolicy {
    /// Short name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Kind of subject.
    pub subject_type: SubjectType,
    /// User UUID or role name.
    pub subject_id: String,
    /// Kind of resource.
    pub resource_type: ResourceType,
    /// Specific resource or `None` for all.
    pub resource_id: Option<Uuid>,
    /// Granted actions.
    pub actions: Vec<PolicyAction>,
    /// Initial active flag.
    pub is_active: bool,
    /// Priority 1..=1000.
    pub priority: i32,
}

/// Mutable fields of an existing policy. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAccessPolicy {
    /// Replacement action list.
    pub actions: Option<Vec<PolicyAction>>,
    /// Replacement priority.
    pub priority: Option<i32>,
    /// Replacement active flag.
    pub is_active: Option<bool>,
}

impl UpdateAccessPolicy {
    /// Whether no field is set.
    pub fn is_empty(&self) -> bool {
        self.actions.is_none() && self.priority.is_none() && self.is_active.is_none()
    }

    /// Apply the set fields onto `policy`.
    pub fn apply_to(&self, policy: &mut AccessPolicy, now: DateTime<Utc>) {
        if let Some(actions) = &self.actions {
            policy.actions = actions.clone();
        }
        if let Some(priority) = self.priority {
            policy.priority = priority;
        }
        if let Some(is_active) = self.is_active {
            policy.is_active = is_active;
        }
        policy.updated_at = now;
    }
}
