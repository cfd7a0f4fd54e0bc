//! Request context carrying the acting user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use docvault_core::types::id::UserId;
use docvault_entity::policy::Subject;

/// Context for the current request.
///
/// Built by the caller's authentication layer and passed into service
/// methods so that every operation knows who is acting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The acting user's ID.
    pub user_id: UserId,
    /// Role names held by the user.
    pub roles: Vec<String>,
    /// Whether the user has the admin capability.
    pub is_admin: bool,
    /// Whether the account is active.
    pub is_active: bool,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(user_id: UserId, roles: Vec<String>, is_admin: bool) -> Self {
        Self {
            user_id,
            roles,
            is_admin,
            is_active: true,
            request_time: Utc::now(),
        }
    }

    /// An active, non-admin user without roles.
    pub fn user(user_id: UserId) -> Self {
        Self::new(user_id, Vec::new(), false)
    }

    /// An active admin.
    pub fn admin(user_id: UserId) -> Self {
        Self::new(user_id, Vec::new(), true)
    }

    /// Replace the role list.
    pub fn with_roles(mut self, roles: Vec<String>) -> Self {
        self.roles = roles;
        self
    }

    /// Returns whether the current user is an active admin.
    pub fn is_active_admin(&self) -> bool {
        self.is_active && self.is_admin
    }

    /// The policy-engine view of this user.
    pub fn subject(&self) -> Subject {
        Subject {
            id: self.user_id,
            roles: self.roles.clone(),
            is_active: self.is_active,
            is_admin: self.is_admin,
        }
    }
}
