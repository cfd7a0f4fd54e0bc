//! The fixed action vocabulary.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// An action a policy can grant.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "policy_action", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PolicyAction {
    /// Read content and metadata.
    Read,
    /// Add new versions.
    Write,
    /// Delete versions or the document.
    Delete,
    /// Grant and revoke access for others.
    Manage,
}

impl PolicyAction {
    /// Every action, in evaluation order.
    pub const ALL: [PolicyAction; 4] = [Self::Read, Self::Write, Self::Delete, Self::Manage];

    /// Return the action as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Delete => "delete",
            Self::Manage => "manage",
        }
    }
}

impl std::fmt::Display for PolicyAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PolicyAction {
    type Err = docvault_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "read" => Ok(Self::Read),
            "write" => Ok(Self::Write),
            "delete" => Ok(Self::Delete),
            "manage" => Ok(Self::Manage),
            _ => Err(docvault_core::AppError::validation(format!(
                "Invalid policy action: '{s}'"
            ))),
        }
    }
}

/// A set of actions with stable ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionSet(BTreeSet<PolicyAction>);

impl ActionSet {
    /// The empty set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Every action.
    pub fn all() -> Self {
        PolicyAction::ALL.into_iter().collect()
    }

    /// Add an action.
    pub fn insert(&mut self, action: PolicyAction) -> bool {
        self.0.insert(action)
    }

    /// Whether the set contains `action`.
    pub fn contains(&self, action: PolicyAction) -> bool {
        self.0.contains(&action)
    }

    /// Number of actions.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no action is present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate in vocabulary order.
    pub fn iter(&self) -> impl Iterator<Item = PolicyAction> + '_ {
        self.0.iter().copied()
    }

    /// Collect into a vector in vocabulary order.
    pub fn to_vec(&self) -> Vec<PolicyAction> {
        self.0.iter().copied().collect()
    }
}

impl FromIterator<PolicyAction> for ActionSet {
    fn from_iter<I: IntoIterator<Item = PolicyAction>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
