//! Access policy engine.
//!
//! Evaluation order:
//! 1. Inactive subject — deny.
//! 2. Inaccessible resource — deny.
//! 3. Admin bypass — allow without looking at policies.
//! 4. Active policies matching the subject and resource, ascending priority.
//!    The first one whose actions contain the request allows it.
//! 5. Otherwise deny.
//!
//! Policies only ever grant. Priority picks which policy is reported as the
//! grantor; it never turns an allow into a deny.
//!
//! The engine holds no state and never loads policies. Callers pass the
//! snapshot to evaluate against.

use serde::{Deserialize, Serialize};
use tracing::debug;

use docvault_core::error::AppError;
use docvault_core::result::AppResult;
use docvault_core::types::id::PolicyId;
use docvault_entity::policy::{AccessPolicy, ActionSet, PolicyAction, Resource, Subject};

/// Where an access decision came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionSource {
    /// The subject is an admin.
    AdminBypass,
    /// The subject owns the resource. Produced by calling workflows, never
    /// by the engine itself.
    Owner,
    /// An applicable policy granted the action.
    Policy,
    /// No applicable policy granted the action.
    Denied,
}

/// Outcome of one access check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessDecision {
    /// Whether the action is permitted.
    pub allowed: bool,
    /// Why.
    pub source: DecisionSource,
    /// The highest-precedence policy granting the action, if any.
    pub granted_by: Option<PolicyId>,
}

impl AccessDecision {
    fn denied() -> Self {
        Self {
            allowed: false,
            source: DecisionSource::Denied,
            granted_by: None,
        }
    }

    fn admin() -> Self {
        Self {
            allowed: true,
            source: DecisionSource::AdminBypass,
            granted_by: None,
        }
    }

    fn policy(id: PolicyId) -> Self {
        Self {
            allowed: true,
            source: DecisionSource::Policy,
            granted_by: Some(id),
        }
    }
}

/// Stateless evaluator over a supplied policy snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolicyEngine;

impl PolicyEngine {
    /// Create a new engine.
    pub fn new() -> Self {
        Self
    }

    /// Decide whether `subject` may perform `action` on `resource`.
    pub fn decide(
        &self,
        subject: &Subject,
        resource: &Resource,
        action: PolicyAction,
        policies: &[AccessPolicy],
    ) -> AccessDecision {
        if !subject.is_active || !resource.is_accessible {
            return AccessDecision::denied();
        }
        if subject.is_admin {
            return AccessDecision::admin();
        }

        let decision = Self::applicable(subject, resource, policies)
            .into_iter()
            .find(|p| p.grants(action))
            .map(|p| AccessDecision::policy(p.id))
            .unwrap_or_else(AccessDecision::denied);

        debug!(
            subject_id = %subject.id,
            resource_id = %resource.id,
            action = %action,
            allowed = decision.allowed,
            "Access evaluated"
        );
        decision
    }

    /// Whether `subject` may perform `action` on `resource`.
    pub fn evaluate(
        &self,
        subject: &Subject,
        resource: &Resource,
        action: PolicyAction,
        policies: &[AccessPolicy],
    ) -> bool {
        self.decide(subject, resource, action, policies).allowed
    }

    /// Every action `subject` may perform on `resource`.
    ///
    /// Fails with a business-rule error when the subject is inactive or the
    /// resource is inaccessible, so callers can tell "nothing permitted"
    /// apart from "cannot be evaluated".
    pub fn get_effective_permissions(
        &self,
        subject: &Subject,
        resource: &Resource,
        policies: &[AccessPolicy],
    ) -> AppResult<ActionSet> {
        if !subject.is_active {
            return Err(AppError::business_rule(format!(
                "Cannot evaluate permissions for inactive subject {}",
                subject.id
            )));
        }
        if !resource.is_accessible {
            return Err(AppError::business_rule(format!(
                "Cannot evaluate permissions on inaccessible {} {}",
                resource.resource_type, resource.id
            )));
        }
        if subject.is_admin {
            return Ok(ActionSet::all());
        }

        Ok(PolicyAction::ALL
            .into_iter()
            .filter(|action| self.evaluate(subject, resource, *action, policies))
            .collect())
    }

    /// Whether `subject` owns `resource`.
    pub fn is_owner(&self, subject: &Subject, resource: &Resource) -> bool {
        resource.owner_id == Some(subject.id)
    }

    /// Active policies covering this subject and resource, by ascending priority.
    fn applicable<'a>(
        subject: &Subject,
        resource: &Resource,
        policies: &'a [AccessPolicy],
    ) -> Vec<&'a AccessPolicy> {
        let mut applicable: Vec<&AccessPolicy> = policies
            .iter()
            .filter(|p| p.is_active && subject.matches(p) && resource.matches(p))
            .collect();
        applicable.sort_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        applicable
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use docvault_core::ErrorKind;
    use docvault_core::types::id::UserId;
    use docvault_entity::policy::{ResourceType, SubjectType};
    use uuid::Uuid;

    use super::*;

    fn policy(
        subject_type: SubjectType,
        subject_id: &str,
        resource_id: Option<Uuid>,
        actions: &[PolicyAction],
        priority: i32,
    ) -> AccessPolicy {
        let now = Utc::now();
        AccessPolicy {
            id: PolicyId::new(),
            name: format!("policy-{priority}"),
            description: None,
            subject_type,
            subject_id: subject_id.to_string(),
            resource_type: ResourceType::Document,
            resource_id,
            actions: actions.to_vec(),
            is_active: true,
            priority,
            created_at: now,
            updated_at: now,
        }
    }

    fn document(owner: Option<UserId>) -> Resource {
        Resource {
            resource_type: ResourceType::Document,
            id: Uuid::new_v4(),
            owner_id: owner,
            is_accessible: true,
        }
    }

    #[test]
    fn test_read_grant_does_not_imply_write() {
        let engine = PolicyEngine::new();
        let user = Subject::user(UserId::new(), vec![]);
        let doc = document(None);
        let p = policy(
            SubjectType::User,
            &user.id.to_string(),
            Some(doc.id),
            &[PolicyAction::Read],
            10,
        );

        assert!(engine.evaluate(&user, &doc, PolicyAction::Read, &[p.clone()]));
        assert!(!engine.evaluate(&user, &doc, PolicyAction::Write, &[p]));
    }

    #[test]
    fn test_admin_allowed_with_no_policies() {
        let engine = PolicyEngine::new();
        let admin = Subject::admin(UserId::new());
        let decision = engine.decide(&admin, &document(None), PolicyAction::Manage, &[]);
        assert!(decision.allowed);
        assert_eq!(decision.source, DecisionSource::AdminBypass);
    }

    #[test]
    fn test_inactive_subject_denied_even_as_admin() {
        let engine = PolicyEngine::new();
        let mut admin = Subject::admin(UserId::new());
        admin.is_active = false;
        let doc = document(None);
        let p = policy(SubjectType::User, &admin.id.to_string(), None, &PolicyAction::ALL, 1);
        assert!(!engine.evaluate(&admin, &doc, PolicyAction::Read, &[p]));
    }

    #[test]
    fn test_inaccessible_resource_denied() {
        let engine = PolicyEngine::new();
        let admin = Subject::admin(UserId::new());
        let mut doc = document(None);
        doc.is_accessible = false;
        assert!(!engine.evaluate(&admin, &doc, PolicyAction::Read, &[]));
    }

    #[test]
    fn test_role_and_class_wide_policies_apply() {
        let engine = PolicyEngine::new();
        let user = Subject::user(UserId::new(), vec!["auditor".to_string()]);
        let doc = document(None);
        let p = policy(SubjectType::Role, "auditor", None, &[PolicyAction::Read], 100);
        assert!(engine.evaluate(&user, &doc, PolicyAction::Read, &[p]));
    }

    #[test]
    fn test_non_matching_policies_ignored() {
        let engine = PolicyEngine::new();
        let user = Subject::user(UserId::new(), vec!["viewer".to_string()]);
        let doc = document(None);
        let other_doc = policy(
            SubjectType::User,
            &user.id.to_string(),
            Some(Uuid::new_v4()),
            &[PolicyAction::Read],
            1,
        );
        let other_role = policy(SubjectType::Role, "editor", None, &[PolicyAction::Read], 1);
        let mut inactive = policy(
            SubjectType::User,
            &user.id.to_string(),
            None,
            &[PolicyAction::Read],
            1,
        );
        inactive.is_active = false;
        let mut user_class = policy(
            SubjectType::User,
            &user.id.to_string(),
            None,
            &[PolicyAction::Read],
            1,
        );
        user_class.resource_type = ResourceType::User;

        let snapshot = [other_doc, other_role, inactive, user_class];
        assert!(!engine.evaluate(&user, &doc, PolicyAction::Read, &snapshot));
    }

    #[test]
    fn test_role_name_equal_to_user_id_is_not_a_user_grant() {
        let engine = PolicyEngine::new();
        let user = Subject::user(UserId::new(), vec![]);
        let doc = document(None);
        let p = policy(SubjectType::Role, &user.id.to_string(), None, &[PolicyAction::Read], 1);
        assert!(!engine.evaluate(&user, &doc, PolicyAction::Read, &[p]));
    }

    #[test]
    fn test_lowest_priority_number_reported_as_grantor() {
        let engine = PolicyEngine::new();
        let user = Subject::user(UserId::new(), vec!["staff".to_string()]);
        let doc = document(None);
        let broad = policy(SubjectType::Role, "staff", None, &[PolicyAction::Read], 500);
        let narrow = policy(
            SubjectType::User,
            &user.id.to_string(),
            Some(doc.id),
            &[PolicyAction::Read, PolicyAction::Write],
            5,
        );
        let write_only_first = policy(SubjectType::Role, "staff", None, &[PolicyAction::Write], 1);

        let decision = engine.decide(
            &user,
            &doc,
            PolicyAction::Read,
            &[broad, write_only_first, narrow.clone()],
        );
        assert!(decision.allowed);
        assert_eq!(decision.source, DecisionSource::Policy);
        assert_eq!(decision.granted_by, Some(narrow.id));
    }

    #[test]
    fn test_effective_permissions_union() {
        let engine = PolicyEngine::new();
        let user = Subject::user(UserId::new(), vec!["editor".to_string()]);
        let doc = document(None);
        let snapshot = [
            policy(SubjectType::Role, "editor", None, &[PolicyAction::Write], 20),
            policy(
                SubjectType::User,
                &user.id.to_string(),
                Some(doc.id),
                &[PolicyAction::Read],
                10,
            ),
        ];
        let perms = engine.get_effective_permissions(&user, &doc, &snapshot).unwrap();
        assert_eq!(perms.to_vec(), vec![PolicyAction::Read, PolicyAction::Write]);

        let admin = Subject::admin(UserId::new());
        assert_eq!(
            engine.get_effective_permissions(&admin, &doc, &[]).unwrap(),
            ActionSet::all()
        );
    }

    #[test]
    fn test_effective_permissions_error_when_not_evaluable() {
        let engine = PolicyEngine::new();
        let mut user = Subject::user(UserId::new(), vec![]);
        user.is_active = false;
        let err = engine
            .get_effective_permissions(&user, &document(None), &[])
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::BusinessRule);

        let active = Subject::user(UserId::new(), vec![]);
        let mut gone = document(None);
        gone.is_accessible = false;
        assert!(engine.get_effective_permissions(&active, &gone, &[]).is_err());
        let empty = engine
            .get_effective_permissions(&active, &document(None), &[])
            .unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_is_owner() {
        let engine = PolicyEngine::new();
        let owner = Subject::user(UserId::new(), vec![]);
        let stranger = Subject::user(UserId::new(), vec![]);
        let doc = document(Some(owner.id));
        assert!(engine.is_owner(&owner, &doc));
        assert!(!engine.is_owner(&stranger, &doc));
        assert!(!engine.is_owner(&owner, &document(None)));
    }
}
