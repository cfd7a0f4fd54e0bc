//! Integration tests for access policies.

mod helpers;

use chrono::Utc;

use docvault_auth::{DecisionSource, PolicyEngine};
use docvault_core::ErrorKind;
use docvault_core::types::id::{PolicyId, UserId};
use docvault_entity::policy::{
    AccessPolicy, PolicyAction, Resource, ResourceType, Subject, SubjectType,
};
use docvault_service::RequestContext;
use uuid::Uuid;

fn read_policy(user: UserId, document: Uuid) -> AccessPolicy {
    let now = Utc::now();
    AccessPolicy {
        id: PolicyId::new(),
        name: "readers".to_string(),
        description: None,
        subject_type: SubjectType::User,
        subject_id: user.to_string(),
        resource_type: ResourceType::Document,
        resource_id: Some(document),
        actions: vec![PolicyAction::Read],
        is_active: true,
        priority: 10,
        created_at: now,
        updated_at: now,
    }
}

#[test]
fn test_read_policy_grants_read_only() {
    let engine = PolicyEngine::new();
    let user = UserId::new();
    let document = Uuid::new_v4();
    let subject = Subject::user(user, Vec::new());
    let resource = Resource {
        resource_type: ResourceType::Document,
        id: document,
        owner_id: None,
        is_accessible: true,
    };
    let policies = [read_policy(user, document)];

    assert!(engine.evaluate(&subject, &resource, PolicyAction::Read, &policies));
    assert!(!engine.evaluate(&subject, &resource, PolicyAction::Write, &policies));
}

#[test]
fn test_admin_and_inactive_override_policies() {
    let engine = PolicyEngine::new();
    let user = UserId::new();
    let document = Uuid::new_v4();
    let resource = Resource {
        resource_type: ResourceType::Document,
        id: document,
        owner_id: None,
        is_accessible: true,
    };

    let admin = Subject::admin(UserId::new());
    assert!(engine.evaluate(&admin, &resource, PolicyAction::Manage, &[]));

    let mut inactive = Subject::user(user, Vec::new());
    inactive.is_active = false;
    let policies = [read_policy(user, document)];
    assert!(!engine.evaluate(&inactive, &resource, PolicyAction::Read, &policies));
}

#[tokio::test]
async fn test_grant_check_and_revoke_through_service() {
    let app = helpers::TestApp::new();
    let (owner, doc) = app.create_document("Contract").await;
    let reader = UserId::new();
    let reader_ctx = RequestContext::user(reader);

    let policy = app
        .services
        .access
        .grant(&owner, helpers::policy_for(reader, doc, &[PolicyAction::Read], 10))
        .await
        .unwrap();

    let decision = app
        .services
        .access
        .check_access(&reader_ctx, doc, PolicyAction::Read)
        .await
        .unwrap();
    assert!(decision.allowed);
    assert_eq!(decision.source, DecisionSource::Policy);
    assert_eq!(decision.granted_by, Some(policy.id));

    app.services.access.revoke(&owner, policy.id).await.unwrap();
    let decision = app
        .services
        .access
        .check_access(&reader_ctx, doc, PolicyAction::Read)
        .await
        .unwrap();
    assert!(!decision.allowed);
}

#[tokio::test]
async fn test_owner_bypass_is_reported() {
    let app = helpers::TestApp::new();
    let (owner, doc) = app.create_document("Mine").await;

    let decision = app
        .services
        .access
        .check_access(&owner, doc, PolicyAction::Delete)
        .await
        .unwrap();
    assert!(decision.allowed);
    assert_eq!(decision.source, DecisionSource::Owner);
}

#[tokio::test]
async fn test_non_owner_grant_is_rejected() {
    let app = helpers::TestApp::new();
    let (_, doc) = app.create_document("Not yours").await;
    let intruder = RequestContext::user(UserId::new());

    let err = app
        .services
        .access
        .grant(
            &intruder,
            helpers::policy_for(intruder.user_id, doc, &[PolicyAction::Manage], 1),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::BusinessRule);
    assert!(err.is_business_rule_violation());
}

#[tokio::test]
async fn test_role_policy_applies_to_role_members() {
    let app = helpers::TestApp::new();
    let (owner, doc) = app.create_document("Team doc").await;

    let mut role_policy = helpers::policy_for(UserId::new(), doc, &[PolicyAction::Write], 50);
    role_policy.subject_type = SubjectType::Role;
    role_policy.subject_id = "engineering".to_string();
    app.services.access.grant(&owner, role_policy).await.unwrap();

    let member = RequestContext::user(UserId::new()).with_roles(vec!["engineering".to_string()]);
    let outsider = RequestContext::user(UserId::new()).with_roles(vec!["sales".to_string()]);

    assert!(
        app.services
            .access
            .check_access(&member, doc, PolicyAction::Write)
            .await
            .unwrap()
            .allowed
    );
    assert!(
        !app.services
            .access
            .check_access(&outsider, doc, PolicyAction::Write)
            .await
            .unwrap()
            .allowed
    );
}
