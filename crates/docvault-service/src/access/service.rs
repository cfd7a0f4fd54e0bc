//! Grant, revoke, and check-access workflows.

use std::sync::Arc;

use tracing::{info, warn};

use docvault_auth::policy::AccessDecision;
use docvault_core::error::AppError;
use docvault_core::events::{AuditEventKind, AuditOutcome};
use docvault_core::result::AppResult;
use docvault_core::types::id::{DocumentId, PolicyId};
use docvault_database::store::PolicyStore;
use docvault_entity::policy::validation::{validate_new_policy, validate_subject, validate_update};
use docvault_entity::policy::{
    AccessPolicy, ActionSet, NewAccessPolicy, PolicyAction, ResourceType, SubjectType,
    UpdateAccessPolicy,
};

use super::guard::AccessGuard;
use crate::audit::AuditLogger;
use crate::context::RequestContext;

/// Manages access policies and answers access questions.
#[derive(Debug, Clone)]
pub struct AccessService {
    /// Authorization guard.
    guard: AccessGuard,
    /// Policy storage.
    policies: Arc<dyn PolicyStore>,
    /// Audit logger.
    audit: AuditLogger,
}

impl AccessService {
    /// Creates a new access service.
    pub fn new(guard: AccessGuard, policies: Arc<dyn PolicyStore>, audit: AuditLogger) -> Self {
        Self {
            guard,
            policies,
            audit,
        }
    }

    /// Grant a policy.
    ///
    /// Policies on one document may be granted by an admin, the owner, or a
    /// holder of `manage`. Class-wide and user-resource policies are admin-only.
    pub async fn grant(
        &self,
        ctx: &RequestContext,
        input: NewAccessPolicy,
    ) -> AppResult<AccessPolicy> {
        let input = validate_new_policy(input)?;

        if !self
            .may_manage(ctx, input.resource_type, input.resource_id)
            .await?
        {
            warn!(
                user_id = %ctx.user_id,
                resource_id = ?input.resource_id,
                "Policy grant refused"
            );
            self.audit.log_event(
                AuditEventKind::PolicyGranted,
                Some(ctx.user_id.into_uuid()),
                input.resource_id,
                AuditOutcome::Denied,
                serde_json::json!({
                    "subject_type": input.subject_type,
                    "subject_id": input.subject_id,
                    "actions": input.actions,
                }),
            );
            return Err(AppError::business_rule(
                "Only an admin, the owner, or a manager of the resource may grant access",
            ));
        }

        let policy = self.policies.create(&input).await?;

        info!(
            user_id = %ctx.user_id,
            policy_id = %policy.id,
            subject_type = %policy.subject_type,
            subject_id = %policy.subject_id,
            resource_id = ?policy.resource_id,
            priority = policy.priority,
            "Access policy granted"
        );
        self.audit.log_event(
            AuditEventKind::PolicyGranted,
            Some(ctx.user_id.into_uuid()),
            policy.resource_id,
            AuditOutcome::Success,
            serde_json::json!({
                "policy_id": policy.id,
                "subject_type": policy.subject_type,
                "subject_id": policy.subject_id,
                "actions": policy.actions,
                "priority": policy.priority,
            }),
        );

        Ok(policy)
    }

    /// Change the actions, priority, or active flag of a policy.
    pub async fn update_policy(
        &self,
        ctx: &RequestContext,
        id: PolicyId,
        changes: UpdateAccessPolicy,
    ) -> AppResult<AccessPolicy> {
        let changes = validate_update(changes)?;
        let existing = self.find_policy(id).await?;
        self.require_manage(ctx, &existing).await?;

        let updated = self
            .policies
            .update(id, &changes)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Policy {id} not found")))?;

        info!(user_id = %ctx.user_id, policy_id = %id, "Access policy updated");
        self.audit.log_event(
            AuditEventKind::PolicyUpdated,
            Some(ctx.user_id.into_uuid()),
            updated.resource_id,
            AuditOutcome::Success,
            serde_json::json!({
                "policy_id": id,
                "actions": updated.actions,
                "priority": updated.priority,
                "is_active": updated.is_active,
            }),
        );
        Ok(updated)
    }

    /// Remove a policy.
    pub async fn revoke(&self, ctx: &RequestContext, id: PolicyId) -> AppResult<()> {
        let existing = self.find_policy(id).await?;
        self.require_manage(ctx, &existing).await?;

        if !self.policies.delete(id).await? {
            return Err(AppError::not_found(format!("Policy {id} not found")));
        }

        info!(user_id = %ctx.user_id, policy_id = %id, "Access policy revoked");
        self.audit.log_event(
            AuditEventKind::PolicyRevoked,
            Some(ctx.user_id.into_uuid()),
            existing.resource_id,
            AuditOutcome::Success,
            serde_json::json!({
                "policy_id": id,
                "subject_type": existing.subject_type,
                "subject_id": existing.subject_id,
            }),
        );
        Ok(())
    }

    /// Remove every policy granted to a subject. Admin-only.
    pub async fn revoke_all_for_subject(
        &self,
        ctx: &RequestContext,
        subject_type: SubjectType,
        subject_id: &str,
    ) -> AppResult<u64> {
        if !ctx.is_active_admin() {
            return Err(AppError::business_rule(
                "Only an admin may revoke all access for a subject",
            ));
        }
        let subject_id = validate_subject(subject_type, subject_id)?;
        let removed = self
            .policies
            .delete_by_subject(subject_type, &subject_id)
            .await?;

        info!(
            user_id = %ctx.user_id,
            subject_type = %subject_type,
            subject_id = %subject_id,
            removed,
            "All access revoked for subject"
        );
        self.audit.log_event(
            AuditEventKind::PolicyRevoked,
            Some(ctx.user_id.into_uuid()),
            None,
            AuditOutcome::Success,
            serde_json::json!({
                "subject_type": subject_type,
                "subject_id": subject_id,
                "removed": removed,
            }),
        );
        Ok(removed)
    }

    /// Answer whether the caller may perform `action` on a document.
    pub async fn check_access(
        &self,
        ctx: &RequestContext,
        document_id: DocumentId,
        action: PolicyAction,
    ) -> AppResult<AccessDecision> {
        let document = self.guard.load_document(document_id).await?;
        let decision = self.guard.decide(ctx, &document, action).await?;

        self.audit.log_event(
            AuditEventKind::AccessChecked,
            Some(ctx.user_id.into_uuid()),
            Some(document_id.into_uuid()),
            if decision.allowed {
                AuditOutcome::Success
            } else {
                AuditOutcome::Denied
            },
            serde_json::json!({
                "action": action,
                "source": decision.source,
                "granted_by": decision.granted_by,
            }),
        );
        Ok(decision)
    }

    /// Every action the caller may perform on a document.
    ///
    /// Fails when the caller is inactive or the document is deleted.
    pub async fn effective_permissions(
        &self,
        ctx: &RequestContext,
        document_id: DocumentId,
    ) -> AppResult<ActionSet> {
        let document = self.guard.load_document(document_id).await?;
        let subject = ctx.subject();
        let resource = AccessGuard::resource_for(&document);
        let engine = self.guard.engine();

        if subject.is_active && resource.is_accessible && engine.is_owner(&subject, &resource) {
            return Ok(ActionSet::all());
        }

        let policies = self.guard.snapshot(ctx, &resource).await?;
        engine.get_effective_permissions(&subject, &resource, &policies)
    }

    /// Policies naming a document. Requires the right to manage it.
    pub async fn list_policies(
        &self,
        ctx: &RequestContext,
        document_id: DocumentId,
    ) -> AppResult<Vec<AccessPolicy>> {
        let document = self.guard.load_live_document(document_id).await?;
        if !self.guard.can_manage(ctx, &document).await? {
            return Err(AppError::business_rule(
                "Only an admin, the owner, or a manager may list access policies",
            ));
        }
        self.policies
            .list_by_resource(ResourceType::Document, document_id.into_uuid())
            .await
    }

    async fn find_policy(&self, id: PolicyId) -> AppResult<AccessPolicy> {
        self.policies
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Policy {id} not found")))
    }

    async fn require_manage(&self, ctx: &RequestContext, policy: &AccessPolicy) -> AppResult<()> {
        if !self
            .may_manage(ctx, policy.resource_type, policy.resource_id)
            .await?
        {
            return Err(AppError::business_rule(
                "Only an admin, the owner, or a manager of the resource may change access",
            ));
        }
        Ok(())
    }

    async fn may_manage(
        &self,
        ctx: &RequestContext,
        resource_type: ResourceType,
        resource_id: Option<uuid::Uuid>,
    ) -> AppResult<bool> {
        match (resource_type, resource_id) {
            (ResourceType::Document, Some(id)) => {
                let document = self
                    .guard
                    .load_live_document(DocumentId::from_uuid(id))
                    .await?;
                self.guard.can_manage(ctx, &document).await
            }
            _ => Ok(ctx.is_active_admin()),
        }
    }
}

#[cfg(test)]
mod tests {
    use docvault_auth::policy::DecisionSource;
    use docvault_core::ErrorKind;
    use docvault_core::types::id::UserId;

    use super::*;
    use crate::testing::{Harness, settle, user_grant};

    #[tokio::test]
    async fn test_owner_grants_read_only() {
        let h = Harness::new();
        let (owner, doc) = h.document_with_version().await;
        let reader = UserId::new();
        let access = &h.services.access;

        access
            .grant(
                &RequestContext::user(owner),
                user_grant(reader, doc, &[PolicyAction::Read], 10),
            )
            .await
            .unwrap();

        let ctx = RequestContext::user(reader);
        let read = access.check_access(&ctx, doc, PolicyAction::Read).await.unwrap();
        let write = access.check_access(&ctx, doc, PolicyAction::Write).await.unwrap();
        assert!(read.allowed);
        assert_eq!(read.source, DecisionSource::Policy);
        assert!(!write.allowed);
    }

    #[tokio::test]
    async fn test_stranger_cannot_grant_and_denial_is_audited() {
        let h = Harness::new();
        let (_, doc) = h.document_with_version().await;
        let stranger = UserId::new();

        let err = h
            .services
            .access
            .grant(
                &RequestContext::user(stranger),
                user_grant(stranger, doc, &[PolicyAction::Read], 10),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::BusinessRule);

        settle().await;
        let events = h.audit.events_of(AuditEventKind::PolicyGranted).await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].outcome, AuditOutcome::Denied);
    }

    #[tokio::test]
    async fn test_manage_holder_can_grant_but_reader_cannot() {
        let h = Harness::new();
        let (owner, doc) = h.document_with_version().await;
        let manager = UserId::new();
        let reader = UserId::new();
        let access = &h.services.access;
        let owner_ctx = RequestContext::user(owner);

        access
            .grant(&owner_ctx, user_grant(manager, doc, &[PolicyAction::Manage], 5))
            .await
            .unwrap();
        access
            .grant(
                &RequestContext::user(manager),
                user_grant(reader, doc, &[PolicyAction::Read], 10),
            )
            .await
            .unwrap();

        let err = access
            .grant(
                &RequestContext::user(reader),
                user_grant(UserId::new(), doc, &[PolicyAction::Read], 10),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::BusinessRule);
    }

    #[tokio::test]
    async fn test_class_wide_grants_are_admin_only() {
        let h = Harness::new();
        let (owner, doc) = h.document_with_version().await;
        let mut input = user_grant(UserId::new(), doc, &[PolicyAction::Read], 10);
        input.resource_id = None;

        let err = h
            .services
            .access
            .grant(&RequestContext::user(owner), input.clone())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::BusinessRule);

        let admin = RequestContext::admin(UserId::new());
        assert!(h.services.access.grant(&admin, input).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_and_revoke() {
        let h = Harness::new();
        let (owner, doc) = h.document_with_version().await;
        let reader = UserId::new();
        let access = &h.services.access;
        let owner_ctx = RequestContext::user(owner);
        let reader_ctx = RequestContext::user(reader);

        let policy = access
            .grant(&owner_ctx, user_grant(reader, doc, &[PolicyAction::Read], 10))
            .await
            .unwrap();

        let updated = access
            .update_policy(
                &owner_ctx,
                policy.id,
                UpdateAccessPolicy {
                    actions: Some(vec![PolicyAction::Read, PolicyAction::Write]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(updated.grants(PolicyAction::Write));
        assert!(
            access
                .check_access(&reader_ctx, doc, PolicyAction::Write)
                .await
                .unwrap()
                .allowed
        );

        let err = access
            .revoke(&reader_ctx, policy.id)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::BusinessRule);

        access.revoke(&owner_ctx, policy.id).await.unwrap();
        assert!(
            !access
                .check_access(&reader_ctx, doc, PolicyAction::Read)
                .await
                .unwrap()
                .allowed
        );
        let err = access.revoke(&owner_ctx, policy.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_deactivated_policy_stops_granting() {
        let h = Harness::new();
        let (owner, doc) = h.document_with_version().await;
        let reader = UserId::new();
        let access = &h.services.access;
        let owner_ctx = RequestContext::user(owner);

        let policy = access
            .grant(&owner_ctx, user_grant(reader, doc, &[PolicyAction::Read], 10))
            .await
            .unwrap();
        access
            .update_policy(
                &owner_ctx,
                policy.id,
                UpdateAccessPolicy {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let decision = access
            .check_access(&RequestContext::user(reader), doc, PolicyAction::Read)
            .await
            .unwrap();
        assert!(!decision.allowed);
    }

    #[tokio::test]
    async fn test_revoke_all_for_subject() {
        let h = Harness::new();
        let (owner, doc_a) = h.document_with_version().await;
        let doc_b = h.document_with_version_for(owner).await;
        let reader = UserId::new();
        let access = &h.services.access;
        let owner_ctx = RequestContext::user(owner);

        for doc in [doc_a, doc_b] {
            access
                .grant(&owner_ctx, user_grant(reader, doc, &[PolicyAction::Read], 10))
                .await
                .unwrap();
        }

        let err = access
            .revoke_all_for_subject(&owner_ctx, SubjectType::User, &reader.to_string())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::BusinessRule);

        let admin = RequestContext::admin(UserId::new());
        let removed = access
            .revoke_all_for_subject(&admin, SubjectType::User, &reader.to_string())
            .await
            .unwrap();
        assert_eq!(removed, 2);
    }

    #[tokio::test]
    async fn test_effective_permissions() {
        let h = Harness::new();
        let (owner, doc) = h.document_with_version().await;
        let editor = UserId::new();
        let access = &h.services.access;
        let owner_ctx = RequestContext::user(owner);

        let mut role_grant = user_grant(editor, doc, &[PolicyAction::Write], 20);
        role_grant.subject_type = SubjectType::Role;
        role_grant.subject_id = "editor".to_string();
        access.grant(&owner_ctx, role_grant).await.unwrap();
        access
            .grant(&owner_ctx, user_grant(editor, doc, &[PolicyAction::Read], 10))
            .await
            .unwrap();

        let ctx = RequestContext::user(editor).with_roles(vec!["editor".to_string()]);
        let perms = access.effective_permissions(&ctx, doc).await.unwrap();
        assert_eq!(perms.to_vec(), vec![PolicyAction::Read, PolicyAction::Write]);

        let owner_perms = access.effective_permissions(&owner_ctx, doc).await.unwrap();
        assert_eq!(owner_perms, ActionSet::all());

        let mut inactive = RequestContext::user(editor);
        inactive.is_active = false;
        let err = access.effective_permissions(&inactive, doc).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::BusinessRule);
    }

    #[tokio::test]
    async fn test_list_policies_requires_manage() {
        let h = Harness::new();
        let (owner, doc) = h.document_with_version().await;
        let access = &h.services.access;
        access
            .grant(
                &RequestContext::user(owner),
                user_grant(UserId::new(), doc, &[PolicyAction::Read], 10),
            )
            .await
            .unwrap();

        assert_eq!(
            access
                .list_policies(&RequestContext::user(owner), doc)
                .await
                .unwrap()
                .len(),
            1
        );
        assert!(
            access
                .list_policies(&RequestContext::user(UserId::new()), doc)
                .await
                .is_err()
        );
    }
}
