//! Integration tests for download tokens.

mod helpers;

use std::sync::Arc;

use chrono::{Duration, Utc};

use docvault_core::ErrorKind;
use docvault_core::events::AuditEventKind;
use docvault_core::types::id::UserId;
use docvault_entity::policy::PolicyAction;
use docvault_service::RequestContext;
use docvault_worker::TokenCleanupJob;

#[tokio::test]
async fn test_token_is_consumed_exactly_once() {
    let app = helpers::TestApp::new();
    let (owner, doc) = app.create_document("Drawing").await;
    app.upload(&owner, doc, None).await.unwrap();
    let tokens = &app.services.tokens;

    let token = tokens
        .issue(doc, owner.user_id, Utc::now() + Duration::minutes(10))
        .await
        .unwrap();
    tokens.validate(&token.token, owner.user_id).await.unwrap();
    tokens.consume(token.id).await.unwrap();

    let err = tokens.consume(token.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::AlreadyUsed);
}

#[tokio::test]
async fn test_token_expiring_in_the_past_is_rejected_at_issue() {
    let app = helpers::TestApp::new();
    let (owner, doc) = app.create_document("Drawing").await;
    app.upload(&owner, doc, None).await.unwrap();

    let err = app
        .services
        .tokens
        .issue(doc, owner.user_id, Utc::now() - Duration::minutes(1))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn test_download_flow_for_granted_reader() {
    let app = helpers::TestApp::new();
    let (owner, doc) = app.create_document("Manual").await;
    app.upload(&owner, doc, None).await.unwrap();
    let latest = app.upload(&owner, doc, None).await.unwrap();

    let reader = UserId::new();
    app.grant(&owner, reader, doc, &[PolicyAction::Read], 10).await;
    let reader_ctx = RequestContext::user(reader);

    let token = app
        .services
        .download
        .request_download(&reader_ctx, doc, Some(Duration::minutes(5)))
        .await
        .unwrap();
    let grant = app
        .services
        .download
        .redeem(&reader_ctx, &token.token)
        .await
        .unwrap();
    assert_eq!(grant.version.id, latest.id);
    assert_eq!(grant.version.storage_key, latest.storage_key);

    let err = app
        .services
        .download
        .redeem(&reader_ctx, &token.token)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::AlreadyUsed);

    app.settle().await;
    assert_eq!(app.audit.events_of(AuditEventKind::TokenIssued).await.len(), 1);
}

#[tokio::test]
async fn test_token_bound_to_requesting_subject() {
    let app = helpers::TestApp::new();
    let (owner, doc) = app.create_document("Private").await;
    app.upload(&owner, doc, None).await.unwrap();

    let token = app
        .services
        .download
        .request_download(&owner, doc, None)
        .await
        .unwrap();
    let err = app
        .services
        .tokens
        .validate(&token.token, UserId::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);
}

#[tokio::test]
async fn test_cleanup_job_removes_expired_tokens() {
    let app = helpers::TestApp::new();
    let (owner, doc) = app.create_document("Temporary").await;
    app.upload(&owner, doc, None).await.unwrap();

    let live = app
        .services
        .tokens
        .issue(doc, owner.user_id, Utc::now() + Duration::minutes(10))
        .await
        .unwrap();
    let short = app
        .services
        .tokens
        .issue(doc, owner.user_id, Utc::now() + Duration::milliseconds(50))
        .await
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    let err = app
        .services
        .tokens
        .validate(&short.token, owner.user_id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Expired);

    let job = TokenCleanupJob::new(Arc::clone(&app.services.tokens));
    assert_eq!(job.run().await.unwrap(), 1);
    assert_eq!(app.tokens.len(), 1);
    assert!(
        app.services
            .tokens
            .validate(&live.token, owner.user_id)
            .await
            .is_ok()
    );
}
