//! Integration tests for the version ledger and upload confirmation.

mod helpers;

use docvault_core::{ConflictKind, ErrorKind};
use docvault_core::types::id::{DocumentId, UserId};
use docvault_entity::policy::PolicyAction;
use docvault_entity::version::NewDocumentVersion;
use docvault_service::RequestContext;

#[tokio::test]
async fn test_versions_are_numbered_in_order() {
    let app = helpers::TestApp::new();
    let (owner, doc) = app.create_document("Site plan").await;

    app.upload(&owner, doc, None).await.unwrap();
    app.upload(&owner, doc, None).await.unwrap();

    let latest = app.services.ledger.find_latest(doc).await.unwrap().unwrap();
    assert_eq!(latest.version, 2);
    assert_eq!(app.services.ledger.next_version_number(doc).await.unwrap(), 3);
}

#[tokio::test]
async fn test_duplicate_content_conflicts_across_documents() {
    let app = helpers::TestApp::new();
    let (owner, first) = app.create_document("Original").await;
    let (other_owner, second) = app.create_document("Copy").await;
    let sum = helpers::checksum();

    app.upload(&owner, first, Some(sum.clone())).await.unwrap();
    let err = app
        .upload(&other_owner, second, Some(sum))
        .await
        .unwrap_err();
    assert!(err.is_conflict(ConflictKind::Checksum));
    assert!(app.services.ledger.find_latest(second).await.unwrap().is_none());
}

#[tokio::test]
async fn test_uploaded_version_round_trips() {
    let app = helpers::TestApp::new();
    let (owner, doc) = app.create_document("Round trip").await;
    let sum = helpers::checksum();

    let created = app.upload(&owner, doc, Some(sum.clone())).await.unwrap();
    let fetched = app
        .services
        .ledger
        .find_by_checksum(&sum)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.filename, "site-plan.pdf");
    assert_eq!(fetched.mime_type, "application/pdf");
    assert_eq!(fetched.size, 1_048_576);
    assert_eq!(fetched.storage_key, created.storage_key);
    assert_eq!(fetched.uploaded_by, owner.user_id);
}

#[tokio::test]
async fn test_writer_can_upload_reader_cannot() {
    let app = helpers::TestApp::new();
    let (owner, doc) = app.create_document("Shared").await;
    let writer = UserId::new();
    let reader = UserId::new();
    app.grant(&owner, writer, doc, &[PolicyAction::Write], 10).await;
    app.grant(&owner, reader, doc, &[PolicyAction::Read], 10).await;

    assert!(app.upload(&RequestContext::user(writer), doc, None).await.is_ok());
    let err = app
        .upload(&RequestContext::user(reader), doc, None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);
}

#[tokio::test]
async fn test_document_deletion_removes_history_and_grants() {
    let app = helpers::TestApp::new();
    let (owner, doc) = app.create_document("Retired").await;
    let reader = UserId::new();
    app.upload(&owner, doc, None).await.unwrap();
    app.upload(&owner, doc, None).await.unwrap();
    app.grant(&owner, reader, doc, &[PolicyAction::Read], 10).await;

    let summary = app
        .services
        .documents
        .delete_document(&owner, doc)
        .await
        .unwrap();
    assert_eq!(summary.versions_removed, 2);
    assert_eq!(summary.policies_removed, 1);

    let stats = app.services.ledger.stats().await.unwrap();
    assert_eq!(stats.total_versions, 0);
}

#[tokio::test]
async fn test_stats_aggregate_by_mime_type() {
    let app = helpers::TestApp::new();
    let (owner, a) = app.create_document("A").await;
    let b = app
        .services
        .documents
        .create_document(&owner, "B")
        .await
        .unwrap()
        .id;
    app.upload(&owner, a, None).await.unwrap();
    app.upload(&owner, a, None).await.unwrap();
    app.upload(&owner, b, None).await.unwrap();

    let stats = app.services.ledger.stats().await.unwrap();
    assert_eq!(stats.total_versions, 3);
    assert_eq!(stats.total_size, 3 * 1_048_576);
    assert_eq!(stats.size_by_mime_type.get("application/pdf"), Some(&(3 * 1_048_576)));
    assert!((stats.avg_versions_per_document - 1.5).abs() < f64::EPSILON);
}

fn explicit_version(doc: DocumentId, number: i32) -> NewDocumentVersion {
    NewDocumentVersion {
        document_id: doc,
        version: Some(number),
        filename: format!("rev-{number}.dwg"),
        mime_type: "application/acad".to_string(),
        size: 4096,
        storage_key: format!("documents/{doc}/rev-{number}"),
        storage_provider: "local".to_string(),
        checksum: None,
        tags: None,
        metadata: None,
        uploaded_by: UserId::new(),
    }
}

#[tokio::test]
async fn test_explicit_numbers_never_go_backwards() {
    let app = helpers::TestApp::new();
    let (_, doc) = app.create_document("Imported history").await;
    let ledger = &app.services.ledger;

    ledger.create(explicit_version(doc, 5)).await.unwrap();

    let err = ledger.create(explicit_version(doc, 2)).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    let err = ledger.create(explicit_version(doc, 5)).await.unwrap_err();
    assert!(err.is_conflict(ConflictKind::VersionNumber));

    assert_eq!(ledger.create(explicit_version(doc, 7)).await.unwrap().version, 7);
    let numbers: Vec<i32> = ledger
        .list_by_document(doc)
        .await
        .unwrap()
        .iter()
        .map(|v| v.version)
        .collect();
    assert_eq!(numbers, vec![7, 5]);
}

#[tokio::test]
async fn test_version_for_unregistered_document_not_found() {
    let app = helpers::TestApp::new();
    let err = app
        .services
        .ledger
        .create(explicit_version(DocumentId::new(), 1))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}
