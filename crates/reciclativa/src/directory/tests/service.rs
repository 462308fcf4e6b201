use super::common::*;
use std::sync::Arc;

use crate::directory::domain::{ListingId, ListingStatus};
use crate::directory::memory::InMemoryDirectoryStore;
use crate::directory::repository::StatusChange;
use crate::directory::{
    Decision, DirectoryService, DirectoryServiceError, DisabledNotifier, RawSubmission,
    ValidationError,
};

#[tokio::test]
async fn submit_stores_pending_listing_and_notifies() {
    let (service, store, notifier) = build_service();

    let id = service.submit(eco_coleta_raw()).await.expect("valid submission");

    let stored = store.get(id).expect("listing stored");
    assert_eq!(stored.status, ListingStatus::Pending);
    assert_eq!(stored.uf, "sp");
    assert_eq!(stored.city, "São Paulo");
    assert_eq!(stored.city_slug(), "sao-paulo");
    assert_eq!(pending_ids(&store).await, vec![id]);

    let notices = notifier.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].id, id);
    assert_eq!(notices[0].listing.name, "EcoColeta");
}

#[tokio::test]
async fn invalid_submissions_never_reach_the_store() {
    let (service, store, notifier) = build_service();

    let no_name = RawSubmission::new().with("uf", "SP").with("city", "Campinas");
    let no_region = RawSubmission::new()
        .with("name", "EcoColeta")
        .with("city", "Campinas");
    let no_city = RawSubmission::new().with("name", "EcoColeta").with("uf", "SP");
    let cases = [
        (no_name, ValidationError::InvalidName),
        (no_region, ValidationError::InvalidRegion),
        (no_city, ValidationError::InvalidCity),
        (
            eco_coleta_raw().with("email", "not-an-email"),
            ValidationError::InvalidEmail,
        ),
        (eco_coleta_raw().with("name", "A"), ValidationError::InvalidName),
    ];

    for (raw, expected) in cases {
        match service.submit(raw).await {
            Err(DirectoryServiceError::Validation(err)) => assert_eq!(err, expected),
            other => panic!("expected {expected:?}, got {other:?}"),
        }
    }

    assert!(store.is_empty());
    assert!(notifier.notices().is_empty());
}

#[tokio::test]
async fn omitting_email_is_accepted() {
    let (service, store, _) = build_service();
    let raw = RawSubmission::new()
        .with("nome", "Ferro Velho Silva")
        .with("uf", "mg")
        .with("cidade", "Belo Horizonte");

    let id = service.submit(raw).await.expect("email is optional");
    assert_eq!(store.get(id).expect("stored").email, None);
}

#[tokio::test]
async fn notifier_failure_does_not_fail_submission() {
    let store = Arc::new(InMemoryDirectoryStore::new());
    let notifier = Arc::new(RecordingNotifier::failing());
    let service = DirectoryService::new(store.clone(), notifier.clone());

    let id = service.submit(eco_coleta_raw()).await.expect("still accepted");
    assert!(store.get(id).is_some());
    assert_eq!(notifier.notices().len(), 1);
}

#[tokio::test]
async fn approve_moves_listing_out_of_pending() {
    let (service, store, _) = build_service();
    let id = service.submit(eco_coleta_raw()).await.expect("submitted");

    let change = service.approve(id).await.expect("approve succeeds");
    assert_eq!(change, StatusChange::Applied);
    assert_eq!(ids_with_status(&store, ListingStatus::Approved).await, vec![id]);
    assert!(pending_ids(&store).await.is_empty());
}

#[tokio::test]
async fn decided_listings_are_terminal() {
    let (service, store, _) = build_service();
    let id = service.submit(eco_coleta_raw()).await.expect("submitted");

    service.reject(id).await.expect("reject succeeds");
    let change = service.approve(id).await.expect("second call is a no-op");

    assert_eq!(change, StatusChange::Unchanged);
    assert_eq!(ids_with_status(&store, ListingStatus::Rejected).await, vec![id]);
    assert!(ids_with_status(&store, ListingStatus::Approved).await.is_empty());
}

#[tokio::test]
async fn decisions_target_their_own_terminal_status() {
    assert_eq!(Decision::Approve.target(), ListingStatus::Approved);
    assert_eq!(Decision::Reject.target(), ListingStatus::Rejected);

    let (service, store, _) = build_service();
    let id = service.submit(eco_coleta_raw()).await.expect("submitted");

    let change = service.decide(id, Decision::Reject).await.expect("decided");
    assert_eq!(change, StatusChange::Applied);
    assert_eq!(ids_with_status(&store, ListingStatus::Rejected).await, vec![id]);
    assert!(ids_with_status(&store, ListingStatus::Approved).await.is_empty());
}

#[tokio::test]
async fn moderating_unknown_ids_is_a_no_op() {
    let (service, store, _) = build_service();
    let change = service.reject(ListingId(77)).await.expect("no error");
    assert_eq!(change, StatusChange::Unchanged);
    assert!(store.is_empty());
}

#[tokio::test]
async fn public_reads_degrade_to_empty_on_store_failure() {
    let service = DirectoryService::new(Arc::new(UnavailableStore), Arc::new(DisabledNotifier));

    assert!(service.public_listings().await.is_empty());
    assert!(service.public_directory().await.is_empty());
}

#[tokio::test]
async fn admin_reads_surface_store_failure() {
    let service = DirectoryService::new(Arc::new(UnavailableStore), Arc::new(DisabledNotifier));

    match service.listings(ListingStatus::Pending).await {
        Err(DirectoryServiceError::Store(_)) => {}
        other => panic!("expected store error, got {other:?}"),
    }
}

#[tokio::test]
async fn write_failures_are_surfaced() {
    let service = DirectoryService::new(Arc::new(UnavailableStore), Arc::new(DisabledNotifier));

    assert!(matches!(
        service.submit(eco_coleta_raw()).await,
        Err(DirectoryServiceError::Store(_))
    ));
    assert!(matches!(
        service.approve(ListingId(1)).await,
        Err(DirectoryServiceError::Store(_))
    ));
}

#[tokio::test]
async fn public_directory_only_shows_approved_listings() {
    let (service, _, _) = build_service();
    let approved = service.submit(eco_coleta_raw()).await.expect("submitted");
    let twin = service
        .submit(eco_coleta_raw().with("name", "Recicla SP").with("city", "sao paulo"))
        .await
        .expect("submitted");
    service
        .submit(eco_coleta_raw().with("name", "Still Pending"))
        .await
        .expect("submitted");

    service.approve(approved).await.expect("approved");
    service.approve(twin).await.expect("approved");

    let directory = service.public_directory().await;
    assert_eq!(directory.listing_count(), 2);
    let city = directory.city("sp", "SÃO PAULO").expect("grouped by slug");
    assert_eq!(city.categories.values().map(Vec::len).sum::<usize>(), 2);
}
