use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use serde_json::{json, Value};

use crate::config::AdminConfig;
use crate::directory::domain::{ListingId, ListingStatus, NewListing, ProfessionalListing};
use crate::directory::gate::AdminGate;
use crate::directory::memory::InMemoryDirectoryStore;
use crate::directory::notifier::{ListingNotice, Notifier, NotifyError, NotifyOutcome};
use crate::directory::repository::{DirectoryStore, StatusChange, StoreError};
use crate::directory::{directory_router, DirectoryService, RawSubmission};

pub(super) const PASSWORD: &str = "senha-forte";
pub(super) const SESSION_TOKEN: &str = "sess-5f2c";

pub(super) fn gate() -> AdminGate {
    AdminGate::new(AdminConfig {
        password: Some(PASSWORD.to_string()),
        session_token: Some(SESSION_TOKEN.to_string()),
        secure_cookie: false,
    })
}

pub(super) fn eco_coleta() -> Value {
    json!({
        "name": "EcoColeta",
        "uf": "SP",
        "city": "São Paulo",
        "email": "x@y.com",
    })
}

pub(super) fn eco_coleta_raw() -> RawSubmission {
    RawSubmission::from_json(eco_coleta())
}

pub(super) type TestService = DirectoryService<InMemoryDirectoryStore, RecordingNotifier>;

pub(super) fn build_service() -> (
    TestService,
    Arc<InMemoryDirectoryStore>,
    Arc<RecordingNotifier>,
) {
    let store = Arc::new(InMemoryDirectoryStore::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let service = DirectoryService::new(store.clone(), notifier.clone());
    (service, store, notifier)
}

pub(super) fn router_with_service<S, N>(service: DirectoryService<S, N>) -> axum::Router
where
    S: DirectoryStore + 'static,
    N: Notifier + 'static,
{
    directory_router(Arc::new(service), gate())
}

#[derive(Default)]
pub(super) struct RecordingNotifier {
    notices: Mutex<Vec<ListingNotice>>,
    fail: bool,
}

impl RecordingNotifier {
    pub(super) fn failing() -> Self {
        Self {
            notices: Mutex::default(),
            fail: true,
        }
    }

    pub(super) fn notices(&self) -> Vec<ListingNotice> {
        self.notices.lock().expect("notice mutex poisoned").clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notice: &ListingNotice) -> Result<NotifyOutcome, NotifyError> {
        self.notices
            .lock()
            .expect("notice mutex poisoned")
            .push(notice.clone());
        if self.fail {
            Err(NotifyError::Rejected { status: 503 })
        } else {
            Ok(NotifyOutcome::Sent)
        }
    }
}

pub(super) struct UnavailableStore;

#[async_trait]
impl DirectoryStore for UnavailableStore {
    async fn insert(&self, _listing: NewListing) -> Result<ListingId, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    async fn list_by_status(
        &self,
        _status: ListingStatus,
    ) -> Result<Vec<ProfessionalListing>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    async fn set_status(
        &self,
        _id: ListingId,
        _status: ListingStatus,
    ) -> Result<StatusChange, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn pending_ids(store: &InMemoryDirectoryStore) -> Vec<ListingId> {
    ids_with_status(store, ListingStatus::Pending).await
}

pub(super) async fn ids_with_status(
    store: &InMemoryDirectoryStore,
    status: ListingStatus,
) -> Vec<ListingId> {
    store
        .list_by_status(status)
        .await
        .expect("memory store lists")
        .into_iter()
        .map(|listing| listing.id)
        .collect()
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn location(response: &Response) -> String {
    response
        .headers()
        .get(axum::http::header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .expect("location header")
        .to_string()
}
