use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use super::domain::{ListingId, ListingStatus, NewListing, ProfessionalListing};
use super::repository::{DirectoryStore, StatusChange, StoreError};

type Records = BTreeMap<ListingId, ProfessionalListing>;

/// Process-local store used when no hosted table is configured.
#[derive(Debug, Clone)]
pub struct InMemoryDirectoryStore {
    records: Arc<Mutex<Records>>,
    sequence: Arc<AtomicI64>,
}

impl Default for InMemoryDirectoryStore {
    fn default() -> Self {
        Self {
            records: Arc::default(),
            sequence: Arc::new(AtomicI64::new(1)),
        }
    }
}

impl InMemoryDirectoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: ListingId) -> Option<ProfessionalListing> {
        self.lock().ok()?.get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().map(|guard| guard.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, Records>, StoreError> {
        self.records
            .lock()
            .map_err(|_| StoreError::Unavailable("listing mutex poisoned".to_string()))
    }
}

#[async_trait]
impl DirectoryStore for InMemoryDirectoryStore {
    async fn insert(&self, listing: NewListing) -> Result<ListingId, StoreError> {
        let id = ListingId(self.sequence.fetch_add(1, Ordering::Relaxed));
        let record = ProfessionalListing::from_new(id, listing, Utc::now());
        self.lock()?.insert(id, record);
        Ok(id)
    }

    async fn list_by_status(
        &self,
        status: ListingStatus,
    ) -> Result<Vec<ProfessionalListing>, StoreError> {
        let guard = self.lock()?;
        let mut listings: Vec<ProfessionalListing> = guard
            .values()
            .filter(|listing| listing.status == status)
            .cloned()
            .collect();
        // ids grow monotonically, so they break ties between equal timestamps
        listings.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(listings)
    }

    async fn set_status(
        &self,
        id: ListingId,
        status: ListingStatus,
    ) -> Result<StatusChange, StoreError> {
        let mut guard = self.lock()?;
        match guard.get_mut(&id) {
            Some(listing) if listing.status == ListingStatus::Pending => {
                listing.status = status;
                Ok(StatusChange::Applied)
            }
            _ => Ok(StatusChange::Unchanged),
        }
    }
}
