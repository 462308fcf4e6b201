use std::sync::Arc;

use tracing::{info, warn};

use super::domain::{ListingId, ListingStatus, ProfessionalListing};
use super::normalizer::{normalize, RawSubmission};
use super::notifier::{ListingNotice, Notifier, NotifyOutcome};
use super::projection::PublicDirectory;
use super::repository::{DirectoryStore, StatusChange, StoreError};
use super::validation::{validate, ValidationError};

/// Service composing normalization, validation, persistence and notification.
pub struct DirectoryService<S, N> {
    store: Arc<S>,
    notifier: Arc<N>,
}

impl<S, N> DirectoryService<S, N>
where
    S: DirectoryStore + 'static,
    N: Notifier + 'static,
{
    pub fn new(store: Arc<S>, notifier: Arc<N>) -> Self {
        Self { store, notifier }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Accepts a public submission and returns the id of the new pending listing.
    ///
    /// The notifier runs after the insert and its outcome is only logged.
    pub async fn submit(&self, raw: RawSubmission) -> Result<ListingId, DirectoryServiceError> {
        let listing = match validate(normalize(&raw)) {
            Ok(listing) => listing,
            Err(err) => {
                info!(reason = err.code(), "submission rejected");
                return Err(err.into());
            }
        };

        let id = self.store.insert(listing.clone()).await?;
        info!(%id, uf = %listing.uf, "listing submitted for moderation");

        let notice = ListingNotice { id, listing };
        match self.notifier.notify(&notice).await {
            Ok(NotifyOutcome::Sent) => info!(%id, "moderation notice sent"),
            Ok(NotifyOutcome::Skipped) => info!(%id, "moderation notice skipped: not configured"),
            Err(err) => warn!(%id, error = %err, "moderation notice failed"),
        }

        Ok(id)
    }

    /// Admin read path; storage errors are surfaced.
    pub async fn listings(
        &self,
        status: ListingStatus,
    ) -> Result<Vec<ProfessionalListing>, DirectoryServiceError> {
        Ok(self.store.list_by_status(status).await?)
    }

    /// Public read path: storage trouble degrades to an empty list.
    pub async fn public_listings(&self) -> Vec<ProfessionalListing> {
        match self.store.list_by_status(ListingStatus::Approved).await {
            Ok(listings) => listings,
            Err(err) => {
                warn!(error = %err, "approved listings unavailable, serving empty directory");
                Vec::new()
            }
        }
    }

    pub async fn public_directory(&self) -> PublicDirectory {
        PublicDirectory::from_listings(self.public_listings().await)
    }

    pub async fn approve(&self, id: ListingId) -> Result<StatusChange, DirectoryServiceError> {
        self.decide(id, Decision::Approve).await
    }

    pub async fn reject(&self, id: ListingId) -> Result<StatusChange, DirectoryServiceError> {
        self.decide(id, Decision::Reject).await
    }

    pub async fn decide(
        &self,
        id: ListingId,
        decision: Decision,
    ) -> Result<StatusChange, DirectoryServiceError> {
        self.transition(id, decision.target()).await
    }

    async fn transition(
        &self,
        id: ListingId,
        status: ListingStatus,
    ) -> Result<StatusChange, DirectoryServiceError> {
        let change = self.store.set_status(id, status).await?;
        match change {
            StatusChange::Applied => info!(%id, %status, "listing moderated"),
            StatusChange::Unchanged => {
                info!(%id, %status, "moderation ignored: listing missing or already decided")
            }
        }
        Ok(change)
    }
}

/// Operator verdict on a pending listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub const fn target(self) -> ListingStatus {
        match self {
            Decision::Approve => ListingStatus::Approved,
            Decision::Reject => ListingStatus::Rejected,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DirectoryServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
