use async_trait::async_trait;

use super::domain::{ListingId, ListingStatus, NewListing, ProfessionalListing};

/// Persistence boundary for listings. Implementations must be shareable across requests.
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    /// Appends a pending listing and returns its freshly assigned identifier.
    async fn insert(&self, listing: NewListing) -> Result<ListingId, StoreError>;

    /// All listings with `status`, newest first.
    async fn list_by_status(
        &self,
        status: ListingStatus,
    ) -> Result<Vec<ProfessionalListing>, StoreError>;

    /// Moves a pending listing to `status`. Unknown or already decided ids are left alone.
    async fn set_status(
        &self,
        id: ListingId,
        status: ListingStatus,
    ) -> Result<StatusChange, StoreError>;
}

/// Result of a transition attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChange {
    Applied,
    Unchanged,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("directory store unavailable: {0}")]
    Unavailable(String),
    #[error("directory store returned status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("unexpected directory store payload: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            StoreError::Decode(err.to_string())
        } else {
            StoreError::Unavailable(err.to_string())
        }
    }
}
