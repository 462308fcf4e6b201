use async_trait::async_trait;
use metrics_exporter_prometheus::PrometheusHandle;
use reciclativa::config::StorageConfig;
use reciclativa::directory::{
    DirectoryStore, InMemoryDirectoryStore, ListingId, ListingStatus, NewListing,
    ProfessionalListing, StatusChange, StoreError, SupabaseDirectoryStore,
};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Store picked at startup: the hosted table when configured, memory otherwise.
pub(crate) enum ConfiguredStore {
    Hosted(SupabaseDirectoryStore),
    Memory(InMemoryDirectoryStore),
}

impl ConfiguredStore {
    pub(crate) fn from_config(config: &StorageConfig) -> Result<Self, StoreError> {
        match &config.supabase {
            Some(supabase) => {
                info!(table = %supabase.table, "using hosted listings table");
                Ok(Self::Hosted(SupabaseDirectoryStore::new(supabase)?))
            }
            None => {
                warn!("hosted table not configured; listings are kept in memory");
                Ok(Self::Memory(InMemoryDirectoryStore::new()))
            }
        }
    }

    pub(crate) fn label(&self) -> &'static str {
        match self {
            Self::Hosted(_) => "supabase",
            Self::Memory(_) => "memory",
        }
    }
}

#[async_trait]
impl DirectoryStore for ConfiguredStore {
    async fn insert(&self, listing: NewListing) -> Result<ListingId, StoreError> {
        match self {
            Self::Hosted(store) => store.insert(listing).await,
            Self::Memory(store) => store.insert(listing).await,
        }
    }

    async fn list_by_status(
        &self,
        status: ListingStatus,
    ) -> Result<Vec<ProfessionalListing>, StoreError> {
        match self {
            Self::Hosted(store) => store.list_by_status(status).await,
            Self::Memory(store) => store.list_by_status(status).await,
        }
    }

    async fn set_status(
        &self,
        id: ListingId,
        status: ListingStatus,
    ) -> Result<StatusChange, StoreError> {
        match self {
            Self::Hosted(store) => store.set_status(id, status).await,
            Self::Memory(store) => store.set_status(id, status).await,
        }
    }
}

pub(crate) fn parse_status(raw: &str) -> Result<ListingStatus, String> {
    raw.parse::<ListingStatus>().map_err(|err| err.to_string())
}
