//! Professional directory: public intake, moderation and the approved-listing projection.
//!
//! A submission flows through [`normalizer`] and [`validation`] before the
//! [`DirectoryStore`] records it as pending; the [`Notifier`] is then given a chance to tell
//! the team. Operators holding the session secret checked by [`AdminGate`] approve or reject
//! pending listings exactly once.

pub mod domain;
pub mod gate;
pub mod memory;
pub mod normalizer;
pub mod notifier;
pub mod projection;
pub mod repository;
pub mod router;
pub mod service;
pub mod supabase;
pub mod validation;

#[cfg(test)]
mod tests;

pub use domain::{city_slug, ListingId, ListingStatus, NewListing, ProfessionalListing};
pub use gate::{AdminGate, LoginError, SESSION_COOKIE};
pub use memory::InMemoryDirectoryStore;
pub use normalizer::{normalize, ListingCandidate, RawSubmission};
pub use notifier::{
    DisabledNotifier, EmailNotifier, ListingNotice, Notifier, NotifyError, NotifyOutcome,
};
pub use projection::PublicDirectory;
pub use repository::{DirectoryStore, StatusChange, StoreError};
pub use router::directory_router;
pub use service::{Decision, DirectoryService, DirectoryServiceError};
pub use supabase::SupabaseDirectoryStore;
pub use validation::{validate, ValidationError};
