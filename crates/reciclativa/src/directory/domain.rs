use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned identifier of a listing. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingId(pub i64);

impl ListingId {
    /// Parses an identifier taken from a URL segment; only positive integers are accepted.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        match trimmed.parse::<i64>() {
            Ok(value) if value > 0 => Some(Self(value)),
            _ => None,
        }
    }
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Moderation lifecycle of a listing. `Approved` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ListingStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ListingStatus::Pending => "pending",
            ListingStatus::Approved => "approved",
            ListingStatus::Rejected => "rejected",
        }
    }

    pub const fn is_terminal(self) -> bool {
        !matches!(self, ListingStatus::Pending)
    }
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown listing status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for ListingStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Accepted submission, ready to be persisted as a pending listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewListing {
    pub name: String,
    pub uf: String,
    pub city: String,
    pub category: Option<String>,
    pub service: Option<String>,
    pub description: Option<String>,
    pub whatsapp: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
}

/// A stored directory entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfessionalListing {
    pub id: ListingId,
    pub name: String,
    pub uf: String,
    pub city: String,
    pub category: Option<String>,
    pub service: Option<String>,
    pub description: Option<String>,
    pub whatsapp: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub status: ListingStatus,
    pub created_at: DateTime<Utc>,
}

impl ProfessionalListing {
    pub fn from_new(
        id: ListingId,
        listing: NewListing,
        created_at: DateTime<Utc>,
    ) -> ProfessionalListing {
        let NewListing {
            name,
            uf,
            city,
            category,
            service,
            description,
            whatsapp,
            email,
            website,
        } = listing;

        ProfessionalListing {
            id,
            name,
            uf,
            city,
            category,
            service,
            description,
            whatsapp,
            email,
            website,
            status: ListingStatus::Pending,
            created_at,
        }
    }

    /// Comparison key for the city; never shown to visitors.
    pub fn city_slug(&self) -> String {
        city_slug(&self.city)
    }
}

/// Lowercases, strips diacritics and collapses every non-alphanumeric run into a hyphen.
pub fn city_slug(city: &str) -> String {
    slug::slugify(city)
}
