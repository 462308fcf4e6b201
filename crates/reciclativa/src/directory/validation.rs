use std::sync::OnceLock;

use regex::Regex;

use super::domain::NewListing;
use super::normalizer::{ListingCandidate, REGION_LEN};

const NAME_MIN: usize = 2;
const CITY_MIN: usize = 2;

/// Field-level rejection. The code is part of the public API response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("INVALID_NAME")]
    InvalidName,
    #[error("INVALID_REGION")]
    InvalidRegion,
    #[error("INVALID_CITY")]
    InvalidCity,
    #[error("INVALID_EMAIL")]
    InvalidEmail,
}

impl ValidationError {
    pub const fn code(self) -> &'static str {
        match self {
            ValidationError::InvalidName => "INVALID_NAME",
            ValidationError::InvalidRegion => "INVALID_REGION",
            ValidationError::InvalidCity => "INVALID_CITY",
            ValidationError::InvalidEmail => "INVALID_EMAIL",
        }
    }
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex compiles"))
}

pub fn is_valid_email(value: &str) -> bool {
    email_pattern().is_match(value)
}

pub fn check_name(name: Option<&str>) -> Result<(), ValidationError> {
    match name {
        Some(name) if name.chars().count() >= NAME_MIN => Ok(()),
        _ => Err(ValidationError::InvalidName),
    }
}

pub fn check_region(uf: Option<&str>) -> Result<(), ValidationError> {
    match uf {
        Some(uf)
            if uf.chars().count() == REGION_LEN && uf.chars().all(|c| c.is_ascii_alphabetic()) =>
        {
            Ok(())
        }
        _ => Err(ValidationError::InvalidRegion),
    }
}

pub fn check_city(city: Option<&str>) -> Result<(), ValidationError> {
    match city {
        Some(city) if city.chars().count() >= CITY_MIN => Ok(()),
        _ => Err(ValidationError::InvalidCity),
    }
}

/// Blank or absent e-mails are accepted; anything else must look like `local@domain.tld`.
pub fn check_email(email: Option<&str>) -> Result<(), ValidationError> {
    match email {
        Some(email) if !email.is_empty() && !is_valid_email(email) => {
            Err(ValidationError::InvalidEmail)
        }
        _ => Ok(()),
    }
}

/// Applies the rules in order; the first failure wins. Optional fields carry no rule
/// beyond the caps already applied by the normalizer.
pub fn validate(candidate: ListingCandidate) -> Result<NewListing, ValidationError> {
    check_name(candidate.name.as_deref())?;
    check_region(candidate.uf.as_deref())?;
    check_city(candidate.city.as_deref())?;
    check_email(candidate.email.as_deref())?;

    let ListingCandidate {
        name,
        uf,
        city,
        category,
        service,
        description,
        whatsapp,
        email,
        website,
    } = candidate;

    Ok(NewListing {
        name: name.unwrap_or_default(),
        uf: uf.unwrap_or_default(),
        city: city.unwrap_or_default(),
        category: non_blank(category),
        service: non_blank(service),
        description: non_blank(description),
        whatsapp: non_blank(whatsapp),
        email: non_blank(email),
        website: non_blank(website),
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}
