use std::collections::BTreeMap;

use serde::Serialize;

use super::domain::{city_slug, ListingStatus, ProfessionalListing};

/// Bucket used for listings submitted without a category.
pub const UNCATEGORIZED: &str = "";

/// Approved listings grouped by region, city slug and category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PublicDirectory {
    pub regions: BTreeMap<String, RegionGroup>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegionGroup {
    pub cities: BTreeMap<String, CityGroup>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CityGroup {
    /// Display label of the first listing seen for this slug.
    pub label: String,
    pub categories: BTreeMap<String, Vec<ProfessionalListing>>,
}

impl PublicDirectory {
    /// Builds the projection, silently skipping anything that is not approved. Input order is
    /// kept inside each bucket.
    pub fn from_listings<I>(listings: I) -> Self
    where
        I: IntoIterator<Item = ProfessionalListing>,
    {
        let mut directory = PublicDirectory::default();
        for listing in listings {
            if listing.status != ListingStatus::Approved {
                continue;
            }
            let city = directory
                .regions
                .entry(listing.uf.clone())
                .or_default()
                .cities
                .entry(city_slug(&listing.city))
                .or_insert_with(|| CityGroup {
                    label: listing.city.clone(),
                    categories: BTreeMap::new(),
                });
            let category = listing
                .category
                .clone()
                .unwrap_or_else(|| UNCATEGORIZED.to_string());
            city.categories.entry(category).or_default().push(listing);
        }
        directory
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn city(&self, uf: &str, city: &str) -> Option<&CityGroup> {
        self.regions
            .get(&uf.to_lowercase())?
            .cities
            .get(&city_slug(city))
    }

    pub fn listing_count(&self) -> usize {
        self.regions
            .values()
            .flat_map(|region| region.cities.values())
            .flat_map(|city| city.categories.values())
            .map(Vec::len)
            .sum()
    }
}
