//! Hosted table reached through its PostgREST interface.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{ListingId, ListingStatus, NewListing, ProfessionalListing};
use super::repository::{DirectoryStore, StatusChange, StoreError};
use crate::config::SupabaseConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Row shape of the listings table.
#[derive(Debug, Clone, Deserialize)]
struct ListingRow {
    id: i64,
    name: String,
    uf: String,
    city: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    service: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    whatsapp: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    website: Option<String>,
    status: ListingStatus,
    created_at: DateTime<Utc>,
}

impl From<ListingRow> for ProfessionalListing {
    fn from(row: ListingRow) -> Self {
        ProfessionalListing {
            id: ListingId(row.id),
            name: row.name,
            uf: row.uf,
            city: row.city,
            category: row.category,
            service: row.service,
            description: row.description,
            whatsapp: row.whatsapp,
            email: row.email,
            website: row.website,
            status: row.status,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
struct InsertRow<'a> {
    #[serde(flatten)]
    listing: &'a NewListing,
    status: ListingStatus,
}

#[derive(Debug, Deserialize)]
struct InsertedRow {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct UpdatedRow {
    #[allow(dead_code)]
    id: i64,
}

pub struct SupabaseDirectoryStore {
    client: Client,
    base_url: String,
    table: String,
    service_key: String,
}

impl SupabaseDirectoryStore {
    pub fn new(config: &SupabaseConfig) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| StoreError::Unavailable(format!("http client: {err}")))?;
        Ok(Self::with_client(config, client))
    }

    pub fn with_client(config: &SupabaseConfig, client: Client) -> Self {
        Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            table: config.table.clone(),
            service_key: config.service_key.clone(),
        }
    }

    pub(crate) fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    pub(crate) fn list_query(status: ListingStatus) -> Vec<(&'static str, String)> {
        vec![
            ("select", "*".to_string()),
            ("status", format!("eq.{}", status.label())),
            ("order", "created_at.desc,id.desc".to_string()),
        ]
    }

    pub(crate) fn transition_query(id: ListingId) -> Vec<(&'static str, String)> {
        vec![
            ("id", format!("eq.{}", id.0)),
            ("status", format!("eq.{}", ListingStatus::Pending.label())),
        ]
    }

    fn headers(&self) -> Result<HeaderMap, StoreError> {
        let key = HeaderValue::from_str(&self.service_key)
            .map_err(|_| StoreError::Unavailable("service key is not a valid header".into()))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.service_key))
            .map_err(|_| StoreError::Unavailable("service key is not a valid header".into()))?;

        let mut headers = HeaderMap::new();
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));
        Ok(headers)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, StoreError> {
        let response = request.headers(self.headers()?).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(StoreError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl DirectoryStore for SupabaseDirectoryStore {
    async fn insert(&self, listing: NewListing) -> Result<ListingId, StoreError> {
        let row = InsertRow {
            listing: &listing,
            status: ListingStatus::Pending,
        };
        let response = self
            .send(self.client.post(self.table_url()).json(&row))
            .await?;
        let inserted: Vec<InsertedRow> = response.json().await?;
        inserted
            .first()
            .map(|row| ListingId(row.id))
            .ok_or_else(|| StoreError::Decode("insert returned no rows".to_string()))
    }

    async fn list_by_status(
        &self,
        status: ListingStatus,
    ) -> Result<Vec<ProfessionalListing>, StoreError> {
        let response = self
            .send(
                self.client
                    .get(self.table_url())
                    .query(&Self::list_query(status)),
            )
            .await?;
        let rows: Vec<ListingRow> = response.json().await?;
        Ok(rows.into_iter().map(ProfessionalListing::from).collect())
    }

    async fn set_status(
        &self,
        id: ListingId,
        status: ListingStatus,
    ) -> Result<StatusChange, StoreError> {
        let response = self
            .send(
                self.client
                    .patch(self.table_url())
                    .query(&Self::transition_query(id))
                    .json(&json!({ "status": status })),
            )
            .await?;
        let updated: Vec<UpdatedRow> = response.json().await?;
        Ok(if updated.is_empty() {
            StatusChange::Unchanged
        } else {
            StatusChange::Applied
        })
    }
}
