//! Best-effort e-mail notice for new submissions.

use std::fmt::Write as _;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use super::domain::{ListingId, NewListing};
use crate::config::NotifierConfig;

const RESEND_API_URL: &str = "https://api.resend.com/emails";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Public fields of a freshly stored listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingNotice {
    pub id: ListingId,
    pub listing: NewListing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyOutcome {
    Sent,
    /// Destination or credentials are not configured.
    Skipped,
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
    #[error("notification provider answered {status}")]
    Rejected { status: u16 },
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notice: &ListingNotice) -> Result<NotifyOutcome, NotifyError>;
}

/// Notifier for deployments that do not send mail at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
    async fn notify(&self, _notice: &ListingNotice) -> Result<NotifyOutcome, NotifyError> {
        Ok(NotifyOutcome::Skipped)
    }
}

#[derive(Debug, Serialize)]
struct EmailRequest<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: String,
    text: String,
}

/// Sends one message through a Resend-compatible HTTP API.
pub struct EmailNotifier {
    client: Client,
    endpoint: String,
    config: NotifierConfig,
}

impl EmailNotifier {
    pub fn new(config: NotifierConfig) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| NotifyError::Transport(err.to_string()))?;
        Ok(Self::with_client(config, client, RESEND_API_URL))
    }

    pub fn with_client(config: NotifierConfig, client: Client, endpoint: &str) -> Self {
        Self {
            client,
            endpoint: endpoint.to_string(),
            config,
        }
    }

    fn request<'a>(&'a self, notice: &ListingNotice) -> Option<(&'a str, EmailRequest<'a>)> {
        let api_key = self.config.api_key.as_deref()?;
        let from = self.config.from.as_deref()?;
        let to = self.config.to.as_deref()?;

        Some((
            api_key,
            EmailRequest {
                from,
                to: vec![to],
                subject: format!("Novo cadastro de profissional: {}", notice.listing.name),
                text: render_notice(notice, self.config.site_url.as_deref()),
            },
        ))
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn notify(&self, notice: &ListingNotice) -> Result<NotifyOutcome, NotifyError> {
        let Some((api_key, request)) = self.request(notice) else {
            return Ok(NotifyOutcome::Skipped);
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|err| NotifyError::Transport(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(NotifyOutcome::Sent)
        } else {
            Err(NotifyError::Rejected {
                status: status.as_u16(),
            })
        }
    }
}

fn render_notice(notice: &ListingNotice, site_url: Option<&str>) -> String {
    let listing = &notice.listing;
    let mut body = String::new();

    let _ = writeln!(body, "Novo cadastro aguardando moderação (#{}).", notice.id);
    let _ = writeln!(body);
    let _ = writeln!(body, "Nome: {}", listing.name);
    let _ = writeln!(
        body,
        "Local: {} / {}",
        listing.city,
        listing.uf.to_uppercase()
    );

    let optional = [
        ("Categoria", &listing.category),
        ("Serviço", &listing.service),
        ("Descrição", &listing.description),
        ("WhatsApp", &listing.whatsapp),
        ("E-mail", &listing.email),
        ("Site", &listing.website),
    ];
    for (label, value) in optional {
        if let Some(value) = value {
            let _ = writeln!(body, "{label}: {value}");
        }
    }

    if let Some(site_url) = site_url {
        let _ = writeln!(body);
        let _ = writeln!(
            body,
            "Revisar: {}/admin/profissionais?status=pending",
            site_url.trim_end_matches('/')
        );
    }

    body
}
