use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{
        header::{CONTENT_TYPE, SET_COOKIE},
        HeaderMap, HeaderValue, StatusCode,
    },
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use mime::Mime;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info, warn};

use super::domain::{ListingId, ListingStatus};
use super::gate::{
    login_redirect_location, require_admin_session, sanitize_next, see_other, AdminGate,
    LOGIN_PATH,
};
use super::normalizer::RawSubmission;
use super::notifier::Notifier;
use super::repository::DirectoryStore;
use super::service::{Decision, DirectoryService, DirectoryServiceError};

pub const SUBMIT_PATH: &str = "/api/profissionais";
pub const ADMIN_LISTINGS_PATH: &str = "/admin/profissionais";

/// Shared handler state: the directory service plus the admin gate.
pub struct DirectoryState<S, N> {
    pub service: Arc<DirectoryService<S, N>>,
    pub gate: AdminGate,
}

impl<S, N> Clone for DirectoryState<S, N> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            gate: self.gate.clone(),
        }
    }
}

/// Router exposing public intake, the admin session endpoints and moderation.
pub fn directory_router<S, N>(service: Arc<DirectoryService<S, N>>, gate: AdminGate) -> Router
where
    S: DirectoryStore + 'static,
    N: Notifier + 'static,
{
    let state = DirectoryState {
        service,
        gate: gate.clone(),
    };

    // The guard wraps the fallback too, so unknown /admin paths still require a session.
    Router::new()
        .route(SUBMIT_PATH, post(submit_handler::<S, N>))
        .route("/api/diretorio", get(public_directory_handler::<S, N>))
        .route(
            "/api/admin/profissionais/:id/approve",
            post(approve_handler::<S, N>),
        )
        .route(
            "/api/admin/profissionais/:id/reject",
            post(reject_handler::<S, N>),
        )
        .route("/api/admin/login", post(login_handler::<S, N>))
        .route(
            "/api/admin/logout",
            get(logout_handler::<S, N>).post(logout_handler::<S, N>),
        )
        .route(LOGIN_PATH, get(login_view))
        .route("/admin", get(admin_home))
        .route(ADMIN_LISTINGS_PATH, get(admin_listings_handler::<S, N>))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(gate, require_admin_session))
        .with_state(state)
}

async fn not_found() -> Response {
    failure(StatusCode::NOT_FOUND, "NOT_FOUND")
}

fn failure(status: StatusCode, error: &str) -> Response {
    (status, Json(json!({ "ok": false, "error": error }))).into_response()
}

/// Decodes a form-encoded or JSON body. Anything unreadable becomes an empty payload, which
/// the validator then rejects.
pub(crate) fn decode_submission(headers: &HeaderMap, body: &[u8]) -> RawSubmission {
    let is_form = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<Mime>().ok())
        .map(|media| {
            media.type_() == mime::APPLICATION && media.subtype() == mime::WWW_FORM_URLENCODED
        })
        .unwrap_or(false);

    if is_form {
        return serde_urlencoded::from_bytes::<Vec<(String, String)>>(body)
            .map(RawSubmission::from_pairs)
            .unwrap_or_default();
    }

    serde_json::from_slice::<Value>(body)
        .map(RawSubmission::from_json)
        .unwrap_or_default()
}

pub(crate) async fn submit_handler<S, N>(
    State(state): State<DirectoryState<S, N>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response
where
    S: DirectoryStore + 'static,
    N: Notifier + 'static,
{
    let raw = decode_submission(&headers, &body);
    match state.service.submit(raw).await {
        Ok(id) => (StatusCode::OK, Json(json!({ "ok": true, "id": id }))).into_response(),
        Err(DirectoryServiceError::Validation(err)) => failure(StatusCode::BAD_REQUEST, err.code()),
        Err(DirectoryServiceError::Store(err)) => {
            error!(error = %err, "submission could not be stored");
            failure(StatusCode::INTERNAL_SERVER_ERROR, "STORE_UNAVAILABLE")
        }
    }
}

pub(crate) async fn public_directory_handler<S, N>(
    State(state): State<DirectoryState<S, N>>,
) -> Response
where
    S: DirectoryStore + 'static,
    N: Notifier + 'static,
{
    let directory = state.service.public_directory().await;
    (
        StatusCode::OK,
        Json(json!({ "ok": true, "directory": directory })),
    )
        .into_response()
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TokenQuery {
    #[serde(default)]
    pub(crate) token: Option<String>,
}

pub(crate) async fn approve_handler<S, N>(
    State(state): State<DirectoryState<S, N>>,
    Path(id): Path<String>,
    Query(query): Query<TokenQuery>,
) -> Response
where
    S: DirectoryStore + 'static,
    N: Notifier + 'static,
{
    moderate(state, &id, query, Decision::Approve).await
}

pub(crate) async fn reject_handler<S, N>(
    State(state): State<DirectoryState<S, N>>,
    Path(id): Path<String>,
    Query(query): Query<TokenQuery>,
) -> Response
where
    S: DirectoryStore + 'static,
    N: Notifier + 'static,
{
    moderate(state, &id, query, Decision::Reject).await
}

async fn moderate<S, N>(
    state: DirectoryState<S, N>,
    raw_id: &str,
    query: TokenQuery,
    decision: Decision,
) -> Response
where
    S: DirectoryStore + 'static,
    N: Notifier + 'static,
{
    let status = decision.target();
    let token = query.token.unwrap_or_default();
    if !state.gate.authorize(Some(&token)) {
        warn!(%status, "moderation denied: invalid admin token");
        return failure(StatusCode::NOT_FOUND, "NOT_FOUND");
    }

    let Some(id) = ListingId::parse(raw_id) else {
        return failure(StatusCode::BAD_REQUEST, "INVALID_ID");
    };

    match state.service.decide(id, decision).await {
        Ok(_) => see_other(&admin_listings_location(&token, ListingStatus::Pending)),
        Err(err) => {
            error!(%id, error = %err, "moderation failed");
            failure(StatusCode::INTERNAL_SERVER_ERROR, "STORE_UNAVAILABLE")
        }
    }
}

pub(crate) fn admin_listings_location(token: &str, status: ListingStatus) -> String {
    let params = [("token", token), ("status", status.label())];
    match serde_urlencoded::to_string(params) {
        Ok(query) => format!("{ADMIN_LISTINGS_PATH}?{query}"),
        Err(_) => ADMIN_LISTINGS_PATH.to_string(),
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct LoginForm {
    #[serde(default)]
    pub(crate) password: Option<String>,
    #[serde(default)]
    pub(crate) next: Option<String>,
}

pub(crate) async fn login_handler<S, N>(
    State(state): State<DirectoryState<S, N>>,
    Form(form): Form<LoginForm>,
) -> Response
where
    S: DirectoryStore + 'static,
    N: Notifier + 'static,
{
    let next = sanitize_next(form.next.as_deref());
    match state.gate.login(form.password.as_deref().unwrap_or_default()) {
        Ok(cookie) => {
            info!("admin session opened");
            with_cookie(see_other(&next), &cookie)
        }
        Err(err) => {
            warn!(reason = err.code(), "admin login refused");
            see_other(&login_redirect_location(Some(&next), Some(err.code())))
        }
    }
}

pub(crate) async fn logout_handler<S, N>(State(state): State<DirectoryState<S, N>>) -> Response
where
    S: DirectoryStore + 'static,
    N: Notifier + 'static,
{
    info!("admin session closed");
    with_cookie(see_other(LOGIN_PATH), &state.gate.logout_cookie())
}

fn with_cookie(mut response: Response, cookie: &str) -> Response {
    match HeaderValue::from_str(cookie) {
        Ok(value) => {
            response.headers_mut().append(SET_COOKIE, value);
            response
        }
        Err(_) => failure(StatusCode::INTERNAL_SERVER_ERROR, "COOKIE_UNAVAILABLE"),
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct LoginViewQuery {
    #[serde(default)]
    pub(crate) next: Option<String>,
    #[serde(default)]
    pub(crate) error: Option<String>,
}

/// Login view; markup is rendered by the site, this only reports what it needs.
pub(crate) async fn login_view(Query(query): Query<LoginViewQuery>) -> Json<Value> {
    Json(json!({
        "ok": true,
        "view": "login",
        "action": "/api/admin/login",
        "next": sanitize_next(query.next.as_deref()),
        "error": query.error,
    }))
}

async fn admin_home() -> Response {
    see_other(&format!(
        "{ADMIN_LISTINGS_PATH}?status={}",
        ListingStatus::Pending.label()
    ))
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListingViewQuery {
    #[serde(default)]
    pub(crate) status: Option<String>,
}

pub(crate) async fn admin_listings_handler<S, N>(
    State(state): State<DirectoryState<S, N>>,
    Query(query): Query<ListingViewQuery>,
) -> Response
where
    S: DirectoryStore + 'static,
    N: Notifier + 'static,
{
    let status = query
        .status
        .as_deref()
        .and_then(|raw| raw.parse::<ListingStatus>().ok())
        .unwrap_or_default();

    match state.service.listings(status).await {
        Ok(listings) => (
            StatusCode::OK,
            Json(json!({
                "ok": true,
                "status": status,
                "count": listings.len(),
                "listings": listings,
            })),
        )
            .into_response(),
        Err(err) => {
            error!(%status, error = %err, "admin listing unavailable");
            failure(StatusCode::INTERNAL_SERVER_ERROR, "STORE_UNAVAILABLE")
        }
    }
}
