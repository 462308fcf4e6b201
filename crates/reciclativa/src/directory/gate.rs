//! Shared-secret admin gate.
//!
//! Operators log in with `ADMIN_PASSWORD`; the gate then hands out a cookie holding
//! `ADMIN_SESSION_TOKEN`. Every admin route compares the presented token with the configured
//! one. An unconfigured token never grants access.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::{COOKIE, LOCATION};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use tracing::{debug, warn};

use crate::config::AdminConfig;

pub const SESSION_COOKIE: &str = "reciclativa_admin";
pub const SESSION_MAX_AGE_SECS: u64 = 12 * 60 * 60;
pub const ADMIN_PREFIX: &str = "/admin";
pub const LOGIN_PATH: &str = "/admin/login";

/// Why a login attempt was refused. The code travels back to the login view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LoginError {
    #[error("admin credentials are not configured")]
    Unconfigured,
    #[error("wrong admin password")]
    BadPassword,
}

impl LoginError {
    pub const fn code(self) -> &'static str {
        match self {
            LoginError::Unconfigured => "env",
            LoginError::BadPassword => "badpass",
        }
    }
}

#[derive(Clone)]
pub struct AdminGate {
    config: Arc<AdminConfig>,
}

impl std::fmt::Debug for AdminGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminGate")
            .field("config", &self.config)
            .finish()
    }
}

impl AdminGate {
    pub fn new(config: AdminConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// True only when a session token is configured and `presented` matches it exactly.
    pub fn authorize(&self, presented: Option<&str>) -> bool {
        match (self.expected_token(), presented) {
            (Some(expected), Some(presented)) => constant_time_eq(expected, presented),
            _ => false,
        }
    }

    pub fn authorize_headers(&self, headers: &HeaderMap) -> bool {
        self.authorize(session_cookie(headers).as_deref())
    }

    /// Checks the operator password and returns the `Set-Cookie` value opening a session.
    pub fn login(&self, password: &str) -> Result<String, LoginError> {
        let (Some(expected), Some(token)) = (
            self.config.password.as_deref().filter(|p| !p.is_empty()),
            self.expected_token(),
        ) else {
            return Err(LoginError::Unconfigured);
        };

        if constant_time_eq(expected, password) {
            Ok(self.session_cookie_header(token, SESSION_MAX_AGE_SECS))
        } else {
            Err(LoginError::BadPassword)
        }
    }

    /// `Set-Cookie` value that clears the session.
    pub fn logout_cookie(&self) -> String {
        self.session_cookie_header("", 0)
    }

    fn expected_token(&self) -> Option<&str> {
        self.config
            .session_token
            .as_deref()
            .filter(|token| !token.is_empty())
    }

    fn session_cookie_header(&self, value: &str, max_age: u64) -> String {
        let mut parts = vec![
            format!("{SESSION_COOKIE}={value}"),
            "Path=/".to_string(),
            "HttpOnly".to_string(),
            "SameSite=Lax".to_string(),
        ];
        if self.config.secure_cookie {
            parts.push("Secure".to_string());
        }
        parts.push(format!("Max-Age={max_age}"));
        parts.join("; ")
    }
}

/// Compares digests so neither the contents nor the length of the secret leak through timing.
fn constant_time_eq(expected: &str, presented: &str) -> bool {
    let expected = Sha256::digest(expected.as_bytes());
    let presented = Sha256::digest(presented.as_bytes());
    expected.ct_eq(&presented).into()
}

/// Reads the session cookie from every `Cookie` header of the request.
pub fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim().to_string())
}

/// Only admin paths are acceptable post-login destinations.
pub fn sanitize_next(next: Option<&str>) -> String {
    match next {
        Some(next)
            if (next == ADMIN_PREFIX || next.starts_with("/admin/") || next.starts_with("/admin?"))
                && !next.starts_with(LOGIN_PATH) =>
        {
            next.to_string()
        }
        _ => ADMIN_PREFIX.to_string(),
    }
}

pub fn login_redirect_location(next: Option<&str>, error: Option<&str>) -> String {
    let mut params: Vec<(&str, &str)> = Vec::new();
    if let Some(error) = error {
        params.push(("error", error));
    }
    if let Some(next) = next {
        params.push(("next", next));
    }
    if params.is_empty() {
        return LOGIN_PATH.to_string();
    }
    match serde_urlencoded::to_string(&params) {
        Ok(query) => format!("{LOGIN_PATH}?{query}"),
        Err(_) => LOGIN_PATH.to_string(),
    }
}

pub fn see_other(location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => (StatusCode::SEE_OTHER, [(LOCATION, value)]).into_response(),
        Err(_) => StatusCode::BAD_REQUEST.into_response(),
    }
}

fn is_admin_path(path: &str) -> bool {
    path == ADMIN_PREFIX || path.starts_with("/admin/")
}

/// Route guard for the `/admin` pages. Unauthenticated requests go to the login view with
/// the original path kept in `next`.
pub async fn require_admin_session(
    State(gate): State<AdminGate>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path();
    if path == LOGIN_PATH || !is_admin_path(path) {
        return next.run(request).await;
    }

    if gate.authorize_headers(request.headers()) {
        debug!(path, "admin session accepted");
        return next.run(request).await;
    }

    let original = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| path.to_string());
    warn!(path, "admin session missing or invalid");
    see_other(&login_redirect_location(Some(&original), None))
}
