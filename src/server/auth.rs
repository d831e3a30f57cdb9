//! Shared API key check applied to every request.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use subtle::ConstantTimeEq;
use tracing::debug;

use super::error::ApiError;
use super::state::AppState;

/// Header carrying the caller's credential.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Compares the presented credential against the configured secret.
///
/// With no secret configured, nothing is accepted.
#[derive(Clone, Default)]
pub struct AccessGate {
    secret: Option<Arc<str>>,
}

impl AccessGate {
    pub fn new(secret: Option<&str>) -> Self {
        Self {
            secret: secret.map(Arc::from),
        }
    }

    /// Whether a secret is configured at all.
    pub fn is_configured(&self) -> bool {
        self.secret.is_some()
    }

    /// Check a presented credential.
    ///
    /// Bytes are compared in constant time; only a length mismatch exits
    /// early.
    pub fn check(&self, presented: Option<&str>) -> Result<(), ApiError> {
        match (self.secret.as_deref(), presented) {
            (Some(secret), Some(presented)) if secrets_match(secret, presented) => Ok(()),
            _ => Err(ApiError::unauthorized()),
        }
    }

    /// Check the credential carried by `headers`.
    pub fn check_headers(&self, headers: &HeaderMap) -> Result<(), ApiError> {
        let presented = headers
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok());
        self.check(presented)
    }
}

fn secrets_match(secret: &str, presented: &str) -> bool {
    secret.as_bytes().ct_eq(presented.as_bytes()).into()
}

impl std::fmt::Debug for AccessGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessGate")
            .field("configured", &self.is_configured())
            .finish()
    }
}

/// Middleware rejecting requests that do not carry the API key.
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Err(e) = state.gate().check_headers(request.headers()) {
        debug!(
            method = %request.method(),
            path = %request.uri().path(),
            "rejected unauthenticated request"
        );
        return Err(e);
    }

    Ok(next.run(request).await)
}
