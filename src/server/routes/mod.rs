//! API routes and handlers.

mod bulk;
mod kv;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::StatusCode,
    middleware,
    routing::{delete, get, post},
};

use super::{auth, error::ApiError, state::AppState};

/// Build the API router.
///
/// Every route, including the fallback, sits behind the API key check.
pub fn router(state: AppState) -> Router {
    Router::new()
        // KV operations
        .route("/keys", get(kv::list_keys))
        .route("/get/{key}", get(kv::get_value))
        .route("/set", post(kv::set_value))
        .route("/delete/{key}", delete(kv::delete_value))
        .route("/flush", delete(kv::flush))
        // Bulk transfer
        .route("/download", get(bulk::download))
        .route(
            "/upload",
            post(bulk::upload).layer(DefaultBodyLimit::max(state.max_upload_bytes())),
        )
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_api_key,
        ))
        .with_state(state)
}

async fn not_found() -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, "ROUTE_NOT_FOUND", "Not found")
}
