//! Key-value operation handlers.

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use super::super::{error::ApiError, state::AppState};

/// Query parameters for listing keys.
#[derive(Debug, Deserialize, Default)]
pub struct ListQuery {
    pub prefix: Option<String>,
    pub limit: Option<usize>,
}

/// Body of a set request.
#[derive(Debug, Deserialize)]
pub struct SetRequest {
    pub key: String,
    pub value: Value,
}

/// A key together with its value.
#[derive(Debug, Serialize)]
pub struct KeyValueResponse {
    pub key: String,
    pub value: Value,
}

/// Confirmation of a mutation.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Confirmation of a flush.
#[derive(Debug, Serialize)]
pub struct FlushResponse {
    pub message: &'static str,
    pub removed: usize,
}

/// List keys in the store.
pub async fn list_keys(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<String>>, ApiError> {
    let Query(query) =
        query.map_err(|rejection| ApiError::invalid_query(rejection.body_text()))?;
    let keys = state
        .store()
        .list_keys_async(query.prefix, query.limit)
        .await?;

    Ok(Json(keys))
}

/// Get a value from the store.
pub async fn get_value(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<KeyValueResponse>, ApiError> {
    let value = state.store().get_async(key.clone()).await?;
    Ok(Json(KeyValueResponse { key, value }))
}

/// Set a value in the store.
pub async fn set_value(
    State(state): State<AppState>,
    payload: Result<Json<SetRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(SetRequest { key, value }) =
        payload.map_err(|rejection| ApiError::serialization(rejection.body_text()))?;

    let message = format!("Stored: {} -> {}", key, display_value(&value));
    state.store().put_async(key, value).await?;

    Ok(Json(MessageResponse { message }))
}

/// Delete a value from the store.
pub async fn delete_value(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.store().delete_async(key.clone()).await?;
    debug!(key = %key, "key deleted");

    Ok(Json(MessageResponse {
        message: format!("Deleted {}", key),
    }))
}

/// Remove every entry from the store.
pub async fn flush(State(state): State<AppState>) -> Result<Json<FlushResponse>, ApiError> {
    let removed = state.store().clear_async().await?;
    info!(removed = removed, "database flushed");

    Ok(Json(FlushResponse {
        message: "Database flushed",
        removed,
    }))
}

/// Strings are shown bare, everything else as JSON text.
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
