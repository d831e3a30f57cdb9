//! API error types and JSON response formatting.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{debug, error};

use crate::kv::KvError;
use crate::transfer::TransferError;

/// API error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
}

/// API error type that converts to HTTP responses.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    /// Create a new API error.
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    /// Missing or wrong API key.
    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "Unauthorized")
    }

    /// Key not found error.
    pub fn key_not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "KEY_NOT_FOUND", "Key not found")
    }

    /// Unusable key supplied by the client.
    ///
    /// Like every other failed write this is reported as a server error.
    pub fn invalid_key(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INVALID_KEY", message)
    }

    /// Query string could not be parsed.
    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "INVALID_QUERY", message)
    }

    /// Missing multipart field error.
    pub fn missing_field(field_name: &str) -> Self {
        Self::upload(format!(
            "Required field '{}' is missing from the request",
            field_name
        ))
    }

    /// The uploaded file could not be staged.
    pub fn upload(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "UPLOAD_ERROR", message)
    }

    /// Storage engine failure.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR", message)
    }

    /// JSON encoding or decoding failure.
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "SERIALIZATION_ERROR", message)
    }

    /// Internal server error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Log server errors at error level, client errors at debug level
        if self.status.is_server_error() {
            error!(
                status = %self.status.as_u16(),
                code = %self.code,
                message = %self.message,
                "server error response"
            );
        } else if self.status.is_client_error() {
            debug!(
                status = %self.status.as_u16(),
                code = %self.code,
                message = %self.message,
                "client error response"
            );
        }

        let body = ErrorResponse {
            error: self.message,
            code: self.code,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<KvError> for ApiError {
    fn from(err: KvError) -> Self {
        match &err {
            KvError::KeyNotFound(_) => Self::key_not_found(),
            KvError::InvalidKey(msg) => Self::invalid_key(msg.clone()),
            KvError::Encode { .. } | KvError::Corrupt { .. } => Self::serialization(err.to_string()),
            KvError::Task(_) => Self::internal(err.to_string()),
            _ => Self::storage(err.to_string()),
        }
    }
}

impl From<TransferError> for ApiError {
    fn from(err: TransferError) -> Self {
        match err {
            TransferError::Kv(kv) => kv.into(),
            TransferError::Serialization(_) => Self::serialization(err.to_string()),
            TransferError::Import { .. } => Self::storage(err.to_string()),
            TransferError::Io(_) => Self::internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_404() {
        let err = ApiError::from(KvError::KeyNotFound("k".into()));
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.message, "Key not found");
    }

    #[test]
    fn test_invalid_key_maps_to_500() {
        let err = ApiError::from(KvError::InvalidKey("key must not be empty".into()));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code, "INVALID_KEY");
    }

    #[test]
    fn test_missing_field_is_upload_error() {
        let err = ApiError::missing_field("file");
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code, "UPLOAD_ERROR");
        assert!(err.message.contains("'file'"));
    }

    #[test]
    fn test_io_failure_maps_to_500_with_message() {
        let io = std::io::Error::other("disk on fire");
        let err = ApiError::from(KvError::Io(io));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code, "STORAGE_ERROR");
        assert!(err.message.contains("disk on fire"));
    }

    #[test]
    fn test_malformed_import_maps_to_500() {
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ApiError::from(TransferError::Serialization(parse));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code, "SERIALIZATION_ERROR");
        assert!(err.message.starts_with("Invalid JSON document"));
    }

    #[test]
    fn test_transfer_wraps_store_errors() {
        let err = ApiError::from(TransferError::Kv(KvError::KeyNotFound("k".into())));
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }
}
