//! HTTP API server for jsonkv.
//!
//! This module exposes the store over HTTP using axum. Every request must
//! carry the shared API key in the `x-api-key` header; the handlers then
//! map onto the store and bulk transfer operations.

mod auth;
mod config;
mod error;
mod logging;
mod routes;
mod state;

pub use auth::{API_KEY_HEADER, AccessGate};
pub use config::{
    AuthConfig, Config, ConfigError, CorsConfig, LogFormat, LoggingConfig, Overrides,
    ServerConfig, StorageConfig,
};
pub use error::ApiError;
pub use logging::{LoggingError, init as init_logging};
pub use routes::router;
pub use state::{AppState, StateError};
