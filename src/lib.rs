//! An embedded JSON key-value store with an authenticated HTTP API.
//!
//! jsonkv keeps string keys and JSON values in a single ordered fjall
//! keyspace. On top of the store it offers whole-database export and
//! import, and an axum server that exposes both behind a shared API key.
//!
//! # Quick Start
//!
//! ```ignore
//! use jsonkv::prelude::*;
//! use serde_json::json;
//!
//! let store = Store::open("./data")?;
//!
//! store.put("greeting", &json!({"text": "hello"}))?;
//! let value = store.get("greeting")?;
//!
//! // Write the whole store to a temporary JSON file
//! let export = export_to_temp(&store, None)?;
//! ```
//!
//! # Modules
//!
//! - [`kv`] - Ordered key-value store backed by fjall (requires `kv` feature)
//! - [`transfer`] - Bulk export and import (requires `transfer` feature)
//! - [`server`] - HTTP API server (requires `server` feature)
//!
//! # Feature Flags
//!
//! - `kv` - Enable the key-value store module (enabled by default)
//! - `transfer` - Enable bulk export/import (enabled by default)
//! - `async` - Enable async wrappers running store calls on tokio's blocking pool
//! - `logging` - Enable library-level tracing (consumers provide their own subscriber)
//! - `server` - Enable the HTTP API server
//! - `full` - Enable all features

mod logging;
#[cfg(feature = "kv")]
pub mod kv;
pub mod prelude;
#[cfg(feature = "server")]
pub mod server;
#[cfg(feature = "transfer")]
pub mod transfer;

mod error;

// Re-export the unified error type
pub use error::{Error, Result};

// Re-export KV types at crate root for convenience
#[cfg(feature = "kv")]
pub use kv::{Entry, KvError, MAX_KEY_LEN, Store};

// Re-export transfer types at crate root for convenience
#[cfg(feature = "transfer")]
pub use transfer::{ExportFile, ImportReport, TransferError};
