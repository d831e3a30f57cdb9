//! Convenient re-exports for common usage patterns.
//!
//! This module provides a single import to bring all commonly used types
//! into scope.
//!
//! # Example
//!
//! ```ignore
//! use jsonkv::prelude::*;
//!
//! let store = Store::open("./data")?;
//! store.put("p1", &serde_json::json!({"x": 10, "y": 20}))?;
//! ```

// Unified error handling
pub use crate::error::{Error, Result};

// KV store types (requires "kv" feature)
#[cfg(feature = "kv")]
pub use crate::kv::{Entry, KvError, Store};

// Bulk transfer (requires "transfer" feature)
#[cfg(feature = "transfer")]
pub use crate::transfer::{
    ExportFile, ImportReport, TransferError, export_to_temp, import_document, import_file,
    import_reader, import_upload, snapshot,
};
