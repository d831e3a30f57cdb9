//! Key-value store module for JSON values.
//!
//! This module provides a persistent, ordered key-value store backed by
//! fjall. Keys are UTF-8 strings, values are arbitrary JSON documents
//! stored in their serialized form.

#[cfg(feature = "async")]
mod async_ops;
mod error;
mod store;
mod types;

pub use error::KvError;
pub use store::{MAX_KEY_LEN, Store};
pub use types::Entry;
