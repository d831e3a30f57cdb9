//! Unified error type for the jsonkv library.
//!
//! This module provides a single [`Error`] type that encompasses all errors
//! that can occur in the library, making it easier to handle errors in
//! application code.

use thiserror::Error;

#[cfg(feature = "kv")]
use crate::kv::KvError;
#[cfg(feature = "transfer")]
use crate::transfer::TransferError;

/// Unified error type for all jsonkv operations.
///
/// # Example
///
/// ```ignore
/// use jsonkv::{Result, Store};
///
/// fn do_something() -> Result<()> {
///     let store = Store::open("./data")?;
///     store.put("key", &serde_json::json!(42))?;
///     Ok(())
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// Error from key-value store operations.
    #[cfg(feature = "kv")]
    #[error(transparent)]
    Kv(#[from] KvError),

    /// Error from bulk export or import.
    #[cfg(feature = "transfer")]
    #[error(transparent)]
    Transfer(#[from] TransferError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A [`Result`] type alias using the unified [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns `true` if this is a KV store error.
    #[cfg(feature = "kv")]
    pub fn is_kv(&self) -> bool {
        matches!(self, Self::Kv(_))
    }

    /// Returns `true` if this is a bulk transfer error.
    #[cfg(feature = "transfer")]
    pub fn is_transfer(&self) -> bool {
        matches!(self, Self::Transfer(_))
    }

    /// Returns `true` if this is an I/O error.
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io(_))
    }

    /// Returns `true` if the error reports a missing key, wherever it came from.
    pub fn is_not_found(&self) -> bool {
        match self {
            #[cfg(feature = "kv")]
            Self::Kv(e) => e.is_not_found(),
            #[cfg(feature = "transfer")]
            Self::Transfer(TransferError::Kv(e)) => e.is_not_found(),
            _ => false,
        }
    }
}
