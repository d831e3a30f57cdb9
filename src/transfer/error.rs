//! Error types for bulk transfer.

use thiserror::Error;

use crate::kv::KvError;

/// Errors that can occur while exporting or importing the store.
#[derive(Error, Debug)]
pub enum TransferError {
    #[error(transparent)]
    Kv(#[from] KvError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON document: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A single upsert failed; entries before it stay applied.
    #[error("Import stopped at key '{key}' after {applied} entries: {source}")]
    Import {
        key: String,
        applied: usize,
        #[source]
        source: KvError,
    },
}
