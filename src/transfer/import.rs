//! Import a JSON document into the store.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde_json::{Map, Value};
use tempfile::NamedTempFile;

use crate::kv::Store;
use crate::logging::{debug, info, warn};

use super::error::TransferError;

/// Outcome of a successful import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportReport {
    /// Number of entries written.
    pub imported: usize,
}

/// Upsert every field of `document` into the store, in document order.
///
/// The first failing write stops the import. Entries written before it are
/// not rolled back.
pub fn import_document(
    store: &Store,
    document: Map<String, Value>,
) -> Result<ImportReport, TransferError> {
    debug!(entries = document.len(), "importing document");

    let mut imported = 0;
    for (key, value) in document {
        if let Err(source) = store.put(&key, &value) {
            warn!(key = %key, applied = imported, error = %source, "import aborted");
            return Err(TransferError::Import {
                key,
                applied: imported,
                source,
            });
        }
        imported += 1;
    }

    info!(imported = imported, "import complete");
    Ok(ImportReport { imported })
}

/// Parse a JSON object from `reader` and import it.
///
/// Anything other than a top-level object is rejected before the store is
/// touched.
pub fn import_reader<R: Read>(store: &Store, reader: R) -> Result<ImportReport, TransferError> {
    let document: Map<String, Value> = serde_json::from_reader(BufReader::new(reader))?;
    import_document(store, document)
}

/// Import the JSON object stored in the file at `path`.
pub fn import_file(store: &Store, path: impl AsRef<Path>) -> Result<ImportReport, TransferError> {
    let path = path.as_ref();
    debug!(path = %path.display(), "importing file");
    let file = File::open(path)?;
    import_reader(store, file)
}

/// Import an uploaded temporary file, then delete it whatever the outcome.
pub fn import_upload(store: &Store, upload: NamedTempFile) -> Result<ImportReport, TransferError> {
    let result = import_file(store, upload.path());

    if let Err(e) = upload.close() {
        warn!(error = %e, "failed to remove uploaded file");
    }

    result
}
