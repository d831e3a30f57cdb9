//! Export the store as a JSON document.

use std::io::{BufWriter, Seek, Write};
use std::path::Path;

use serde_json::{Map, Value};
use tempfile::{NamedTempFile, TempPath};

use crate::kv::{KvError, Store};
use crate::logging::{debug, info};

use super::error::TransferError;

/// File name offered to clients downloading an export.
pub const EXPORT_FILE_NAME: &str = "database.json";

/// Drain every entry into an in-memory JSON object, in key order.
pub fn snapshot(store: &Store) -> Result<Map<String, Value>, KvError> {
    store
        .entries()
        .map(|entry| entry.map(|e| e.into_parts()))
        .collect()
}

/// Write a pretty-printed snapshot of the store to `writer`.
///
/// Returns the number of entries written.
pub fn write_export<W: Write>(store: &Store, writer: W) -> Result<usize, TransferError> {
    let document = snapshot(store)?;
    let mut writer = BufWriter::new(writer);
    serde_json::to_writer_pretty(&mut writer, &document)?;
    writer.flush()?;
    Ok(document.len())
}

/// A finished export sitting in a temporary file.
///
/// The file is removed when this value, or the [`TempPath`] taken out of it
/// with [`into_parts`](Self::into_parts), is dropped.
#[derive(Debug)]
pub struct ExportFile {
    file: NamedTempFile,
    entries: usize,
    len: u64,
}

impl ExportFile {
    /// Number of entries in the export.
    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Size of the document in bytes.
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Returns `true` if the document is empty. An export of an empty store
    /// is still `{}`, so this only holds for a truncated file.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Location of the temporary file.
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Split into a readable handle positioned at the start of the document
    /// and the guard that deletes the file on drop.
    pub fn into_parts(self) -> (std::fs::File, TempPath) {
        self.file.into_parts()
    }
}

/// Export the store to a temporary file in `dir`, or the system temp
/// directory when `dir` is `None`.
pub fn export_to_temp(store: &Store, dir: Option<&Path>) -> Result<ExportFile, TransferError> {
    let mut file = match dir {
        Some(dir) => NamedTempFile::new_in(dir)?,
        None => NamedTempFile::new()?,
    };
    debug!(path = %file.path().display(), "writing export");

    let entries = write_export(store, file.as_file_mut())?;
    let len = file.as_file().metadata()?.len();
    file.as_file_mut().rewind()?;

    info!(entries = entries, bytes = len, "store exported");
    Ok(ExportFile { file, entries, len })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Read;
    use tempfile::TempDir;

    #[test]
    fn test_snapshot_of_empty_store() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path().join("db")).unwrap();

        assert!(snapshot(&store).unwrap().is_empty());
    }

    #[test]
    fn test_export_writes_pretty_document() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path().join("db")).unwrap();
        store.put("b", &json!(2)).unwrap();
        store.put("a", &json!({"nested": true})).unwrap();

        let export = export_to_temp(&store, Some(dir.path())).unwrap();
        assert_eq!(export.entries(), 2);
        assert!(export.path().starts_with(dir.path()));

        let (mut file, _path) = export.into_parts();
        let mut text = String::new();
        file.read_to_string(&mut text).unwrap();

        assert!(text.contains("\n  \"a\": {"));
        let document: Map<String, Value> = serde_json::from_str(&text).unwrap();
        let keys: Vec<_> = document.keys().cloned().collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(document.get("a"), Some(&json!({"nested": true})));
    }

    #[test]
    fn test_export_file_is_removed_on_drop() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path().join("db")).unwrap();
        store.put("k", &json!("v")).unwrap();

        let export = export_to_temp(&store, Some(dir.path())).unwrap();
        let path = export.path().to_path_buf();
        assert!(path.exists());

        drop(export);
        assert!(!path.exists());
    }

    #[test]
    fn test_export_guard_outlives_handle() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path().join("db")).unwrap();

        let export = export_to_temp(&store, Some(dir.path())).unwrap();
        assert_eq!(export.len(), 2);
        let (file, guard) = export.into_parts();
        let path = guard.to_path_buf();

        drop(file);
        assert!(path.exists());
        drop(guard);
        assert!(!path.exists());
    }
}
