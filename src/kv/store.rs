//! KV Store implementation using fjall.

use std::path::{Path, PathBuf};

use fjall::{Keyspace, KeyspaceCreateOptions, PersistMode};
use serde_json::Value;

use crate::logging::{debug, error, info, trace};

use super::error::KvError;
use super::types::Entry;

/// Name of the keyspace holding user data.
const DATA_KEYSPACE: &str = "data";

/// Largest key the engine accepts, in bytes.
pub const MAX_KEY_LEN: usize = u16::MAX as usize;

/// A JSON key-value store backed by fjall.
///
/// `Store` keeps every entry in a single ordered keyspace. Values are
/// serialized to JSON before they are written and decoded on read, so any
/// [`serde_json::Value`] round-trips unchanged.
///
/// # Example
///
/// ```ignore
/// use jsonkv::Store;
/// use serde_json::json;
///
/// let store = Store::open("./data")?;
///
/// store.put("user:1", &json!({"name": "ada"}))?;
/// let value = store.get("user:1")?;
///
/// for key in store.keys() {
///     println!("{}", key?);
/// }
///
/// store.delete("user:1")?;
/// ```
///
/// # Consistency
///
/// Single-key operations are atomic with respect to each other. Nothing
/// spans keys: [`clear`](Self::clear) and bulk loads interleave freely with
/// concurrent writers, and iterators read from a snapshot taken when they
/// were created.
///
/// # Persistence
///
/// The store is backed by fjall, an LSM-tree based storage engine. All write
/// operations are durably persisted before returning.
///
/// Cloning is cheap; clones share the same underlying database.
#[derive(Clone)]
pub struct Store {
    db: fjall::Database,
    data: Keyspace,
    path: PathBuf,
}

impl Store {
    /// Open the store at the given path, creating it if it does not exist.
    ///
    /// ```ignore
    /// // Works with &str, String, &Path, PathBuf
    /// let store = Store::open("./data")?;
    /// let store = Store::open(PathBuf::from("/var/lib/jsonkv"))?;
    /// ```
    pub fn open(path: impl AsRef<Path>) -> Result<Self, KvError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "opening KV store");

        let db = fjall::Database::builder(path).open().map_err(|e| {
            error!(path = %path.display(), error = %e, "failed to open store");
            KvError::from(e)
        })?;
        let data = db.keyspace(DATA_KEYSPACE, KeyspaceCreateOptions::default)?;

        info!(path = %path.display(), "KV store opened");
        Ok(Self {
            db,
            data,
            path: path.to_path_buf(),
        })
    }

    /// Directory the store lives in.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get a value, failing with [`KvError::KeyNotFound`] if the key is absent.
    pub fn get(&self, key: &str) -> Result<Value, KvError> {
        self.try_get(key)?
            .ok_or_else(|| KvError::KeyNotFound(key.to_string()))
    }

    /// Get a value if present.
    pub fn try_get(&self, key: &str) -> Result<Option<Value>, KvError> {
        debug!(key = key, "getting value");
        validate_key(key)?;

        let Some(bytes) = self.data.get(key)? else {
            trace!(key = key, "key not found");
            return Ok(None);
        };

        let value = decode_value(key, &bytes)?;
        Ok(Some(value))
    }

    /// Insert or replace the value stored under `key`.
    pub fn put(&self, key: &str, value: &Value) -> Result<(), KvError> {
        validate_key(key)?;

        let bytes = serde_json::to_vec(value).map_err(|source| KvError::Encode {
            key: key.to_string(),
            source,
        })?;
        debug!(key = key, value_len = bytes.len(), "setting value");

        self.data.insert(key, bytes)?;
        self.persist()?;

        trace!(key = key, "value set");
        Ok(())
    }

    /// Remove `key`. Removing a key that does not exist is not an error.
    pub fn delete(&self, key: &str) -> Result<(), KvError> {
        debug!(key = key, "deleting value");
        validate_key(key)?;

        self.data.remove(key)?;
        self.persist()?;

        trace!(key = key, "value deleted");
        Ok(())
    }

    /// Remove every entry and return how many were removed.
    ///
    /// Entries are removed one at a time from a snapshot of the keyspace;
    /// keys written after the snapshot was taken survive.
    pub fn clear(&self) -> Result<usize, KvError> {
        debug!("clearing store");

        let mut removed = 0;
        for guard in self.data.iter() {
            let key = guard.key()?;
            self.data.remove(key)?;
            removed += 1;
        }
        self.persist()?;

        info!(removed = removed, "store cleared");
        Ok(removed)
    }

    /// Lazily iterate over all keys in byte order.
    pub fn keys(&self) -> impl Iterator<Item = Result<String, KvError>> + '_ {
        self.data.iter().map(|guard| {
            let key = guard.key()?;
            Ok(String::from_utf8_lossy(&key).into_owned())
        })
    }

    /// Lazily iterate over keys starting with `prefix`, in byte order.
    pub fn keys_with_prefix<'a>(
        &'a self,
        prefix: &str,
    ) -> impl Iterator<Item = Result<String, KvError>> + use<'a> {
        self.data.prefix(prefix.to_owned()).map(|guard| {
            let key = guard.key()?;
            Ok(String::from_utf8_lossy(&key).into_owned())
        })
    }

    /// Collect keys, optionally restricted by prefix and capped by `limit`.
    pub fn list_keys(
        &self,
        prefix: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<String>, KvError> {
        debug!(prefix = prefix, limit = limit, "listing keys");

        let iter: Box<dyn Iterator<Item = Result<String, KvError>> + '_> = match prefix {
            Some(p) => Box::new(self.keys_with_prefix(p)),
            None => Box::new(self.keys()),
        };

        let keys = iter
            .take(limit.unwrap_or(usize::MAX))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(count = keys.len(), "listed keys");
        Ok(keys)
    }

    /// Lazily iterate over every entry in key order.
    pub fn entries(&self) -> impl Iterator<Item = Result<Entry, KvError>> + '_ {
        self.data.iter().map(|guard| {
            let (key, bytes) = guard.into_inner()?;
            let key = String::from_utf8_lossy(&key).into_owned();
            let value = decode_value(&key, &bytes)?;
            Ok(Entry::new(key, value))
        })
    }

    /// Flush all pending writes to disk.
    pub fn persist(&self) -> Result<(), KvError> {
        self.db.persist(PersistMode::SyncAll)?;
        Ok(())
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store").field("path", &self.path).finish()
    }
}

fn validate_key(key: &str) -> Result<(), KvError> {
    if key.is_empty() {
        return Err(KvError::InvalidKey("key must not be empty".to_string()));
    }
    if key.len() > MAX_KEY_LEN {
        return Err(KvError::InvalidKey(format!(
            "key is {} bytes, the maximum is {}",
            key.len(),
            MAX_KEY_LEN
        )));
    }
    Ok(())
}

fn decode_value(key: &str, bytes: &[u8]) -> Result<Value, KvError> {
    serde_json::from_slice(bytes).map_err(|source| {
        error!(key = key, error = %source, "stored value is not valid JSON");
        KvError::Corrupt {
            key: key.to_string(),
            source,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn open_temp() -> (TempDir, Store) {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path().join("db")).unwrap();
        (dir, store)
    }

    #[test]
    fn test_get_missing_key_is_not_found() {
        let (_dir, store) = open_temp();

        let err = store.get("missing").unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(store.try_get("missing").unwrap(), None);
    }

    #[test]
    fn test_put_then_get() {
        let (_dir, store) = open_temp();
        let value = json!({"name": "ada", "tags": ["a", "b"], "age": 36, "admin": false});

        store.put("user:1", &value).unwrap();

        assert_eq!(store.get("user:1").unwrap(), value);
    }

    #[test]
    fn test_last_write_wins() {
        let (_dir, store) = open_temp();

        store.put("k", &json!("1")).unwrap();
        store.put("k", &json!(2)).unwrap();

        assert_eq!(store.get("k").unwrap(), json!(2));
        assert_eq!(store.list_keys(None, None).unwrap(), vec!["k"]);
    }

    #[test]
    fn test_null_value_is_stored() {
        let (_dir, store) = open_temp();

        store.put("nothing", &Value::Null).unwrap();

        assert_eq!(store.try_get("nothing").unwrap(), Some(Value::Null));
    }

    #[test]
    fn test_delete_is_idempotent() {
        let (_dir, store) = open_temp();
        store.put("a", &json!(1)).unwrap();

        store.delete("a").unwrap();
        store.delete("a").unwrap();
        store.delete("never-existed").unwrap();

        assert!(store.get("a").unwrap_err().is_not_found());
    }

    #[test]
    fn test_clear_empties_store() {
        let (_dir, store) = open_temp();
        for i in 0..5 {
            store.put(&format!("key{}", i), &json!(i)).unwrap();
        }

        let removed = store.clear().unwrap();

        assert_eq!(removed, 5);
        assert_eq!(store.keys().count(), 0);
        assert_eq!(store.clear().unwrap(), 0);
    }

    #[test]
    fn test_keys_are_ordered() {
        let (_dir, store) = open_temp();
        for key in ["b", "c", "a", "aa"] {
            store.put(key, &json!(null)).unwrap();
        }

        let keys = store.keys().collect::<Result<Vec<_>, _>>().unwrap();
        assert_eq!(keys, vec!["a", "aa", "b", "c"]);
    }

    #[test]
    fn test_list_keys_with_prefix_and_limit() {
        let (_dir, store) = open_temp();
        for key in ["user:1", "user:2", "user:3", "admin:1"] {
            store.put(key, &json!(true)).unwrap();
        }

        let users = store.list_keys(Some("user:"), None).unwrap();
        assert_eq!(users, vec!["user:1", "user:2", "user:3"]);

        let limited = store.list_keys(Some("user:"), Some(2)).unwrap();
        assert_eq!(limited, vec!["user:1", "user:2"]);

        let all = store.list_keys(None, Some(1)).unwrap();
        assert_eq!(all, vec!["admin:1"]);
    }

    #[test]
    fn test_entries_yield_decoded_values() {
        let (_dir, store) = open_temp();
        store.put("x", &json!(1)).unwrap();
        store.put("y", &json!({"nested": [1, 2]})).unwrap();

        let entries = store.entries().collect::<Result<Vec<_>, _>>().unwrap();

        assert_eq!(
            entries,
            vec![
                Entry::new("x", json!(1)),
                Entry::new("y", json!({"nested": [1, 2]})),
            ]
        );
    }

    #[test]
    fn test_empty_key_is_rejected() {
        let (_dir, store) = open_temp();

        assert!(store.put("", &json!(1)).unwrap_err().is_invalid_key());
        assert!(store.get("").unwrap_err().is_invalid_key());
        assert!(store.delete("").unwrap_err().is_invalid_key());
    }

    #[test]
    fn test_oversized_key_is_rejected() {
        let (_dir, store) = open_temp();
        let key = "k".repeat(MAX_KEY_LEN + 1);

        let err = store.put(&key, &json!(1)).unwrap_err();
        assert!(err.is_invalid_key());
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db");

        {
            let store = Store::open(&path).unwrap();
            store.put("persisted", &json!({"ok": true})).unwrap();
        }

        let store = Store::open(&path).unwrap();
        assert_eq!(store.get("persisted").unwrap(), json!({"ok": true}));
        assert_eq!(store.path(), path.as_path());
    }

    #[test]
    fn test_clones_share_data() {
        let (_dir, store) = open_temp();
        let other = store.clone();

        other.put("shared", &json!("yes")).unwrap();

        assert_eq!(store.get("shared").unwrap(), json!("yes"));
    }
}
