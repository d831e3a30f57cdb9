//! Async wrappers around the blocking store API.
//!
//! fjall performs disk I/O on the calling thread. These helpers move each
//! call onto tokio's blocking pool so async callers never stall the
//! runtime while the engine reads, writes or syncs.

use serde_json::Value;

use super::error::KvError;
use super::store::Store;

impl Store {
    /// Run `f` against a clone of this store on the blocking pool.
    ///
    /// Any error type that can absorb a [`KvError`] works, which lets bulk
    /// operations with their own error types share the helper.
    pub async fn blocking<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Store) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<KvError> + Send + 'static,
    {
        let store = self.clone();
        tokio::task::spawn_blocking(move || f(&store))
            .await
            .map_err(|e| E::from(KvError::Task(e.to_string())))?
    }

    /// Async variant of [`Store::get`].
    pub async fn get_async(&self, key: impl Into<String>) -> Result<Value, KvError> {
        let key = key.into();
        self.blocking(move |store| store.get(&key)).await
    }

    /// Async variant of [`Store::put`].
    pub async fn put_async(&self, key: impl Into<String>, value: Value) -> Result<(), KvError> {
        let key = key.into();
        self.blocking(move |store| store.put(&key, &value)).await
    }

    /// Async variant of [`Store::delete`].
    pub async fn delete_async(&self, key: impl Into<String>) -> Result<(), KvError> {
        let key = key.into();
        self.blocking(move |store| store.delete(&key)).await
    }

    /// Async variant of [`Store::clear`].
    pub async fn clear_async(&self) -> Result<usize, KvError> {
        self.blocking(|store| store.clear()).await
    }

    /// Async variant of [`Store::list_keys`].
    pub async fn list_keys_async(
        &self,
        prefix: Option<String>,
        limit: Option<usize>,
    ) -> Result<Vec<String>, KvError> {
        self.blocking(move |store| store.list_keys(prefix.as_deref(), limit))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_async_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path()).unwrap();

        store.put_async("a", json!({"n": 1})).await.unwrap();
        store.put_async("b", json!([1, 2, 3])).await.unwrap();

        assert_eq!(store.get_async("a").await.unwrap(), json!({"n": 1}));
        assert_eq!(
            store.list_keys_async(None, None).await.unwrap(),
            vec!["a", "b"]
        );

        store.delete_async("a").await.unwrap();
        assert!(store.get_async("a").await.unwrap_err().is_not_found());

        assert_eq!(store.clear_async().await.unwrap(), 1);
        assert!(store.list_keys_async(None, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blocking_maps_errors_into_caller_type() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path()).unwrap();

        let result: Result<Value, crate::Error> = store
            .blocking(|store| store.get("missing").map_err(crate::Error::from))
            .await;

        assert!(matches!(result, Err(crate::Error::Kv(e)) if e.is_not_found()));
    }
}
