//! Types stored in and read back from the KV store.

use serde_json::Value;

/// A single key/value pair read from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    /// The key, decoded as UTF-8.
    pub key: String,
    /// The decoded JSON value.
    pub value: Value,
}

impl Entry {
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    /// Split the entry into its key and value.
    pub fn into_parts(self) -> (String, Value) {
        (self.key, self.value)
    }
}
