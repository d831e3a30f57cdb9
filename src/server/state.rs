//! Application state management.

use std::path::{Path, PathBuf};

use crate::kv::{KvError, Store};

use super::auth::AccessGate;
use super::config::Config;

/// Shared application state.
///
/// Holds the single store opened at startup. Cloning is cheap and every
/// clone refers to the same database.
#[derive(Clone, Debug)]
pub struct AppState {
    store: Store,
    gate: AccessGate,
    temp_dir: Option<PathBuf>,
    max_upload_bytes: usize,
}

impl AppState {
    /// Create a new AppState from configuration, opening (or creating) the
    /// store.
    pub fn from_config(config: &Config) -> Result<Self, StateError> {
        let path = &config.storage.path;
        let store = Store::open(path).map_err(|source| StateError::OpenStore {
            path: path.display().to_string(),
            source,
        })?;

        if let Some(dir) = &config.storage.temp_dir {
            std::fs::create_dir_all(dir).map_err(|source| StateError::TempDir {
                path: dir.display().to_string(),
                source,
            })?;
        }

        Ok(Self {
            store,
            gate: AccessGate::new(config.auth.api_key.as_deref()),
            temp_dir: config.storage.temp_dir.clone(),
            max_upload_bytes: config.server.max_upload_bytes,
        })
    }

    /// The store every handler operates on.
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// The API key check.
    pub fn gate(&self) -> &AccessGate {
        &self.gate
    }

    /// Where export and upload temp files go, if not the system default.
    pub fn temp_dir(&self) -> Option<&Path> {
        self.temp_dir.as_deref()
    }

    /// Largest accepted upload body, in bytes.
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }
}

/// Errors that can occur when setting up application state.
#[derive(Debug)]
pub enum StateError {
    /// Failed to open or create the store.
    OpenStore { path: String, source: KvError },
    /// Failed to create the temp file directory.
    TempDir {
        path: String,
        source: std::io::Error,
    },
}

impl std::fmt::Display for StateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StateError::OpenStore { path, source } => {
                write!(f, "Failed to open store at '{}': {}", path, source)
            }
            StateError::TempDir { path, source } => {
                write!(f, "Failed to create temp directory '{}': {}", path, source)
            }
        }
    }
}

impl std::error::Error for StateError {}
