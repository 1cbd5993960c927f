//! Output artifact store
//! Raw JSON responses are written through object_store so tests can run
//! against an in-memory backend.

use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::{ObjectStore, PutPayload, path::Path as StoragePath};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid artifact key '{key}': {detail}")]
    InvalidPath { key: String, detail: String },

    #[error("Failed to encode artifact: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to prepare output directory {path}: {source}")]
    Directory {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Object store error: {0}")]
    ObjectStore(#[from] object_store::Error),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Metadata returned after a write
#[derive(Debug, Clone)]
pub struct ArtifactMetadata {
    pub key: String,
    pub size: usize,
}

/// JSON artifact store wrapping any object_store backend
#[derive(Clone)]
pub struct ArtifactStore {
    store: Arc<dyn ObjectStore>,
    location: String,
}

impl ArtifactStore {
    pub fn new(store: Arc<dyn ObjectStore>, location: impl Into<String>) -> Self {
        Self {
            store,
            location: location.into(),
        }
    }

    /// Store rooted at a local directory, created if absent
    pub fn local(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir).map_err(|source| StorageError::Directory {
            path: dir.display().to_string(),
            source,
        })?;
        let store = LocalFileSystem::new_with_prefix(dir)?;
        Ok(Self::new(Arc::new(store), dir.display().to_string()))
    }

    /// Create in-memory storage for tests
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemory::new()), "memory")
    }

    /// Human-readable root, for logs
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Write `value` pretty-printed under `key`, replacing any previous artifact
    pub async fn put_json(&self, key: &str, value: &Value) -> Result<ArtifactMetadata> {
        let path = parse_key(key)?;
        let data = serde_json::to_vec_pretty(value)?;
        let size = data.len();

        self.store.put(&path, PutPayload::from(data)).await?;

        tracing::debug!(key, size, location = %self.location, "Artifact written");

        Ok(ArtifactMetadata {
            key: key.to_string(),
            size,
        })
    }

    /// Read an artifact back as JSON
    pub async fn get_json(&self, key: &str) -> Result<Value> {
        let path = parse_key(key)?;
        let bytes = self.store.get(&path).await?.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Check if key exists
    pub async fn exists(&self, key: &str) -> Result<bool> {
        let path = parse_key(key)?;

        match self.store.head(&path).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

fn parse_key(key: &str) -> Result<StoragePath> {
    StoragePath::parse(key).map_err(|e| StorageError::InvalidPath {
        key: key.to_string(),
        detail: e.to_string(),
    })
}

/// Deterministic artifact name for a target: `<name>_<id>.json`.
///
/// Characters other than letters, digits, `-`, `_` and `.` become `_`, so a
/// display name can never escape the output directory.
pub fn artifact_name(name: &str, id: i64) -> String {
    let mut safe: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();

    // "." and ".." are not valid path segments
    if safe.chars().all(|c| c == '.') {
        safe = safe.replace('.', "_");
    }

    format!("{}_{}.json", safe, id)
}
