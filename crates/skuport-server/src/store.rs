//! File-backed persistence for the SKU checkbox toggles.
//!
//! The state is a single JSON document mapping SKU to checked flag, read in
//! full on load and rewritten in full on save. Concurrent writers race and
//! the last write wins: the store holds last-writer-intent for a single
//! interactive user, not a consistency-critical ledger.

use std::collections::HashMap;
use std::path::PathBuf;

use thiserror::Error;

/// Read/write failure on the local state document.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("state file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("state file parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Durable key-value store for checkbox state, backed by one JSON file.
#[derive(Debug, Clone)]
pub struct CheckboxStore {
    path: PathBuf,
}

impl CheckboxStore {
    /// Opens the store, writing an empty state document if none exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the path cannot be probed or the
    /// initial document cannot be written.
    pub async fn open(path: PathBuf) -> Result<Self, StoreError> {
        let store = Self { path };
        if !tokio::fs::try_exists(&store.path).await? {
            store.save(&HashMap::new()).await?;
        }
        Ok(store)
    }

    /// Loads the full mapping. A missing file reads as an empty mapping.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] on read failure other than not-found, or
    /// [`StoreError::Json`] if the document is not a valid mapping.
    pub async fn load(&self) -> Result<HashMap<String, bool>, StoreError> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&raw)?)
    }

    /// Rewrites the full mapping.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] on write failure.
    pub async fn save(&self, state: &HashMap<String, bool>) -> Result<(), StoreError> {
        let raw = serde_json::to_vec(state)?;
        tokio::fs::write(&self.path, raw).await?;
        Ok(())
    }

    /// Updates one SKU entry via read-modify-write.
    ///
    /// # Errors
    ///
    /// Propagates [`StoreError`] from the underlying load or save.
    pub async fn set(&self, sku: &str, checked: bool) -> Result<(), StoreError> {
        let mut state = self.load().await?;
        state.insert(sku.to_owned(), checked);
        self.save(&state).await
    }
}
