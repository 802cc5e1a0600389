use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::identity::errors::IdentityStoreError;

use super::types::{FileIdentityStore, IdentityStore};

impl FileIdentityStore {
    /// Creates a store backed by a JSON document at `path`. Nothing is read
    /// until [`IdentityStore::init`] runs.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        tracing::info!("Creating new file identity store at {}", path.display());
        Self {
            path,
            entry: BTreeMap::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the whole document to a sibling temp file and renames it over
    /// the existing file, so a crash mid-write never leaves a truncated record.
    async fn persist(&self) -> Result<(), IdentityStoreError> {
        let json = serde_json::to_vec_pretty(&self.entry)?;
        let tmp_path = self.path.with_extension("json.tmp");

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        tokio::fs::write(&tmp_path, json).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl IdentityStore for FileIdentityStore {
    async fn init(&mut self) -> Result<(), IdentityStoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No identity file at {}, starting empty", self.path.display());
                self.entry.clear();
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        self.entry = match serde_json::from_slice(&bytes) {
            Ok(entry) => entry,
            Err(e) => {
                // The next write replaces the unreadable document
                tracing::warn!(
                    "Ignoring unreadable identity file {}: {}",
                    self.path.display(),
                    e
                );
                BTreeMap::new()
            }
        };
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, IdentityStoreError> {
        Ok(self.entry.get(key).cloned())
    }

    async fn put(&mut self, key: &str, value: &str) -> Result<(), IdentityStoreError> {
        let previous = self.entry.insert(key.to_string(), value.to_string());
        if let Err(e) = self.persist().await {
            // Keep memory consistent with what is on disk
            match previous {
                Some(old) => self.entry.insert(key.to_string(), old),
                None => self.entry.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    async fn remove(&mut self, key: &str) -> Result<(), IdentityStoreError> {
        let Some(previous) = self.entry.remove(key) else {
            return Ok(());
        };
        if let Err(e) = self.persist().await {
            self.entry.insert(key.to_string(), previous);
            return Err(e);
        }
        Ok(())
    }
}
