use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::identity::errors::IdentityStoreError;

pub struct InMemoryIdentityStore {
    pub(super) entry: BTreeMap<String, String>,
}

pub struct FileIdentityStore {
    pub(super) path: PathBuf,
    pub(super) entry: BTreeMap<String, String>,
}

/// Durable string-keyed storage for the cached identity.
///
/// Only the session manager holds a store, so every method takes the store
/// directly instead of going through interior locking.
#[async_trait]
pub trait IdentityStore: Send + Sync + 'static {
    /// Initialize the store. This is called before the first read.
    async fn init(&mut self) -> Result<(), IdentityStoreError>;

    /// Get a value from the store.
    async fn get(&self, key: &str) -> Result<Option<String>, IdentityStoreError>;

    /// Put a value into the store, replacing any previous value.
    async fn put(&mut self, key: &str, value: &str) -> Result<(), IdentityStoreError>;

    /// Remove a value from the store. Removing a missing key succeeds.
    async fn remove(&mut self, key: &str) -> Result<(), IdentityStoreError>;
}
