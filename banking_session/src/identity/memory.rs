use async_trait::async_trait;
use std::collections::BTreeMap;

use crate::identity::errors::IdentityStoreError;

use super::types::{IdentityStore, InMemoryIdentityStore};

impl InMemoryIdentityStore {
    pub fn new() -> Self {
        tracing::info!("Creating new in-memory identity store");
        Self {
            entry: BTreeMap::new(),
        }
    }
}

impl Default for InMemoryIdentityStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityStore for InMemoryIdentityStore {
    async fn init(&mut self) -> Result<(), IdentityStoreError> {
        Ok(()) // Nothing to initialize for in-memory store
    }

    async fn get(&self, key: &str) -> Result<Option<String>, IdentityStoreError> {
        Ok(self.entry.get(key).cloned())
    }

    async fn put(&mut self, key: &str, value: &str) -> Result<(), IdentityStoreError> {
        self.entry.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&mut self, key: &str) -> Result<(), IdentityStoreError> {
        self.entry.remove(key);
        Ok(())
    }
}
