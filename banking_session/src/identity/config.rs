use std::{env, sync::LazyLock};

use super::errors::IdentityStoreError;
use super::types::{FileIdentityStore, IdentityStore, InMemoryIdentityStore};

pub static BANK_IDENTITY_STORE_TYPE: LazyLock<String> = LazyLock::new(|| {
    env::var("BANK_IDENTITY_STORE_TYPE").unwrap_or_else(|_| "file".to_string())
});

pub static BANK_IDENTITY_STORE_PATH: LazyLock<String> = LazyLock::new(|| {
    env::var("BANK_IDENTITY_STORE_PATH").unwrap_or_else(|_| ".bank_identity.json".to_string())
});

/// Opens the identity store selected by `BANK_IDENTITY_STORE_TYPE`.
pub async fn identity_store_from_env() -> Result<Box<dyn IdentityStore>, IdentityStoreError> {
    open_identity_store(
        BANK_IDENTITY_STORE_TYPE.as_str(),
        BANK_IDENTITY_STORE_PATH.as_str(),
    )
    .await
}

/// Creates and initializes an identity store of the given type.
///
/// `path` is only used by the `file` store.
pub async fn open_identity_store(
    store_type: &str,
    path: &str,
) -> Result<Box<dyn IdentityStore>, IdentityStoreError> {
    tracing::info!(
        "Initializing identity store with type: {}, path: {}",
        store_type,
        path
    );

    let mut store: Box<dyn IdentityStore> = match store_type {
        "memory" => Box::new(InMemoryIdentityStore::new()),
        "file" => Box::new(FileIdentityStore::new(path)),
        t => return Err(IdentityStoreError::UnsupportedType(t.to_string())),
    };

    store.init().await?;
    Ok(store)
}
