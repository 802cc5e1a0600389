mod config;
mod errors;
mod file;
mod memory;
mod record;
mod types;

pub use config::{
    BANK_IDENTITY_STORE_PATH, BANK_IDENTITY_STORE_TYPE, identity_store_from_env,
    open_identity_store,
};
pub use errors::IdentityStoreError;
pub(crate) use record::IdentityRecord;
pub use types::{FileIdentityStore, IdentityStore, InMemoryIdentityStore};
