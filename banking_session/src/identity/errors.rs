use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum IdentityStoreError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Json conversion(Serde) error: {0}")]
    Serde(String),

    #[error("Unsupported identity store type: {0}. Supported types are 'memory' and 'file'")]
    UnsupportedType(String),
}

impl From<std::io::Error> for IdentityStoreError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for IdentityStoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}
