use thiserror::Error;

use crate::client::ApiFailure;
use crate::identity::IdentityStoreError;

#[derive(Debug, Error, Clone)]
pub enum SessionError {
    #[error("Profile has no user id")]
    MissingUserId,

    #[error("No authenticated user")]
    NotAuthenticated,

    /// Carries a message meant to be shown to the user as is.
    #[error("{0}")]
    LoginFailed(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("API error: {0}")]
    Api(#[from] ApiFailure),
}

impl From<IdentityStoreError> for SessionError {
    fn from(err: IdentityStoreError) -> Self {
        Self::Storage(err.to_string())
    }
}
