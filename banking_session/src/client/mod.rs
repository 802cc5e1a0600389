mod backend;
mod errors;
mod http;
mod types;

pub use backend::SessionBackend;
pub(crate) use errors::GENERIC_FAILURE_MESSAGE;
pub use errors::{ApiFailure, ApiResult};
pub use http::ApiClient;
pub use types::{
    AccountCreated, HistoryEntry, HistoryPage, LoginCredentials, NewAccount, ProfileUpdate,
    TransferDirection, TransferReceipt, TransferRequest, UserProfile, UserSummary,
};
