use async_trait::async_trait;

use crate::session::UserId;

use super::errors::ApiResult;
use super::http::ApiClient;
use super::types::{LoginCredentials, UserProfile};

/// Backend calls the session manager depends on.
///
/// [`ApiClient`] is the production implementation; tests substitute scripted
/// backends.
#[async_trait]
pub trait SessionBackend: Send + Sync + 'static {
    /// Confirms the session credential is still valid.
    async fn verify_session(&self) -> ApiResult<()>;

    /// Exchanges credentials for a session credential and the user profile.
    async fn login(&self, credentials: &LoginCredentials) -> ApiResult<UserProfile>;

    /// Invalidates the server-side session.
    async fn logout(&self) -> ApiResult<()>;

    async fn fetch_profile(&self, user_id: &UserId) -> ApiResult<UserProfile>;

    async fn delete_account(&self, user_id: &UserId) -> ApiResult<()>;

    /// Session credential to persist after a login, if the backend keeps one
    /// on the client side.
    fn session_credential(&self) -> Option<String> {
        None
    }

    /// Reinstates a credential persisted by an earlier process.
    fn restore_session_credential(&self, _credential: &str) {}
}

#[async_trait]
impl SessionBackend for ApiClient {
    async fn verify_session(&self) -> ApiResult<()> {
        ApiClient::verify_session(self).await
    }

    async fn login(&self, credentials: &LoginCredentials) -> ApiResult<UserProfile> {
        ApiClient::login(self, credentials).await
    }

    async fn logout(&self) -> ApiResult<()> {
        ApiClient::logout(self).await
    }

    async fn fetch_profile(&self, user_id: &UserId) -> ApiResult<UserProfile> {
        ApiClient::fetch_profile(self, user_id).await
    }

    async fn delete_account(&self, user_id: &UserId) -> ApiResult<()> {
        ApiClient::delete_account(self, user_id).await
    }

    fn session_credential(&self) -> Option<String> {
        self.session_cookies()
    }

    fn restore_session_credential(&self, credential: &str) {
        self.restore_session_cookies(credential);
    }
}
