use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::{CookieStore, Jar};
use reqwest::{Method, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::{BANK_API_BASE_URL, BANK_API_TIMEOUT_SECS, ConfigError};
use crate::session::UserId;

use super::errors::{ApiFailure, ApiResult};
use super::types::{
    AccountCreated, HistoryPage, LoginCredentials, LoginEnvelope, NewAccount, ProfileUpdate,
    TransferReceipt, TransferRequest, UserProfile, UserSummary,
};

/// HTTP client for the banking backend.
///
/// The inner `reqwest::Client` keeps a cookie jar, so the session cookie set
/// by `/auth/login` is attached to every later call automatically. Cloning is
/// cheap and clones share the same cookie jar.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: Url,
    client: reqwest::Client,
    cookies: Arc<Jar>,
}

/// Creates a configured HTTP client with the following settings:
///
/// - `cookie_provider`: the given jar, so the server-issued session cookie
///   travels with every request and can be read back for persistence.
///
/// - `timeout`: bounds every request so an unresponsive backend surfaces as a
///   failure instead of hanging the caller.
///
/// - `pool_idle_timeout`: 90 seconds, the reqwest default.
fn build_client(timeout: Duration, cookies: Arc<Jar>) -> Result<reqwest::Client, ConfigError> {
    reqwest::Client::builder()
        .cookie_provider(cookies)
        .timeout(timeout)
        .pool_idle_timeout(Duration::from_secs(90))
        .build()
        .map_err(|e| ConfigError::HttpClient(e.to_string()))
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Self::with_timeout(base_url, Duration::from_secs(*BANK_API_TIMEOUT_SECS))
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ConfigError> {
        let mut base_url =
            Url::parse(base_url).map_err(|e| ConfigError::InvalidBaseUrl(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidBaseUrl(base_url.to_string()));
        }
        // Endpoints are joined relative to the base, which needs a trailing slash
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let cookies = Arc::new(Jar::default());
        Ok(Self {
            client: build_client(timeout, Arc::clone(&cookies))?,
            base_url,
            cookies,
        })
    }

    /// Client for `BANK_API_BASE_URL`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::new(BANK_API_BASE_URL.as_str())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Cookies the jar would send to the backend, as a `Cookie` header value.
    pub fn session_cookies(&self) -> Option<String> {
        self.cookies
            .cookies(&self.base_url)
            .and_then(|value| value.to_str().ok().map(str::to_string))
    }

    /// Puts cookies saved by [`ApiClient::session_cookies`] back into the jar.
    pub fn restore_session_cookies(&self, header: &str) {
        for pair in header.split(';').map(str::trim).filter(|p| p.contains('=')) {
            self.cookies
                .add_cookie_str(&format!("{pair}; Path=/"), &self.base_url);
        }
    }

    fn endpoint(&self, path: &str) -> ApiResult<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiFailure::invalid_request(format!("Invalid endpoint {path}: {e}")))
    }

    fn request(&self, method: Method, path: &str) -> ApiResult<RequestBuilder> {
        let url = self.endpoint(path)?;
        tracing::debug!("{} {}", method, url);
        Ok(self.client.request(method, url))
    }

    /// Sends the request and turns transport errors and non-2xx statuses into
    /// an [`ApiFailure`].
    async fn execute(&self, request: RequestBuilder) -> ApiResult<Response> {
        let response = request.send().await.map_err(|e| {
            tracing::error!("API request failed: {}", e);
            ApiFailure::transport(&e)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().clone();
        let body = response.text().await.unwrap_or_default();
        let failure = ApiFailure::from_response(status.as_u16(), &body);
        tracing::debug!("API error from {}: status={}, body={}", url, status, body);
        Err(failure)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ApiFailure::transport(&e))?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to decode response body: {}", e);
            ApiFailure::decode(status, &e)
        })
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let response = self.execute(self.request(Method::GET, path)?).await?;
        Self::decode(response).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .execute(self.request(Method::POST, path)?.json(body))
            .await?;
        Self::decode(response).await
    }

    pub async fn patch<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .execute(self.request(Method::PATCH, path)?.json(body))
            .await?;
        Self::decode(response).await
    }

    /// Sends a bodiless request where only the status matters.
    pub async fn send_empty(&self, method: Method, path: &str) -> ApiResult<()> {
        self.execute(self.request(method, path)?).await?;
        Ok(())
    }

    /// `GET /auth/verify`: succeeds while the session cookie is valid.
    pub async fn verify_session(&self) -> ApiResult<()> {
        self.send_empty(Method::GET, "/auth/verify").await
    }

    /// `POST /auth/login`: exchanges credentials for a session cookie and
    /// returns the user's profile.
    pub async fn login(&self, credentials: &LoginCredentials) -> ApiResult<UserProfile> {
        let envelope: LoginEnvelope = self.post("/auth/login", credentials).await?;
        Ok(envelope.into_profile())
    }

    /// `POST /auth/logout`: asks the backend to drop the session cookie.
    pub async fn logout(&self) -> ApiResult<()> {
        self.send_empty(Method::POST, "/auth/logout").await
    }

    /// `GET /usuarios/{id}`
    pub async fn fetch_profile(&self, user_id: &UserId) -> ApiResult<UserProfile> {
        self.get(&user_path(user_id)).await
    }

    /// `POST /usuarios/usuario`
    pub async fn create_account(&self, account: &NewAccount) -> ApiResult<AccountCreated> {
        self.post("/usuarios/usuario", account).await
    }

    /// `GET /usuarios`: every registered user, used to pick transfer recipients.
    pub async fn list_users(&self) -> ApiResult<Vec<UserSummary>> {
        self.get("/usuarios").await
    }

    /// `PATCH /usuarios`. An update without changes is rejected locally.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> ApiResult<ProfileUpdate> {
        if !update.has_changes() {
            return Err(ApiFailure::invalid_request("No fields to update"));
        }
        self.patch("/usuarios", update).await
    }

    /// `DELETE /usuarios/{id}`
    pub async fn delete_account(&self, user_id: &UserId) -> ApiResult<()> {
        self.send_empty(Method::DELETE, &user_path(user_id)).await
    }

    /// `POST /api/transacoes/realizar`
    pub async fn transfer(&self, request: &TransferRequest) -> ApiResult<TransferReceipt> {
        self.post("/api/transacoes/realizar", request).await
    }

    /// `GET /api/transacoes/historico?page=..&size=..`
    pub async fn history(&self, page: u32, size: u32) -> ApiResult<HistoryPage> {
        self.get(&format!("/api/transacoes/historico?page={page}&size={size}"))
            .await
    }
}

fn user_path(user_id: &UserId) -> String {
    format!("/usuarios/{}", urlencoding::encode(user_id.as_str()))
}
