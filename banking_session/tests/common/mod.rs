
pub use mock_backend::{MockBackend, MockUser, acme, maria};

use banking_session::{ApiClient, InMemoryIdentityStore, SessionConfig, SessionManager};
use std::sync::{Arc, Once};
use std::time::Duration;

/// Loads `.env_test` (falling back to `.env`) once per test binary.
pub fn init_test_environment() {
    static ENV_INIT: Once = Once::new();
    ENV_INIT.call_once(|| {
        if dotenvy::from_filename(".env_test").is_err() {
            dotenvy::dotenv().ok();
        }
    });
}

/// A running mock backend plus a client pointed at it.
pub struct TestSetup {
    pub backend: MockBackend,
    pub client: ApiClient,
}

impl TestSetup {
    pub async fn start() -> Self {
        init_test_environment();
        let backend = MockBackend::start().await;
        let client = ApiClient::with_timeout(&backend.base_url, Duration::from_secs(5))
            .expect("Mock backend URL should be valid");
        Self { backend, client }
    }

    /// Client with its own empty cookie jar, as a restarted process has.
    pub fn fresh_client(&self) -> ApiClient {
        ApiClient::with_timeout(&self.backend.base_url, Duration::from_secs(5))
            .expect("Mock backend URL should be valid")
    }

    /// Manager over the shared client and a fresh in-memory identity store.
    pub fn manager(&self) -> Arc<SessionManager> {
        Arc::new(SessionManager::with_config(
            Arc::new(self.client.clone()),
            Box::new(InMemoryIdentityStore::new()),
            SessionConfig {
                verify_timeout: Duration::from_secs(5),
            },
        ))
    }
}

/// Unique path in the temp dir for file-backed identity stores.
pub fn temp_store_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "bank_identity_it_{}_{}.json",
        name,
        std::process::id()
    ))
}
