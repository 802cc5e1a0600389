//! Test doubles shared by the unit tests of this crate.
//!
//! The session manager owns its identity store and talks to the backend only
//! through `SessionBackend`, so tests plug in a store whose contents they can
//! still inspect and a backend whose answers they script up front.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::client::{ApiFailure, ApiResult, LoginCredentials, SessionBackend, UserProfile};
use crate::identity::{IdentityStore, IdentityStoreError};
use crate::session::UserId;

/// Identity store whose map stays reachable through a cloned handle.
#[derive(Clone, Default)]
pub(crate) struct SharedIdentityStore {
    entries: Arc<Mutex<BTreeMap<String, String>>>,
    fail_writes: bool,
    yield_on_write: bool,
}

impl SharedIdentityStore {
    pub(crate) fn with_entries(entries: &[(&str, &str)]) -> Self {
        let store = Self::default();
        {
            let mut map = store.entries.lock().unwrap();
            for (k, v) in entries {
                map.insert(k.to_string(), v.to_string());
            }
        }
        store
    }

    /// A store that can be read but rejects every write.
    pub(crate) fn read_only(entries: &[(&str, &str)]) -> Self {
        Self {
            fail_writes: true,
            ..Self::with_entries(entries)
        }
    }

    /// A store whose writes suspend once, like a real disk or network write.
    pub(crate) fn yielding() -> Self {
        Self {
            yield_on_write: true,
            ..Self::default()
        }
    }

    async fn before_write(&self) -> Result<(), IdentityStoreError> {
        if self.yield_on_write {
            tokio::task::yield_now().await;
        }
        if self.fail_writes {
            return Err(IdentityStoreError::Storage("read-only store".to_string()));
        }
        Ok(())
    }

    pub(crate) fn value(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }
}

#[async_trait]
impl IdentityStore for SharedIdentityStore {
    async fn init(&mut self) -> Result<(), IdentityStoreError> {
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, IdentityStoreError> {
        Ok(self.value(key))
    }

    async fn put(&mut self, key: &str, value: &str) -> Result<(), IdentityStoreError> {
        self.before_write().await?;
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&mut self, key: &str) -> Result<(), IdentityStoreError> {
        self.before_write().await?;
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}

/// Backend with canned answers and call counters.
#[derive(Default)]
pub(crate) struct ScriptedBackend {
    verify_failure: Option<ApiFailure>,
    verify_delay: Option<Duration>,
    profile: Mutex<Option<UserProfile>>,
    profile_delay: Option<Duration>,
    credential: Option<String>,
    restored_credential: Mutex<Option<String>>,
    login_failure: Option<ApiFailure>,
    login_profile: Option<UserProfile>,
    logout_failure: Option<ApiFailure>,
    delete_failure: Option<ApiFailure>,
    pub(crate) verify_calls: AtomicUsize,
    pub(crate) profile_calls: AtomicUsize,
    pub(crate) logout_calls: AtomicUsize,
    pub(crate) delete_calls: AtomicUsize,
}

impl ScriptedBackend {
    /// Backend whose session verification succeeds.
    pub(crate) fn verified() -> Self {
        Self::default()
    }

    /// Backend whose session verification answers 401.
    pub(crate) fn rejected() -> Self {
        Self {
            verify_failure: Some(failure(401, "Token inválido ou expirado")),
            ..Self::default()
        }
    }

    /// Backend that cannot be reached at all.
    pub(crate) fn unreachable() -> Self {
        let down = || failure(500, "Could not connect to the server");
        Self {
            verify_failure: Some(down()),
            login_failure: Some(down()),
            logout_failure: Some(down()),
            delete_failure: Some(down()),
            ..Self::default()
        }
    }

    pub(crate) fn with_verify_delay(mut self, delay: Duration) -> Self {
        self.verify_delay = Some(delay);
        self
    }

    pub(crate) fn with_profile_delay(mut self, delay: Duration) -> Self {
        self.profile_delay = Some(delay);
        self
    }

    /// Backend that hands out `credential` as its session cookie.
    pub(crate) fn with_credential(mut self, credential: &str) -> Self {
        self.credential = Some(credential.to_string());
        self
    }

    pub(crate) fn restored(&self) -> Option<String> {
        self.restored_credential.lock().unwrap().clone()
    }

    pub(crate) fn with_profile(self, profile: UserProfile) -> Self {
        self.set_profile(Some(profile));
        self
    }

    pub(crate) fn with_login(mut self, result: Result<UserProfile, ApiFailure>) -> Self {
        match result {
            Ok(profile) => self.login_profile = Some(profile),
            Err(f) => self.login_failure = Some(f),
        }
        self
    }

    pub(crate) fn with_delete_failure(mut self, f: ApiFailure) -> Self {
        self.delete_failure = Some(f);
        self
    }

    pub(crate) fn set_profile(&self, profile: Option<UserProfile>) {
        *self.profile.lock().unwrap() = profile;
    }

    pub(crate) fn calls(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionBackend for ScriptedBackend {
    async fn verify_session(&self) -> ApiResult<()> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.verify_delay {
            tokio::time::sleep(delay).await;
        }
        match &self.verify_failure {
            Some(f) => Err(f.clone()),
            None => Ok(()),
        }
    }

    async fn login(&self, _credentials: &LoginCredentials) -> ApiResult<UserProfile> {
        if let Some(f) = &self.login_failure {
            return Err(f.clone());
        }
        self.login_profile
            .clone()
            .ok_or_else(|| failure(403, "Email ou senha inválidos"))
    }

    async fn logout(&self) -> ApiResult<()> {
        self.logout_calls.fetch_add(1, Ordering::SeqCst);
        match &self.logout_failure {
            Some(f) => Err(f.clone()),
            None => Ok(()),
        }
    }

    async fn fetch_profile(&self, user_id: &UserId) -> ApiResult<UserProfile> {
        self.profile_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.profile_delay {
            tokio::time::sleep(delay).await;
        }
        self.profile
            .lock()
            .unwrap()
            .clone()
            .filter(|p| p.id.as_ref() == Some(user_id))
            .ok_or_else(|| failure(404, "Usuário não encontrado"))
    }

    async fn delete_account(&self, _user_id: &UserId) -> ApiResult<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        match &self.delete_failure {
            Some(f) => Err(f.clone()),
            None => Ok(()),
        }
    }

    fn session_credential(&self) -> Option<String> {
        self.credential.clone()
    }

    fn restore_session_credential(&self, credential: &str) {
        *self.restored_credential.lock().unwrap() = Some(credential.to_string());
    }
}

pub(crate) fn failure(status: u16, message: &str) -> ApiFailure {
    ApiFailure {
        status,
        message: message.to_string(),
        code: None,
        details: None,
    }
}

pub(crate) fn profile(id: &str, fiscal_id: Option<&str>) -> UserProfile {
    UserProfile {
        id: Some(UserId::new(id)),
        name: Some(format!("User {id}")),
        fiscal_id: fiscal_id.map(str::to_string),
        ..UserProfile::default()
    }
}
