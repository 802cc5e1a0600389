use std::sync::Arc;

use tokio::sync::{Mutex, OnceCell, watch};

use crate::client::{ApiFailure, LoginCredentials, SessionBackend, UserProfile};
use crate::config::SessionConfig;
use crate::identity::{IdentityRecord, IdentityStore};
use crate::session::errors::SessionError;
use crate::session::types::{AccountCategory, Session, SessionStatus, UserId};

const LOGIN_FAILURE_MESSAGE: &str = "Login failed. Check your credentials and try again.";

/// Owner of the session state and of the persisted identity record.
///
/// State changes are published through a `watch` channel; consumers only
/// ever see snapshots. Store writes and publications happen together under
/// the store lock. Network calls run without the lock, and their results are
/// applied only if the session has not moved on in the meantime, so a logout
/// never waits on the backend.
pub struct SessionManager {
    backend: Arc<dyn SessionBackend>,
    store: Mutex<Box<dyn IdentityStore>>,
    state: watch::Sender<Session>,
    initialized: OnceCell<()>,
    config: SessionConfig,
}

impl SessionManager {
    pub fn new(backend: Arc<dyn SessionBackend>, store: Box<dyn IdentityStore>) -> Self {
        Self::with_config(backend, store, SessionConfig::default())
    }

    pub fn with_config(
        backend: Arc<dyn SessionBackend>,
        store: Box<dyn IdentityStore>,
        config: SessionConfig,
    ) -> Self {
        let (state, _) = watch::channel(Session::uninitialized());
        Self {
            backend,
            store: Mutex::new(store),
            state,
            initialized: OnceCell::new(),
            config,
        }
    }

    /// Current session state.
    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    /// Receiver that observes every published session state.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    fn publish(&self, session: Session) {
        tracing::debug!(
            status = ?session.status(),
            category = ?session.account_category(),
            "Publishing session state"
        );
        self.state.send_replace(session);
    }

    /// Later `initialize` calls become no-ops. A pass already in flight sees
    /// the transition through the published status instead.
    fn mark_initialized(&self) {
        let _ = self.initialized.set(());
    }

    /// Reconciles the cached identity with the backend, once.
    ///
    /// Concurrent callers share the single verification pass and all return
    /// the settled state. Calls after that are no-ops.
    pub async fn initialize(&self) -> Session {
        self.initialized
            .get_or_init(|| self.verify_and_settle())
            .await;
        self.snapshot()
    }

    async fn verify_and_settle(&self) {
        let record = {
            let store = self.store.lock().await;
            // A login or logout that got here first has already settled it
            if self.snapshot().status() != SessionStatus::Uninitialized {
                tracing::debug!("Session already settled, skipping verification");
                return;
            }
            self.publish(Session::verifying());

            match IdentityRecord::load(&**store).await {
                Ok(record) => record,
                Err(e) => {
                    tracing::warn!("Failed to read identity record, treating as empty: {}", e);
                    IdentityRecord::default()
                }
            }
        };

        if let Some(credential) = &record.session_credential {
            self.backend.restore_session_credential(credential);
        }

        let verified = self.verify_with_timeout().await;

        let user_id = {
            let mut store = self.store.lock().await;
            if self.snapshot().status() != SessionStatus::Verifying {
                tracing::debug!("Session changed during verification, discarding the result");
                return;
            }

            match record.user_id {
                Some(user_id) if verified => {
                    tracing::info!("Session verified for user {}", user_id);
                    self.publish(Session::authenticated(
                        user_id.clone(),
                        record.account_category,
                    ));
                    user_id
                }
                cached => {
                    tracing::info!(
                        verified,
                        had_cached_user = cached.is_some(),
                        "Session is not authenticated, clearing identity record"
                    );
                    if let Err(e) = IdentityRecord::clear(&mut **store).await {
                        tracing::warn!("Failed to clear identity record: {}", e);
                    }
                    self.publish(Session::anonymous());
                    return;
                }
            }
        };

        if record.account_category == AccountCategory::Unknown {
            self.resolve_category(&user_id).await;
        }
    }

    async fn verify_with_timeout(&self) -> bool {
        match tokio::time::timeout(self.config.verify_timeout, self.backend.verify_session()).await
        {
            Ok(Ok(())) => true,
            Ok(Err(failure)) => {
                tracing::debug!(
                    status = failure.status,
                    "Session verification failed: {}",
                    failure.message
                );
                false
            }
            Err(_) => {
                tracing::warn!(
                    "Session verification timed out after {:?}",
                    self.config.verify_timeout
                );
                false
            }
        }
    }

    /// Fetches the profile to learn the account category. Failures leave the
    /// user authenticated with an unknown category.
    ///
    /// The fetch runs without the store lock. Its result is dropped if the
    /// session no longer belongs to `user_id` with an unknown category.
    async fn resolve_category(&self, user_id: &UserId) -> AccountCategory {
        let fetched = tokio::time::timeout(
            self.config.verify_timeout,
            self.backend.fetch_profile(user_id),
        )
        .await;

        let profile = match fetched {
            Ok(Ok(profile)) => profile,
            Ok(Err(failure)) => {
                tracing::warn!(
                    status = failure.status,
                    "Failed to fetch profile for user {}: {}",
                    user_id,
                    failure.message
                );
                return AccountCategory::Unknown;
            }
            Err(_) => {
                tracing::warn!(
                    "Profile fetch for user {} timed out after {:?}",
                    user_id,
                    self.config.verify_timeout
                );
                return AccountCategory::Unknown;
            }
        };

        let category = profile.account_category();
        if category == AccountCategory::Unknown {
            tracing::warn!("Profile of user {} has no fiscal id", user_id);
            return category;
        }

        let mut store = self.store.lock().await;
        let current = self.snapshot();
        if current.user_id() != Some(user_id)
            || current.account_category() != AccountCategory::Unknown
        {
            tracing::debug!("Session changed while fetching the profile, discarding category");
            return current.account_category();
        }

        if let Err(e) = IdentityRecord::save_category(&mut **store, category).await {
            tracing::warn!("Failed to persist account category: {}", e);
        }
        self.publish(Session::authenticated(user_id.clone(), category));
        category
    }

    /// Records a user who just exchanged credentials with the backend.
    ///
    /// Makes no network call. The record is written first and the state is
    /// only published once the write succeeded.
    pub async fn login(&self, profile: &UserProfile) -> Result<Session, SessionError> {
        let user_id = profile.id.clone().ok_or(SessionError::MissingUserId)?;
        let category = profile.account_category();

        let mut store = self.store.lock().await;
        if let Err(e) = IdentityRecord::save(&mut **store, &user_id, category).await {
            tracing::error!("Failed to persist identity for user {}: {}", user_id, e);
            self.restore_record(&mut **store).await;
            return Err(e.into());
        }
        if let Some(credential) = self.backend.session_credential() {
            if let Err(e) = IdentityRecord::save_credential(&mut **store, &credential).await {
                tracing::warn!("Failed to persist session credential: {}", e);
            }
        }

        self.mark_initialized();
        let session = Session::authenticated(user_id, category);
        self.publish(session.clone());
        tracing::info!(category = ?category, "User logged in");
        Ok(session)
    }

    /// Puts the record back in line with the published state after a
    /// partially failed write.
    async fn restore_record(&self, store: &mut dyn IdentityStore) {
        let current = self.snapshot();
        let result = match current.user_id() {
            Some(user_id) => {
                IdentityRecord::save(store, user_id, current.account_category()).await
            }
            None => IdentityRecord::clear(store).await,
        };
        if let Err(e) = result {
            tracing::warn!("Failed to restore identity record: {}", e);
        }
    }

    /// Submits credentials to the backend and logs the user in on success.
    ///
    /// A rejected login leaves the session untouched and yields a message
    /// fit for display.
    pub async fn sign_in(&self, credentials: &LoginCredentials) -> Result<Session, SessionError> {
        let profile = self.backend.login(credentials).await.map_err(|failure| {
            tracing::warn!(status = failure.status, "Login rejected: {}", failure.message);
            SessionError::LoginFailed(login_failure_message(&failure))
        })?;
        self.login(&profile).await
    }

    /// Logs out locally, telling the backend in the background.
    ///
    /// The backend notification is spawned and never awaited; the local state
    /// always ends up anonymous whatever happens to it.
    pub async fn logout(&self) -> Session {
        let backend = Arc::clone(&self.backend);
        tokio::spawn(async move {
            match backend.logout().await {
                Ok(()) => tracing::debug!("Backend session invalidated"),
                Err(failure) => tracing::warn!(
                    status = failure.status,
                    "Logout notification failed: {}",
                    failure.message
                ),
            }
        });

        let session = self.clear_local().await;
        tracing::info!("User logged out");
        session
    }

    /// Deletes the current user's account, then clears the local identity.
    pub async fn delete_account(&self) -> Result<(), SessionError> {
        let user_id = self
            .snapshot()
            .user_id()
            .cloned()
            .ok_or(SessionError::NotAuthenticated)?;

        self.backend.delete_account(&user_id).await.map_err(|failure| {
            tracing::error!("Failed to delete account {}: {}", user_id, failure);
            SessionError::Api(failure)
        })?;

        self.clear_local().await;
        tracing::info!("Account {} deleted", user_id);
        Ok(())
    }

    async fn clear_local(&self) -> Session {
        let mut store = self.store.lock().await;
        if let Err(e) = IdentityRecord::clear(&mut **store).await {
            tracing::error!("Failed to clear identity record: {}", e);
        }
        self.mark_initialized();
        let session = Session::anonymous();
        self.publish(session.clone());
        session
    }

    /// Retries the profile lookup for an authenticated user whose category is
    /// still unknown. Returns the category in effect afterwards.
    pub async fn refresh_account_category(&self) -> Result<AccountCategory, SessionError> {
        let current = self.snapshot();
        let Some(user_id) = current.user_id().cloned() else {
            return Err(SessionError::NotAuthenticated);
        };

        match current.account_category() {
            AccountCategory::Unknown => Ok(self.resolve_category(&user_id).await),
            known => Ok(known),
        }
    }
}

fn login_failure_message(failure: &ApiFailure) -> String {
    if failure.message == crate::client::GENERIC_FAILURE_MESSAGE {
        LOGIN_FAILURE_MESSAGE.to_string()
    } else {
        failure.message.clone()
    }
}
