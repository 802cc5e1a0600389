//! The persisted identity record: a user id and a category tag kept as a pair.

use crate::identity::errors::IdentityStoreError;
use crate::identity::types::IdentityStore;
use crate::session::{AccountCategory, UserId};

pub(crate) const USER_ID_KEY: &str = "userId";
pub(crate) const ACCOUNT_CATEGORY_KEY: &str = "userType";
pub(crate) const SESSION_CREDENTIAL_KEY: &str = "sessionCookie";

/// Identity data cached across restarts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct IdentityRecord {
    pub(crate) user_id: Option<UserId>,
    pub(crate) account_category: AccountCategory,
    /// Session cookie issued by the backend, replayed on the next start.
    pub(crate) session_credential: Option<String>,
}

impl IdentityRecord {
    pub(crate) async fn load(store: &dyn IdentityStore) -> Result<Self, IdentityStoreError> {
        let user_id = store
            .get(USER_ID_KEY)
            .await?
            .filter(|id| !id.is_empty())
            .map(UserId::new);

        // Entries without a user id are orphans from an interrupted clear
        if user_id.is_none() {
            return Ok(Self::default());
        }

        let account_category = store
            .get(ACCOUNT_CATEGORY_KEY)
            .await?
            .map(|tag| AccountCategory::from_tag(&tag))
            .unwrap_or_default();
        let session_credential = store
            .get(SESSION_CREDENTIAL_KEY)
            .await?
            .filter(|c| !c.is_empty());

        Ok(Self {
            user_id,
            account_category,
            session_credential,
        })
    }

    /// Writes the user id and, when known, the category. A stale category
    /// from a previous user is removed when the new one is unknown.
    pub(crate) async fn save(
        store: &mut dyn IdentityStore,
        user_id: &UserId,
        account_category: AccountCategory,
    ) -> Result<(), IdentityStoreError> {
        store.put(USER_ID_KEY, user_id.as_str()).await?;
        Self::save_category(store, account_category).await
    }

    pub(crate) async fn save_category(
        store: &mut dyn IdentityStore,
        account_category: AccountCategory,
    ) -> Result<(), IdentityStoreError> {
        match account_category.as_tag() {
            Some(tag) => store.put(ACCOUNT_CATEGORY_KEY, tag).await,
            None => store.remove(ACCOUNT_CATEGORY_KEY).await,
        }
    }

    pub(crate) async fn save_credential(
        store: &mut dyn IdentityStore,
        credential: &str,
    ) -> Result<(), IdentityStoreError> {
        store.put(SESSION_CREDENTIAL_KEY, credential).await
    }

    /// Removes every entry. The user id goes last so an interruption never
    /// leaves the other entries looking valid.
    pub(crate) async fn clear(store: &mut dyn IdentityStore) -> Result<(), IdentityStoreError> {
        store.remove(ACCOUNT_CATEGORY_KEY).await?;
        store.remove(SESSION_CREDENTIAL_KEY).await?;
        store.remove(USER_ID_KEY).await
    }
}
