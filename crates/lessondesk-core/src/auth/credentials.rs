use std::sync::{Arc, RwLock};

use tracing::{debug, warn};

use crate::cache::PersistentStore;
use crate::models::{TokenPair, UserProfile};

/// Storage key for the bearer token
pub const ACCESS_TOKEN_KEY: &str = "admin_access_token";

/// Storage key for the refresh token
pub const REFRESH_TOKEN_KEY: &str = "admin_refresh_token";

/// Storage key for the cached admin profile
pub const USER_DATA_KEY: &str = "admin_user_data";

#[derive(Debug, Clone, Default, PartialEq)]
struct Credentials {
    access_token: Option<String>,
    refresh_token: Option<String>,
    user: Option<UserProfile>,
}

/// Holds the admin's tokens and profile, mirrored into persistent storage
/// so a restart restores the session.
///
/// Writes to storage are best-effort: a failed write is logged and the
/// in-memory copy stays authoritative for this process.
pub struct CredentialStore {
    storage: Arc<dyn PersistentStore>,
    current: RwLock<Credentials>,
}

impl CredentialStore {
    /// Restore whatever credentials the storage holds.
    pub fn load(storage: Arc<dyn PersistentStore>) -> Self {
        let read = |key: &str| match storage.get_item(key) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                warn!(key, error = %e, "Failed to read stored credential");
                None
            }
        };

        let user = read(USER_DATA_KEY).and_then(|raw| match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable stored profile");
                None
            }
        });

        let current = Credentials {
            access_token: read(ACCESS_TOKEN_KEY),
            refresh_token: read(REFRESH_TOKEN_KEY),
            user,
        };
        debug!(
            has_access = current.access_token.is_some(),
            has_refresh = current.refresh_token.is_some(),
            "Credentials loaded"
        );

        Self {
            storage,
            current: RwLock::new(current),
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Credentials> {
        self.current.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Credentials> {
        self.current.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn persist(&self, key: &str, value: Option<&str>) {
        let result = match value {
            Some(v) => self.storage.set_item(key, v),
            None => self.storage.remove_item(key),
        };
        if let Err(e) = result {
            warn!(key, error = %e, "Failed to persist credential");
        }
    }

    pub fn access_token(&self) -> Option<String> {
        self.read().access_token.clone()
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.read().refresh_token.clone()
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.read().user.clone()
    }

    /// A session exists whenever an access token is held.
    pub fn is_authenticated(&self) -> bool {
        self.read().access_token.is_some()
    }

    /// Replace both tokens.
    pub fn store_tokens(&self, tokens: &TokenPair) {
        {
            let mut current = self.write();
            current.access_token = Some(tokens.access_token.clone());
            current.refresh_token = Some(tokens.refresh_token.clone());
        }
        self.persist(ACCESS_TOKEN_KEY, Some(&tokens.access_token));
        self.persist(REFRESH_TOKEN_KEY, Some(&tokens.refresh_token));
    }

    pub fn store_user(&self, user: &UserProfile) {
        self.write().user = Some(user.clone());
        match serde_json::to_string(user) {
            Ok(raw) => self.persist(USER_DATA_KEY, Some(&raw)),
            Err(e) => warn!(error = %e, "Failed to serialize profile"),
        }
    }

    /// Forget every credential, in memory and in storage.
    pub fn purge(&self) {
        *self.write() = Credentials::default();
        self.persist(ACCESS_TOKEN_KEY, None);
        self.persist(REFRESH_TOKEN_KEY, None);
        self.persist(USER_DATA_KEY, None);
        debug!("Credentials purged");
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print tokens.
        f.debug_struct("CredentialStore")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}
