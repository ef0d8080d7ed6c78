//! Signed-in state and its on-disk copy.
//!
//! [`TokenStore`] is a small key-value file standing in for browser local
//! storage. [`Session`] is the only thing that writes to it: everything else
//! asks the session who is signed in and which token to send.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use tracing::{debug, warn};

use crate::error::Result;
use crate::models::User;

pub const TOKEN_KEY: &str = "token";
pub const ADMIN_TOKEN_KEY: &str = "adminToken";
pub const USER_KEY: &str = "user";

/// Which credential a request carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScope {
    /// Renter or landlord token, when signed in.
    User,
    Admin,
}

impl AuthScope {
    fn key(self) -> &'static str {
        match self {
            AuthScope::User => TOKEN_KEY,
            AuthScope::Admin => ADMIN_TOKEN_KEY,
        }
    }
}

#[derive(Debug, Default)]
pub struct TokenStore {
    path: Option<PathBuf>,
    entries: RwLock<BTreeMap<String, String>>,
}

impl TokenStore {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open the store at `path`. A missing file is an empty store. So is an
    /// unreadable one (with a warning), since a corrupt session only costs a
    /// fresh sign-in.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("Ignoring unreadable session file {}: {e}", path.display());
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path: Some(path),
            entries: RwLock::new(entries),
        })
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    pub fn set(&self, key: &str, value: impl Into<String>) -> Result<()> {
        let value = value.into();
        self.update(|entries| {
            entries.insert(key.to_string(), value);
        })
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        self.update(|entries| {
            entries.remove(key);
        })
    }

    /// Apply `edit` and write the file once. If the write fails the
    /// in-memory entries are restored, so memory never runs ahead of disk.
    pub fn update(&self, edit: impl FnOnce(&mut BTreeMap<String, String>)) -> Result<()> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.clone();
        edit(&mut entries);
        if *entries == before {
            return Ok(());
        }
        if let Err(e) = self.persist(&entries) {
            *entries = before;
            return Err(e);
        }
        Ok(())
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(entries)?)?;
        debug!("Session written to {}", path.display());
        Ok(())
    }
}

/// Process-wide "who is signed in".
#[derive(Debug)]
pub struct Session {
    store: TokenStore,
    user: RwLock<Option<User>>,
}

impl Session {
    /// Restore from `store`. A stored user that no longer decodes is dropped.
    pub fn new(store: TokenStore) -> Self {
        let user = store.get(USER_KEY).and_then(|raw| {
            serde_json::from_str(&raw)
                .map_err(|e| warn!("Discarding stored user: {e}"))
                .ok()
        });

        Self {
            store,
            user: RwLock::new(user),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(TokenStore::in_memory())
    }

    pub fn current_user(&self) -> Option<User> {
        self.user
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.token(AuthScope::User).is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.token(AuthScope::Admin).is_some()
    }

    pub fn token(&self, scope: AuthScope) -> Option<String> {
        self.store.get(scope.key()).filter(|t| !t.is_empty())
    }

    /// Token and user land in the store together or not at all.
    pub fn sign_in(&self, user: User, token: &str) -> Result<()> {
        let raw_user = serde_json::to_string(&user)?;
        self.store.update(|entries| {
            entries.insert(TOKEN_KEY.to_string(), token.to_string());
            entries.insert(USER_KEY.to_string(), raw_user);
        })?;
        *self.user.write().unwrap_or_else(PoisonError::into_inner) = Some(user);
        Ok(())
    }

    pub fn sign_out(&self) -> Result<()> {
        self.store.update(|entries| {
            entries.remove(TOKEN_KEY);
            entries.remove(USER_KEY);
        })?;
        *self.user.write().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }

    pub fn admin_sign_in(&self, token: &str) -> Result<()> {
        self.store.set(ADMIN_TOKEN_KEY, token)
    }

    pub fn admin_sign_out(&self) -> Result<()> {
        self.store.remove(ADMIN_TOKEN_KEY)
    }
}
