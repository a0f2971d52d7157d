//! Session/token store.
//!
//! SYSTEM CONTEXT
//! ==============
//! The store is the single place the access token, refresh token, and cached
//! user info live between requests. Only the auth client and the HTTP
//! boundary touch it; the shell sees it only through the profile check it
//! runs at mount.
//!
//! DESIGN
//! ======
//! The contract is synchronous and infallible so it can be consulted before
//! the first render. [`FileTokenStore`] is the durable implementation; any
//! I/O or decode problem is logged and reads as "no session", the same way a
//! browser treats restricted local storage.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::config::ClientConfig;
use crate::net::types::{TokenPair, UserInfo};

/// Storage for the current session.
pub trait TokenStore: Send + Sync {
    /// Current token pair, if a session is stored.
    fn get(&self) -> Option<TokenPair>;
    /// Replace the stored token pair.
    fn set(&self, tokens: TokenPair);
    /// Remove tokens and cached user info.
    fn clear(&self);
    /// Cached user info from the last login.
    fn user(&self) -> Option<UserInfo>;
    /// Replace the cached user info.
    fn set_user(&self, user: UserInfo);

    /// Whether an access token is currently stored.
    fn has_session(&self) -> bool {
        self.get().is_some()
    }
}

/// Shared handle to a store, as held by the auth client and the shell.
pub type SharedTokenStore = Arc<dyn TokenStore>;

/// Open the store `config` asks for: file-backed when a token file is
/// configured, memory-only otherwise.
#[must_use]
pub fn open_store(config: &ClientConfig) -> SharedTokenStore {
    match &config.token_file {
        Some(path) => Arc::new(FileTokenStore::new(path.clone())),
        None => Arc::new(MemoryTokenStore::new()),
    }
}

/// On-disk / in-memory representation of the stored keys.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user: Option<UserInfo>,
}

impl StoredSession {
    fn tokens(&self) -> Option<TokenPair> {
        match (&self.access_token, &self.refresh_token) {
            (Some(access), Some(refresh)) if !access.is_empty() => {
                Some(TokenPair { access_token: access.clone(), refresh_token: refresh.clone() })
            }
            _ => None,
        }
    }

    fn set_tokens(&mut self, tokens: TokenPair) {
        self.access_token = Some(tokens.access_token);
        self.refresh_token = Some(tokens.refresh_token);
    }
}

// =============================================================================
// MEMORY STORE
// =============================================================================

/// Process-local store. Used by tests and by embedders that do not need the
/// session to survive a restart.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    inner: Mutex<StoredSession>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a token pair.
    #[must_use]
    pub fn with_tokens(tokens: TokenPair) -> Self {
        let store = Self::new();
        store.set(tokens);
        store
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Option<TokenPair> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).tokens()
    }

    fn set(&self, tokens: TokenPair) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .set_tokens(tokens);
    }

    fn clear(&self) {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) = StoredSession::default();
    }

    fn user(&self) -> Option<UserInfo> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .user
            .clone()
    }

    fn set_user(&self, user: UserInfo) {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).user = Some(user);
    }
}

// =============================================================================
// FILE STORE
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("token file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("token file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// JSON-file store. Every write replaces the file through a rename so a
/// crash mid-write never leaves a half-written session behind.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileTokenStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), lock: Mutex::new(()) }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> StoredSession {
        match read_session(&self.path) {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "token store unreadable, treating as empty");
                StoredSession::default()
            }
        }
    }

    fn update(&self, f: impl FnOnce(&mut StoredSession)) {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut session = self.load();
        f(&mut session);
        if let Err(e) = write_session(&self.path, &session) {
            tracing::warn!(path = %self.path.display(), error = %e, "token store write failed");
        }
    }
}

fn read_session(path: &Path) -> Result<StoredSession, StoreError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(StoredSession::default()),
        Err(e) => return Err(e.into()),
    };
    if raw.trim().is_empty() {
        return Ok(StoredSession::default());
    }
    Ok(serde_json::from_str(&raw)?)
}

fn write_session(path: &Path, session: &StoredSession) -> Result<(), StoreError> {
    if *session == StoredSession::default() {
        return match std::fs::remove_file(path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        };
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, serde_json::to_vec_pretty(session)?)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

impl TokenStore for FileTokenStore {
    fn get(&self) -> Option<TokenPair> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.load().tokens()
    }

    fn set(&self, tokens: TokenPair) {
        self.update(|s| s.set_tokens(tokens));
    }

    fn clear(&self) {
        self.update(|s| *s = StoredSession::default());
    }

    fn user(&self) -> Option<UserInfo> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.load().user
    }

    fn set_user(&self, user: UserInfo) {
        self.update(|s| s.user = Some(user));
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
