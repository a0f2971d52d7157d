//! In-memory account and session registry for the stub backend.
//!
//! ARCHITECTURE
//! ============
//! Accounts are keyed by normalized email. Access and refresh tokens map
//! back to the owning account. Nothing is persisted: restarting the process
//! signs everyone out, which is the point of a stub.
//!
//! TRADE-OFFS
//! ==========
//! Refresh rotates the access token only; the refresh token stays valid
//! until logout. Logout revokes every token issued for that login.

use std::collections::HashMap;
use std::fmt::Write;
use std::sync::Arc;

use rand::Rng;
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::BackendConfig;
use crate::net::types::{ADMIN_ROLE, Roles, TokenPair, UserInfo};

const USER_ROLE: &str = "user";
const MIN_PASSWORD_LEN: usize = 6;

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthFailure {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("Invalid email address")]
    InvalidEmail,
    #[error("Password must be at least 6 characters")]
    WeakPassword,
    #[error("An account with this email already exists")]
    EmailTaken,
    #[error("Invalid email or password")]
    BadCredentials,
    #[error("Unauthorized")]
    InvalidToken,
}

impl AuthFailure {
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "E_MISSING_FIELD",
            Self::InvalidEmail => "E_INVALID_EMAIL",
            Self::WeakPassword => "E_WEAK_PASSWORD",
            Self::EmailTaken => "E_EMAIL_TAKEN",
            Self::BadCredentials => "E_BAD_CREDENTIALS",
            Self::InvalidToken => "E_INVALID_TOKEN",
        }
    }
}

// =============================================================================
// TOKENS & HASHING
// =============================================================================

pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Random 32-byte hex token.
#[must_use]
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes_to_hex(&bytes)
}

fn generate_salt() -> String {
    let bytes: [u8; 16] = rand::rng().random();
    bytes_to_hex(&bytes)
}

#[must_use]
pub fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    bytes_to_hex(&hasher.finalize())
}

#[must_use]
pub fn normalize_email(email: &str) -> Option<String> {
    let normalized = email.trim().to_ascii_lowercase();
    let (local, domain) = normalized.split_once('@')?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return None;
    }
    Some(normalized)
}

// =============================================================================
// ACCOUNTS
// =============================================================================

#[derive(Debug, Clone)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub roles: Roles,
    salt: String,
    password_hash: String,
}

impl Account {
    fn new(email: String, username: String, password: &str, roles: Roles) -> Self {
        let salt = generate_salt();
        let password_hash = hash_password(&salt, password);
        Self { id: Uuid::new_v4(), email, username, roles, salt, password_hash }
    }

    fn verify(&self, password: &str) -> bool {
        hash_password(&self.salt, password) == self.password_hash
    }

    #[must_use]
    pub fn info(&self) -> UserInfo {
        UserInfo {
            id: self.id.to_string(),
            email: self.email.clone(),
            username: self.username.clone(),
            roles: self.roles.clone(),
        }
    }
}

#[derive(Default)]
struct Registry {
    accounts: HashMap<String, Account>,
    /// access token -> account email
    access: HashMap<String, String>,
    /// refresh token -> account email
    refresh: HashMap<String, String>,
    /// refresh token -> the access token currently issued under it
    lineage: HashMap<String, String>,
}

// =============================================================================
// BACKEND STATE
// =============================================================================

/// Shared backend state, injected into Axum handlers via the `State`
/// extractor. Clone is cheap: the registry is `Arc`-wrapped.
#[derive(Clone, Default)]
pub struct BackendState {
    inner: Arc<RwLock<Registry>>,
}

impl BackendState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// State with the admin account from `config` seeded, if a password is
    /// configured.
    pub async fn from_config(config: &BackendConfig) -> Self {
        let state = Self::new();
        if let Some(password) = &config.admin_password {
            state
                .seed_account(&config.admin_email, "admin", password, &[ADMIN_ROLE, USER_ROLE])
                .await;
            tracing::info!(email = %config.admin_email, "seeded admin account");
        }
        state
    }

    /// Insert or replace an account without validation.
    pub async fn seed_account(&self, email: &str, username: &str, password: &str, roles: &[&str]) -> UserInfo {
        let email = email.trim().to_ascii_lowercase();
        let roles = roles.iter().map(|r| (*r).to_owned()).collect();
        let account = Account::new(email.clone(), username.to_owned(), password, roles);
        let info = account.info();
        self.inner.write().await.accounts.insert(email, account);
        info
    }

    /// Create a regular user account.
    ///
    /// # Errors
    ///
    /// Fails on blank fields, a malformed email, a short password, or an
    /// email that is already registered.
    pub async fn register(&self, email: &str, username: &str, password: &str) -> Result<UserInfo, AuthFailure> {
        if email.trim().is_empty() {
            return Err(AuthFailure::MissingField("Email"));
        }
        if username.trim().is_empty() {
            return Err(AuthFailure::MissingField("Username"));
        }
        if password.is_empty() {
            return Err(AuthFailure::MissingField("Password"));
        }
        let email = normalize_email(email).ok_or(AuthFailure::InvalidEmail)?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthFailure::WeakPassword);
        }

        let mut registry = self.inner.write().await;
        if registry.accounts.contains_key(&email) {
            return Err(AuthFailure::EmailTaken);
        }
        let roles = std::iter::once(USER_ROLE.to_owned()).collect();
        let account = Account::new(email.clone(), username.trim().to_owned(), password, roles);
        let info = account.info();
        registry.accounts.insert(email, account);
        Ok(info)
    }

    /// Verify credentials and issue a fresh token pair.
    ///
    /// # Errors
    ///
    /// Returns [`AuthFailure::BadCredentials`] for an unknown email or a
    /// wrong password, without saying which.
    pub async fn login(&self, email: &str, password: &str) -> Result<(TokenPair, UserInfo), AuthFailure> {
        if email.trim().is_empty() {
            return Err(AuthFailure::MissingField("Email"));
        }
        if password.is_empty() {
            return Err(AuthFailure::MissingField("Password"));
        }
        let email = normalize_email(email).ok_or(AuthFailure::BadCredentials)?;

        let mut registry = self.inner.write().await;
        let info = match registry.accounts.get(&email) {
            Some(account) if account.verify(password) => account.info(),
            _ => return Err(AuthFailure::BadCredentials),
        };

        let tokens = TokenPair { access_token: generate_token(), refresh_token: generate_token() };
        registry
            .access
            .insert(tokens.access_token.clone(), email.clone());
        registry
            .refresh
            .insert(tokens.refresh_token.clone(), email);
        registry
            .lineage
            .insert(tokens.refresh_token.clone(), tokens.access_token.clone());
        Ok((tokens, info))
    }

    /// Resolve an access token to its account.
    ///
    /// # Errors
    ///
    /// Returns [`AuthFailure::InvalidToken`] for unknown or revoked tokens.
    pub async fn validate_access(&self, access_token: &str) -> Result<UserInfo, AuthFailure> {
        let registry = self.inner.read().await;
        registry
            .access
            .get(access_token)
            .and_then(|email| registry.accounts.get(email))
            .map(Account::info)
            .ok_or(AuthFailure::InvalidToken)
    }

    /// Issue a new access token for a live refresh token. The access token
    /// it replaces stops working.
    ///
    /// # Errors
    ///
    /// Returns [`AuthFailure::InvalidToken`] for unknown or revoked refresh
    /// tokens.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, AuthFailure> {
        let mut registry = self.inner.write().await;
        let email = registry
            .refresh
            .get(refresh_token)
            .cloned()
            .ok_or(AuthFailure::InvalidToken)?;
        let access_token = generate_token();
        registry.access.insert(access_token.clone(), email);
        if let Some(previous) = registry
            .lineage
            .insert(refresh_token.to_owned(), access_token.clone())
        {
            registry.access.remove(&previous);
        }
        Ok(access_token)
    }

    /// Revoke the login that `access_token` belongs to. Unknown tokens are a
    /// no-op.
    pub async fn logout(&self, access_token: &str) {
        let mut registry = self.inner.write().await;
        registry.access.remove(access_token);

        let owning_refresh = registry
            .lineage
            .iter()
            .find(|(_, issued)| issued.as_str() == access_token)
            .map(|(refresh, _)| refresh.clone());
        if let Some(refresh) = owning_refresh {
            registry.refresh.remove(&refresh);
            registry.lineage.remove(&refresh);
        }
    }

    /// Number of live access tokens.
    pub async fn active_sessions(&self) -> usize {
        self.inner.read().await.access.len()
    }
}

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
