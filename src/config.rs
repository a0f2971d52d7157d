//! Configuration parsed from environment variables.
//!
//! DESIGN
//! ======
//! Both configs are built from a key lookup so `from_env` stays a thin
//! wrapper and tests can feed a fixed map instead of mutating the process
//! environment.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@cyberguard.local";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {key}: {value:?} ({reason})")]
    Invalid { key: &'static str, value: String, reason: String },
}

impl ConfigError {
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Invalid { .. } => "E_CONFIG_INVALID",
        }
    }
}

// =============================================================================
// CLIENT
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl ClientTimeouts {
    #[must_use]
    pub fn request(&self) -> Duration {
        Duration::from_secs(self.request_secs)
    }

    #[must_use]
    pub fn connect(&self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }
}

impl Default for ClientTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

/// Settings for the auth client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API root, including the `/api` prefix, without a trailing slash.
    pub api_base_url: String,
    pub timeouts: ClientTimeouts,
    /// Where `FileTokenStore` keeps the session. `None` means memory only.
    pub token_file: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { api_base_url: DEFAULT_API_BASE_URL.to_owned(), timeouts: ClientTimeouts::default(), token_file: None }
    }
}

impl ClientConfig {
    /// Build from the process environment.
    ///
    /// Optional:
    /// - `CYBERGUARD_API_BASE_URL`: default `http://localhost:8000/api`
    /// - `CYBERGUARD_REQUEST_TIMEOUT_SECS`: default 30
    /// - `CYBERGUARD_CONNECT_TIMEOUT_SECS`: default 10
    /// - `CYBERGUARD_TOKEN_FILE`: path of the persisted session
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is not http(s) or a timeout is not a
    /// positive integer.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// See [`ClientConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_base_url = parse_base_url(
            "CYBERGUARD_API_BASE_URL",
            lookup("CYBERGUARD_API_BASE_URL").as_deref().unwrap_or(DEFAULT_API_BASE_URL),
        )?;
        let timeouts = ClientTimeouts {
            request_secs: parse_secs(
                "CYBERGUARD_REQUEST_TIMEOUT_SECS",
                lookup("CYBERGUARD_REQUEST_TIMEOUT_SECS"),
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?,
            connect_secs: parse_secs(
                "CYBERGUARD_CONNECT_TIMEOUT_SECS",
                lookup("CYBERGUARD_CONNECT_TIMEOUT_SECS"),
                DEFAULT_CONNECT_TIMEOUT_SECS,
            )?,
        };
        let token_file = lookup("CYBERGUARD_TOKEN_FILE")
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        Ok(Self { api_base_url, timeouts, token_file })
    }
}

// =============================================================================
// BACKEND
// =============================================================================

/// Settings for the stub auth backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub port: u16,
    /// Origin allowed by CORS.
    pub frontend_url: String,
    pub admin_email: String,
    /// No admin account is seeded when unset.
    pub admin_password: Option<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            frontend_url: DEFAULT_FRONTEND_URL.to_owned(),
            admin_email: DEFAULT_ADMIN_EMAIL.to_owned(),
            admin_password: None,
        }
    }
}

impl BackendConfig {
    /// Build from the process environment.
    ///
    /// Optional:
    /// - `PORT`: default 8000
    /// - `FRONTEND_URL`: default `http://localhost:3000`
    /// - `ADMIN_EMAIL`: default `admin@cyberguard.local`
    /// - `ADMIN_PASSWORD`: seeds the admin account when set
    ///
    /// # Errors
    ///
    /// Returns an error if `PORT` is not a valid port number.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// See [`BackendConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| ConfigError::Invalid {
                key: "PORT",
                value: raw.clone(),
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };
        let frontend_url = lookup("FRONTEND_URL")
            .unwrap_or_else(|| DEFAULT_FRONTEND_URL.to_owned())
            .trim_end_matches('/')
            .to_owned();
        let admin_email = lookup("ADMIN_EMAIL")
            .map(|e| e.trim().to_ascii_lowercase())
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| DEFAULT_ADMIN_EMAIL.to_owned());
        let admin_password = lookup("ADMIN_PASSWORD").filter(|p| !p.is_empty());

        Ok(Self { port, frontend_url, admin_email, admin_password })
    }
}

fn parse_base_url(key: &'static str, raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ConfigError::Invalid {
            key,
            value: raw.to_owned(),
            reason: "expected an http:// or https:// URL".into(),
        });
    }
    Ok(trimmed.to_owned())
}

fn parse_secs(key: &'static str, raw: Option<String>, default: u64) -> Result<u64, ConfigError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::Invalid { key, value: raw, reason: "must be greater than zero".into() }),
        Ok(secs) => Ok(secs),
        Err(e) => Err(ConfigError::Invalid { key, value: raw, reason: e.to_string() }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
