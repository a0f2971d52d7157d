//! Auth client: login, registration, logout, profile, refresh.
//!
//! ARCHITECTURE
//! ============
//! [`AuthApi`] is the seam between the shell and the network. The shell only
//! ever sees [`Outcome`] values, never raw errors, so a failed request cannot
//! unwind through a navigation transition. [`AuthClient`] is the HTTP
//! implementation; tests substitute scripted fakes.

pub mod client;

pub use client::AuthClient;

use serde::Serialize;

use crate::net::error::{ApiError, ErrorKind};
use crate::net::types::{TokenPair, UserInfo, UserProfile};

// =============================================================================
// OUTCOME
// =============================================================================

/// Uniform `{success, data?, message?}` result of an auth operation.
///
/// `error` carries the failure class so callers can single out
/// [`ErrorKind::Unauthorized`] without parsing the message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorKind>,
}

impl<T> Outcome<T> {
    #[must_use]
    pub fn ok(data: T) -> Self {
        Self { success: true, data: Some(data), message: None, error: None }
    }

    #[must_use]
    pub fn failed(err: &ApiError) -> Self {
        Self { success: false, data: None, message: Some(err.to_string()), error: Some(err.kind()) }
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.error == Some(ErrorKind::Unauthorized)
    }

    /// Message to show the user, with `fallback` when the failure had none.
    #[must_use]
    pub fn message_or(&self, fallback: &str) -> String {
        self.message
            .clone()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| fallback.to_owned())
    }
}

impl<T> From<Result<T, ApiError>> for Outcome<T> {
    fn from(result: Result<T, ApiError>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(err) => Self::failed(&err),
        }
    }
}

/// Result of a registration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub user_id: Option<String>,
    /// `true` when the response carried tokens and a session is now stored.
    pub session_established: bool,
    pub user: Option<UserInfo>,
}

// =============================================================================
// SEAM
// =============================================================================

/// Operations the shell needs from the auth backend.
///
/// Implementations must never panic on network or decode failures; every
/// problem is reported through [`Outcome`]. No operation retries.
#[async_trait::async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchange credentials for a stored token pair.
    async fn login(&self, email: &str, password: &str) -> Outcome<Option<UserInfo>>;

    /// Create an account. Only establishes a session if the response embeds
    /// tokens.
    async fn register(&self, email: &str, username: &str, password: &str) -> Outcome<Registration>;

    /// Best-effort server logout followed by an unconditional local clear.
    async fn logout(&self) -> Outcome<()>;

    /// Fetch the signed-in user's profile and roles.
    async fn get_user_profile(&self) -> Outcome<UserProfile>;

    /// Trade the stored refresh token for a new access token.
    async fn refresh_session(&self) -> Outcome<TokenPair>;
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
