//! Wire DTOs for `/api/auth/*`.
//!
//! DESIGN
//! ======
//! These types are shared by the auth client and the stub backend so both
//! sides of the boundary agree on field names (`camelCase` on the wire).
//! Response types are lenient: optional fields default, and profile bodies
//! accept the several shapes the API has produced over time.

use std::collections::BTreeSet;
use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Serialize};

/// Role that unlocks the admin panel.
pub const ADMIN_ROLE: &str = "admin";

/// Set of role names attached to a user.
pub type Roles = BTreeSet<String>;

/// Returns `true` when `roles` grants admin access.
#[must_use]
pub fn has_admin_role(roles: &Roles) -> bool {
    roles.contains(ADMIN_ROLE)
}

// =============================================================================
// SESSION
// =============================================================================

/// Access/refresh token pair. Both values are opaque to the client.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// User info returned alongside a login and cached next to the tokens.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub roles: Roles,
}

// =============================================================================
// REQUESTS
// =============================================================================

/// Request bodies default missing fields to empty so the backend can report
/// them as "required" instead of rejecting the JSON.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

// =============================================================================
// RESPONSES
// =============================================================================

/// `POST /api/auth/login` response.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<TokenPair>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// `POST /api/auth/register` response. Tokens are only present when the
/// server chose to sign the new account in immediately.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<TokenPair>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserInfo>,
}

/// Tokens issued by a refresh. The refresh token is only present when the
/// server rotates it.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshedTokens {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

/// `POST /api/auth/refresh` response. Older servers answer with a bare
/// `token` field instead of `tokens`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RefreshResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<RefreshedTokens>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RefreshResponse {
    /// The new access token and, if rotated, the new refresh token.
    #[must_use]
    pub fn into_tokens(self) -> Option<RefreshedTokens> {
        self.tokens.or_else(|| {
            self.token
                .map(|access_token| RefreshedTokens { access_token, refresh_token: None })
        })
    }
}

// =============================================================================
// PROFILE
// =============================================================================

/// Authenticated user's profile from `GET /api/auth/profile`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub username: String,
    pub roles: Roles,
}

#[derive(Deserialize)]
struct RawProfile {
    #[serde(default)]
    id: Option<serde_json::Value>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    roles: Vec<String>,
    #[serde(default)]
    role: Option<String>,
}

impl UserProfile {
    /// Decode a profile body.
    ///
    /// Accepts the profile at the top level or nested under `user` or
    /// `data`, with roles given as a `roles` array, a single `role` string,
    /// or both.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not a JSON object of the expected
    /// shape.
    pub fn from_json(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        let serde_json::Value::Object(mut map) = value else {
            return Err(serde_json::Error::custom("profile must be a JSON object"));
        };
        let inner = match map.remove("user").or_else(|| map.remove("data")) {
            Some(nested @ serde_json::Value::Object(_)) => nested,
            _ => serde_json::Value::Object(map),
        };

        let raw: RawProfile = serde_json::from_value(inner)?;
        let mut roles: Roles = raw.roles.into_iter().collect();
        if let Some(role) = raw.role.filter(|r| !r.is_empty()) {
            roles.insert(role);
        }
        let id = match raw.id {
            Some(serde_json::Value::String(s)) => s,
            Some(serde_json::Value::Number(n)) => n.to_string(),
            _ => String::new(),
        };

        Ok(Self { id, email: raw.email.unwrap_or_default(), username: raw.username.unwrap_or_default(), roles })
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        has_admin_role(&self.roles)
    }
}

impl From<UserProfile> for UserInfo {
    fn from(p: UserProfile) -> Self {
        Self { id: p.id, email: p.email, username: p.username, roles: p.roles }
    }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
