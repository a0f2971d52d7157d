//! HTTP implementation of [`AuthApi`].

use serde_json::json;

use super::{AuthApi, Outcome, Registration};
use crate::config::ClientConfig;
use crate::net::error::ApiError;
use crate::net::http::{HttpClient, decode};
use crate::net::types::{
    LoginRequest, LoginResponse, RefreshRequest, RefreshResponse, RegisterRequest, RegisterResponse, TokenPair,
    UserInfo, UserProfile,
};
use crate::session::SharedTokenStore;

const LOGIN_PATH: &str = "/auth/login";
const REGISTER_PATH: &str = "/auth/register";
const LOGOUT_PATH: &str = "/auth/logout";
const PROFILE_PATH: &str = "/auth/profile";
const REFRESH_PATH: &str = "/auth/refresh";

pub struct AuthClient {
    http: HttpClient,
}

impl AuthClient {
    /// Build a client that writes sessions into `store`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &ClientConfig, store: SharedTokenStore) -> Result<Self, ApiError> {
        Ok(Self { http: HttpClient::new(config, store)? })
    }

    #[must_use]
    pub fn store(&self) -> &SharedTokenStore {
        self.http.store()
    }

    async fn try_login(&self, email: &str, password: &str) -> Result<Option<UserInfo>, ApiError> {
        let body = LoginRequest { email: email.trim().to_owned(), password: password.to_owned() };
        let resp: LoginResponse = decode(self.http.post_json(LOGIN_PATH, &body).await?)?;
        if resp.success == Some(false) {
            return Err(rejected(resp.message, "Login failed"));
        }
        let tokens = resp
            .tokens
            .ok_or_else(|| ApiError::MalformedResponse("login response carried no tokens".into()))?;

        self.store().set(tokens);
        if let Some(user) = &resp.user {
            self.store().set_user(user.clone());
        }
        tracing::info!(email = %body.email, "login succeeded");
        Ok(resp.user)
    }

    async fn try_register(&self, email: &str, username: &str, password: &str) -> Result<Registration, ApiError> {
        let body = RegisterRequest {
            email: email.trim().to_owned(),
            username: username.trim().to_owned(),
            password: password.to_owned(),
        };
        let resp: RegisterResponse = decode(self.http.post_json(REGISTER_PATH, &body).await?)?;
        if resp.success == Some(false) {
            return Err(rejected(resp.message, "Registration failed"));
        }

        let session_established = match resp.tokens {
            Some(tokens) => {
                self.store().set(tokens);
                if let Some(user) = &resp.user {
                    self.store().set_user(user.clone());
                }
                true
            }
            None => false,
        };
        tracing::info!(email = %body.email, session_established, "registration succeeded");
        Ok(Registration { user_id: resp.user_id, session_established, user: resp.user })
    }

    async fn try_get_profile(&self) -> Result<UserProfile, ApiError> {
        if !self.store().has_session() {
            return Err(ApiError::Unauthorized("Not authenticated".into()));
        }
        let value = self.http.get_json(PROFILE_PATH).await?;
        UserProfile::from_json(value).map_err(|e| ApiError::MalformedResponse(e.to_string()))
    }

    async fn try_refresh(&self) -> Result<TokenPair, ApiError> {
        let Some(current) = self.store().get() else {
            return Err(ApiError::Unauthorized("No refresh token".into()));
        };
        let body = RefreshRequest { refresh_token: current.refresh_token.clone() };
        let resp: RefreshResponse = decode(self.http.post_json(REFRESH_PATH, &body).await?)?;
        if resp.success == Some(false) {
            return Err(rejected(resp.message, "Token refresh failed"));
        }
        let fresh = resp
            .into_tokens()
            .ok_or_else(|| ApiError::MalformedResponse("refresh response carried no token".into()))?;

        let pair = TokenPair {
            access_token: fresh.access_token,
            refresh_token: fresh.refresh_token.unwrap_or(current.refresh_token),
        };
        self.store().set(pair.clone());
        tracing::debug!("access token refreshed");
        Ok(pair)
    }
}

/// A `2xx` body that reported `success: false`.
fn rejected(message: Option<String>, fallback: &str) -> ApiError {
    ApiError::Validation {
        status: 200,
        message: message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| fallback.to_owned()),
    }
}

#[async_trait::async_trait]
impl AuthApi for AuthClient {
    async fn login(&self, email: &str, password: &str) -> Outcome<Option<UserInfo>> {
        let result = self.try_login(email, password).await;
        if let Err(e) = &result {
            tracing::info!(error = %e, code = e.error_code(), "login failed");
        }
        result.into()
    }

    async fn register(&self, email: &str, username: &str, password: &str) -> Outcome<Registration> {
        let result = self.try_register(email, username, password).await;
        if let Err(e) = &result {
            tracing::info!(error = %e, code = e.error_code(), "registration failed");
        }
        result.into()
    }

    async fn logout(&self) -> Outcome<()> {
        if self.store().has_session() {
            if let Err(e) = self.http.post_json(LOGOUT_PATH, &json!({})).await {
                tracing::warn!(error = %e, "server logout failed, clearing local session anyway");
            }
        }
        self.store().clear();
        tracing::info!("session cleared");
        Outcome::ok(())
    }

    async fn get_user_profile(&self) -> Outcome<UserProfile> {
        let result = self.try_get_profile().await;
        if let Err(e) = &result {
            tracing::debug!(error = %e, code = e.error_code(), "profile fetch failed");
        }
        result.into()
    }

    async fn refresh_session(&self) -> Outcome<TokenPair> {
        let result = self.try_refresh().await;
        if let Err(e) = &result {
            tracing::warn!(error = %e, code = e.error_code(), "token refresh failed");
        }
        result.into()
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
