//! Stub backend handlers for `/api/auth/*` and `/health`.
//!
//! Failures use the `{success: false, message}` envelope the console's
//! HTTP boundary reads messages from.

use axum::extract::{FromRef, FromRequestParts, State};
use axum::http::StatusCode;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use super::state::{AuthFailure, BackendState};
use crate::net::types::{LoginRequest, RefreshRequest, RegisterRequest, UserInfo};

fn failure_status(failure: &AuthFailure) -> StatusCode {
    match failure {
        AuthFailure::EmailTaken => StatusCode::CONFLICT,
        AuthFailure::InvalidToken => StatusCode::UNAUTHORIZED,
        AuthFailure::MissingField(_)
        | AuthFailure::InvalidEmail
        | AuthFailure::WeakPassword
        | AuthFailure::BadCredentials => StatusCode::BAD_REQUEST,
    }
}

impl IntoResponse for AuthFailure {
    fn into_response(self) -> Response {
        let body = json!({ "success": false, "message": self.to_string(), "code": self.error_code() });
        (failure_status(&self), Json(body)).into_response()
    }
}

// =============================================================================
// AUTH EXTRACTOR
// =============================================================================

/// Caller resolved from an `Authorization: Bearer` header.
pub struct BearerUser {
    pub user: UserInfo,
    pub token: String,
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

impl<S> FromRequestParts<S> for BearerUser
where
    BackendState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthFailure;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AuthFailure::InvalidToken)?;
        let backend = BackendState::from_ref(state);
        let user = backend.validate_access(token).await?;
        Ok(Self { user, token: token.to_owned() })
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `GET /health`
pub async fn health() -> Json<serde_json::Value> {
    let timestamp = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default();
    Json(json!({ "status": "OK", "timestamp": timestamp }))
}

/// `POST /api/auth/login`
pub async fn login(State(state): State<BackendState>, Json(body): Json<LoginRequest>) -> Response {
    match state.login(&body.email, &body.password).await {
        Ok((tokens, user)) => {
            tracing::info!(user_id = %user.id, "login");
            Json(json!({ "success": true, "tokens": tokens, "user": user })).into_response()
        }
        Err(e) => {
            tracing::info!(code = e.error_code(), "login rejected");
            e.into_response()
        }
    }
}

/// `POST /api/auth/register`: creates the account without signing in.
pub async fn register(State(state): State<BackendState>, Json(body): Json<RegisterRequest>) -> Response {
    match state
        .register(&body.email, &body.username, &body.password)
        .await
    {
        Ok(user) => {
            tracing::info!(user_id = %user.id, "account registered");
            (
                StatusCode::CREATED,
                Json(json!({ "success": true, "message": "Registration successful", "userId": user.id })),
            )
                .into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// `GET /api/auth/profile`
pub async fn profile(auth: BearerUser) -> Json<UserInfo> {
    Json(auth.user)
}

/// `POST /api/auth/logout`
pub async fn logout(State(state): State<BackendState>, auth: BearerUser) -> StatusCode {
    state.logout(&auth.token).await;
    tracing::info!(user_id = %auth.user.id, "logout");
    StatusCode::NO_CONTENT
}

/// `POST /api/auth/refresh`
pub async fn refresh(State(state): State<BackendState>, Json(body): Json<RefreshRequest>) -> Response {
    match state.refresh(&body.refresh_token).await {
        Ok(access_token) => Json(json!({ "success": true, "tokens": { "accessToken": access_token } })).into_response(),
        Err(e) => e.into_response(),
    }
}

#[cfg(test)]
#[path = "routes_test.rs"]
mod tests;
