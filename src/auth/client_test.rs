use std::sync::Arc;

use super::*;
use crate::backend::test_helpers::{ADMIN_EMAIL, ADMIN_PASSWORD, USER_EMAIL, USER_PASSWORD, spawn_backend};
use crate::net::error::ErrorKind;
use crate::session::{MemoryTokenStore, TokenStore};

fn client_for(base: &str) -> AuthClient {
    let config = ClientConfig { api_base_url: base.to_owned(), ..ClientConfig::default() };
    AuthClient::new(&config, Arc::new(MemoryTokenStore::new())).unwrap()
}

/// Base URL nothing listens on.
const DEAD_BASE: &str = "http://127.0.0.1:9/api";

// =============================================================================
// login
// =============================================================================

#[tokio::test]
async fn login_stores_tokens_and_user() {
    let (_, base) = spawn_backend().await;
    let client = client_for(&base);
    let outcome = client.login(USER_EMAIL, USER_PASSWORD).await;
    assert!(outcome.success, "{outcome:?}");
    let user = outcome.data.flatten().unwrap();
    assert_eq!(user.email, USER_EMAIL);
    assert!(client.store().has_session());
    assert_eq!(client.store().user().unwrap().email, USER_EMAIL);
}

#[tokio::test]
async fn login_trims_email() {
    let (_, base) = spawn_backend().await;
    let client = client_for(&base);
    let outcome = client.login(&format!("  {USER_EMAIL} "), USER_PASSWORD).await;
    assert!(outcome.success);
}

#[tokio::test]
async fn login_bad_credentials_reports_server_message() {
    let (_, base) = spawn_backend().await;
    let client = client_for(&base);
    let outcome = client.login(USER_EMAIL, "wrong").await;
    assert!(!outcome.success);
    assert_eq!(outcome.message.as_deref(), Some("Invalid email or password"));
    assert_eq!(outcome.error, Some(ErrorKind::ValidationFailure));
    assert!(!client.store().has_session());
}

#[tokio::test]
async fn login_unreachable_is_network_failure() {
    let client = client_for(DEAD_BASE);
    let outcome = client.login(USER_EMAIL, USER_PASSWORD).await;
    assert!(!outcome.success);
    assert_eq!(outcome.error, Some(ErrorKind::NetworkFailure));
}

// =============================================================================
// register
// =============================================================================

#[tokio::test]
async fn register_without_tokens_does_not_sign_in() {
    let (_, base) = spawn_backend().await;
    let client = client_for(&base);
    let outcome = client.register("fresh@x.io", "fresh", "secret1").await;
    assert!(outcome.success, "{outcome:?}");
    let registration = outcome.data.unwrap();
    assert!(registration.user_id.is_some());
    assert!(!registration.session_established);
    assert!(!client.store().has_session());
}

#[tokio::test]
async fn register_duplicate_fails_with_message() {
    let (_, base) = spawn_backend().await;
    let client = client_for(&base);
    let outcome = client.register(USER_EMAIL, "dup", "secret1").await;
    assert!(!outcome.success);
    assert_eq!(outcome.message.as_deref(), Some("An account with this email already exists"));
}

// =============================================================================
// profile
// =============================================================================

#[tokio::test]
async fn profile_without_session_skips_network() {
    let client = client_for(DEAD_BASE);
    let outcome = client.get_user_profile().await;
    assert!(outcome.is_unauthorized());
    assert_eq!(outcome.message.as_deref(), Some("Not authenticated"));
}

#[tokio::test]
async fn profile_reports_admin_role() {
    let (_, base) = spawn_backend().await;
    let client = client_for(&base);
    assert!(client.login(ADMIN_EMAIL, ADMIN_PASSWORD).await.success);
    let profile = client.get_user_profile().await.data.unwrap();
    assert!(profile.is_admin());
    assert_eq!(profile.email, ADMIN_EMAIL);
}

#[tokio::test]
async fn profile_with_revoked_token_clears_store() {
    let (state, base) = spawn_backend().await;
    let client = client_for(&base);
    assert!(client.login(USER_EMAIL, USER_PASSWORD).await.success);
    let access = client.store().get().unwrap().access_token;
    state.logout(&access).await;

    let outcome = client.get_user_profile().await;
    assert!(outcome.is_unauthorized());
    assert!(!client.store().has_session());
    assert!(client.store().user().is_none());
}

// =============================================================================
// logout
// =============================================================================

#[tokio::test]
async fn logout_revokes_server_session_and_clears_store() {
    let (state, base) = spawn_backend().await;
    let client = client_for(&base);
    assert!(client.login(USER_EMAIL, USER_PASSWORD).await.success);
    assert_eq!(state.active_sessions().await, 1);

    assert!(client.logout().await.success);
    assert!(!client.store().has_session());
    assert_eq!(state.active_sessions().await, 0);
}

#[tokio::test]
async fn logout_clears_store_when_server_unreachable() {
    let config = ClientConfig { api_base_url: DEAD_BASE.into(), ..ClientConfig::default() };
    let store: crate::session::SharedTokenStore = Arc::new(MemoryTokenStore::with_tokens(TokenPair {
        access_token: "a".into(),
        refresh_token: "r".into(),
    }));
    let client = AuthClient::new(&config, store).unwrap();
    let outcome = client.logout().await;
    assert!(outcome.success);
    assert!(!client.store().has_session());
}

#[tokio::test]
async fn logout_twice_is_harmless() {
    let client = client_for(DEAD_BASE);
    assert!(client.logout().await.success);
    assert!(client.logout().await.success);
}

// =============================================================================
// refresh
// =============================================================================

#[tokio::test]
async fn refresh_rotates_access_token_and_keeps_refresh_token() {
    let (_, base) = spawn_backend().await;
    let client = client_for(&base);
    assert!(client.login(USER_EMAIL, USER_PASSWORD).await.success);
    let before = client.store().get().unwrap();

    let outcome = client.refresh_session().await;
    assert!(outcome.success, "{outcome:?}");
    let after = client.store().get().unwrap();
    assert_ne!(after.access_token, before.access_token);
    assert_eq!(after.refresh_token, before.refresh_token);
    assert!(client.get_user_profile().await.success);
}

#[tokio::test]
async fn refresh_without_session_is_unauthorized() {
    let client = client_for(DEAD_BASE);
    let outcome = client.refresh_session().await;
    assert!(outcome.is_unauthorized());
    assert_eq!(outcome.message.as_deref(), Some("No refresh token"));
}

#[test]
fn rejected_uses_fallback_for_blank_message() {
    let err = rejected(Some(String::new()), "Login failed");
    assert_eq!(err.to_string(), "Login failed");
    assert_eq!(err.kind(), ErrorKind::ValidationFailure);
}
