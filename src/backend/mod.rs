//! Stub auth backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! A small Axum service that speaks the same `/api/auth/*` contract the
//! console's auth client expects. It exists so the client and shell can be
//! exercised end to end without the real detection service, and it backs
//! the crate's own integration tests.
//!
//! The router is built from a [`BackendState`] so callers can seed accounts
//! before serving.

pub mod routes;
pub mod state;

pub use state::{AuthFailure, BackendState};

use axum::Router;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the stub backend router.
///
/// CORS admits `frontend_url` only; an unparseable origin falls back to
/// allowing any origin, with a warning.
pub fn app(state: BackendState, frontend_url: &str) -> Router {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    let cors = match HeaderValue::from_str(frontend_url) {
        Ok(origin) => cors.allow_origin(origin),
        Err(e) => {
            tracing::warn!(frontend_url, error = %e, "invalid frontend origin, allowing any");
            cors.allow_origin(Any)
        }
    };

    Router::new()
        .route("/health", get(routes::health))
        .route("/api/auth/login", post(routes::login))
        .route("/api/auth/register", post(routes::register))
        .route("/api/auth/profile", get(routes::profile))
        .route("/api/auth/logout", post(routes::logout))
        .route("/api/auth/refresh", post(routes::refresh))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
