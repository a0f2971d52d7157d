use cyberguard::backend::{self, BackendState};
use cyberguard::config::BackendConfig;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = BackendConfig::from_env().expect("invalid backend configuration");
    if config.admin_password.is_none() {
        tracing::warn!("ADMIN_PASSWORD not set, no admin account seeded");
    }

    let state = BackendState::from_config(&config).await;
    let app = backend::app(state, &config.frontend_url);

    let port = config.port;
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, frontend = %config.frontend_url, "cyberguard stub backend listening");
    axum::serve(listener, app).await.expect("server failed");
}
