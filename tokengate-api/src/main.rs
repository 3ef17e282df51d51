//! # Tokengate API Server
//!
//! Issues JWTs at the login path and verifies them on every other request.
//!
//! ## Usage
//!
//! ```bash
//! TOKENGATE_JWT__PASSPHRASE=$(openssl rand -hex 32) cargo run -p tokengate-api
//! ```

use std::net::SocketAddr;
use std::sync::Arc;
use tokengate_api::{
    app::{build_router, AppState},
    config::Config,
    telemetry,
};
use tokengate_shared::{
    auth::password::Argon2Hashing,
    models::user::{InMemoryUserStore, UserRecord},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;
    telemetry::init(config.api.json_logs);

    tracing::info!(
        "Tokengate API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let users = InMemoryUserStore::with_users(config.users.iter().cloned().map(UserRecord::from));
    if users.is_empty().await {
        tracing::warn!("No users seeded; only registration will succeed until one is created");
    } else {
        tracing::info!(count = users.len().await, "Seeded user store");
    }

    let bind_address = config.bind_address();
    let state = AppState::new(config, Arc::new(users), Arc::new(Argon2Hashing::default()))?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, exiting...");
}
