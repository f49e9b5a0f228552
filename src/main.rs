use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod admin;
mod api;
mod app;
mod auth;
mod config;
mod db;
mod device_api;
mod error;
mod model;
mod notify;
mod state;
mod storage;
mod traps;
mod ws;

use config::Config;
use db::DBLayer;
use notify::NotificationHub;
use state::AppState;
use storage::StorageService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------
    // Logging
    // -----------------------------
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    // -----------------------------
    // Shared state / Dependencies
    // -----------------------------
    let db = Arc::new(DBLayer::new(&config.db_path)?);
    let storage = StorageService::new(&config.storage_dir).await?;

    let pruned = db
        .prune_revoked_tokens(chrono::Utc::now().timestamp())
        .await?;
    info!(pruned, "expired token revocations removed");

    if let Some(email) = config.admin_email.as_deref() {
        admin::bootstrap::ensure_admin(&db, email).await?;
    }

    let state = AppState {
        db,
        hub: Arc::new(NotificationHub::new()),
        storage,
        jwt_secret: config.jwt_secret.clone(),
        token_ttl_secs: config.token_ttl_secs,
    };

    let app = app::build_router(state);

    info!(addr = config.addr.as_str(), db = config.db_path.as_str(), "trapwatch listening");
    info!("device API at /search_connect and /update_status, push at /ws");

    let listener = TcpListener::bind(&config.addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
