use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use home_inventory_api::config::config;
use home_inventory_api::database::DatabaseManager;
use home_inventory_api::services::WeChatIdentityProvider;
use home_inventory_api::{app, AppState};

#[derive(Parser)]
#[command(name = "home-inventory-api")]
#[command(about = "Household inventory backend API server")]
#[command(version)]
struct Args {
    #[arg(long, help = "Bind address (overrides API_HOST)")]
    host: Option<String>,

    #[arg(long, help = "Listen port (overrides API_PORT / PORT)")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, WECHAT_APP_ID, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("home_inventory_api=info,tower_http=info")),
        )
        .init();

    let args = Args::parse();

    // Initialize configuration (this loads the config singleton)
    let config = config();
    tracing::info!("Starting Home Inventory API in {:?} mode", config.environment);

    let db = DatabaseManager::connect(&config.database).context("failed to configure database pool")?;
    let identity = WeChatIdentityProvider::new(config.identity.clone())
        .context("failed to build identity client")?;
    if !config.identity.is_configured() {
        tracing::warn!("WECHAT_APP_ID/WECHAT_APP_SECRET unset; /api/user/getOpenId will fail");
    }

    let state = AppState::new(db.clone(), Arc::new(identity));

    let host = args.host.unwrap_or_else(|| config.api.host.clone());
    let port = args.port.unwrap_or(config.api.port);
    let bind_addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Home Inventory API listening on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    db.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
