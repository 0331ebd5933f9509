use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use climate_dashboard_api::{
    app, auth,
    cli::{Cli, Commands},
    config::{self, StorageBackend},
    is_development, AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up JWT_SECRET, DATABASE_URL, etc.
    let _ = dotenvy::dotenv();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match Cli::parse().command() {
        Commands::Serve {
            port,
            storage,
            no_seed,
        } => serve(port, storage, no_seed).await,
        Commands::HashPassword { password } => {
            println!("{}", auth::hash_password(&password)?);
            Ok(())
        }
    }
}

async fn serve(port: Option<u16>, storage: Option<StorageBackend>, no_seed: bool) -> anyhow::Result<()> {
    let mut config = config::config().clone();
    if let Some(port) = port {
        config.server.port = port;
    }
    if let Some(storage) = storage {
        config.storage.backend = storage;
    }
    if no_seed {
        config.storage.seed = false;
    }
    config.validate().context("invalid configuration")?;

    info!("Starting Climate Dashboard API in {:?} mode", config.environment);
    if is_development!() && std::env::var("JWT_SECRET").is_err() {
        info!("Using the built-in development JWT secret");
    }

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::build(config).await.context("failed to open storage")?;

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("Climate Dashboard API listening on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutdown signal received");
}
