//! Warden Server: cookie-session authentication service.
//!
//! Main entry point that wires all crates together and starts the server.

use tracing_subscriber::{EnvFilter, fmt};

use warden_api::{AppState, build_app};
use warden_auth::SessionCleanup;
use warden_core::config::AppConfig;
use warden_core::error::AppError;
use warden_store::StoreManager;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Load configuration from `config/` and `WARDEN__*` environment variables
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("WARDEN_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting Warden");

    // ── Step 1: Initialize stores ────────────────────────────────
    tracing::info!(provider = %config.store.provider, "Initializing stores");
    let stores = StoreManager::new(&config).await?;

    // ── Step 2: Start background cleanup ─────────────────────────
    let cleanup = SessionCleanup::new(stores.sessions(), stores.reset_tokens())
        .spawn(config.session.cleanup_interval());

    // ── Step 3: Build application ────────────────────────────────
    let addr = config.server.bind_addr();
    let state = AppState::new(config, &stores)?;
    let app = build_app(state);

    // ── Step 4: Serve ────────────────────────────────────────────
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cleanup.abort();
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
