//! WebShareX Server: room-based file sharing over an object store.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

use websharex_core::config::AppConfig;
use websharex_core::error::AppError;
use websharex_service::{ReconcileScheduler, ReconcileService, ServiceContext, ServiceSettings};

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

/// Load `config/default.toml`, the `WEBSHAREX_ENV` overlay, and environment
/// variables.
fn load_configuration() -> Result<AppConfig, AppError> {
    let dir = std::env::var("WEBSHAREX_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());
    let env = std::env::var("WEBSHAREX_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load_from(&dir, &env)
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
                .with_thread_ids(true)
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
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting WebShareX");

    // ── Step 1: Room store ───────────────────────────────────────
    let store = websharex_database::connect_room_store(&config.database).await?;

    // ── Step 2: Object store ─────────────────────────────────────
    let storage = websharex_storage::build_provider(&config.storage).await?;

    // ── Step 3: Services ─────────────────────────────────────────
    let ctx = Arc::new(ServiceContext::new(
        store,
        storage,
        ServiceSettings::from_config(&config),
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // ── Step 4: Background reconciliation ────────────────────────
    let scheduler = ReconcileScheduler::new(
        ReconcileService::new(Arc::clone(&ctx)),
        Duration::from_secs(config.sync.interval_seconds),
    );
    let scheduler_handle = tokio::spawn(async move { scheduler.run(shutdown_rx).await });

    // ── Step 5: HTTP server ──────────────────────────────────────
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let app = websharex_api::build_app(websharex_api::AppState::new(config, ctx));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;
    tracing::info!(addr = %addr, "WebShareX server listening");

    // ── Step 6: Graceful shutdown ────────────────────────────────
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, starting graceful shutdown...");
            let _ = shutdown_tx.send(true);
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    let _ = tokio::time::timeout(Duration::from_secs(30), scheduler_handle).await;
    tracing::info!("WebShareX server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
