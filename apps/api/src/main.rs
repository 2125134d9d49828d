//! # Shopkeep API Server
//!
//! REST server for the shop-management backend.
//!
//! ## Startup
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  tracing init ──► config (env) ──► SQLite pool + migrations            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Router (AppState injected) ──► axum::serve, graceful shutdown on      │
//! │                                 ctrl-c / SIGTERM                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;

use tracing::info;
use tracing_subscriber::EnvFilter;

use shopkeep_api::{router, ApiConfig, AppState};
use shopkeep_db::{Database, DbConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_target(true)
        .init();

    info!("Starting Shopkeep API server...");

    let config = ApiConfig::load()?;
    info!(
        port = config.http_port,
        db = %config.database_path,
        "Configuration loaded"
    );

    let db_config = DbConfig::new(&config.database_path)
        .max_connections(config.db_max_connections);
    let db = Database::new(db_config).await?;
    info!("Database ready");

    let state = AppState::new(db.clone(), config.clone());
    let app = router(state);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.http_port).parse()?;
    info!(%addr, "Starting HTTP server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if tokio::signal::ctrl_c().await.is_err() {
            tracing::error!("Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => {
                tracing::error!("Failed to install SIGTERM handler");
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

    info!("Shutdown signal received, starting graceful shutdown...");
}
