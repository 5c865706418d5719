//! # Kasir Server
//!
//! HTTP front end for the POS engine.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Kasir Server                                   │
//! │                                                                         │
//! │  Client ───► axum Router ───► Pos engine ───► SQLite                    │
//! │                   │                                                     │
//! │                   └── identity from x-actor-id / x-actor-role headers   │
//! │                       (verified upstream by the gateway)                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod auth;
mod config;
mod error;
mod routes;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use kasir_db::{Database, DbConfig};
use kasir_engine::Pos;

use crate::config::ServerConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,kasir_db=debug,kasir_engine=debug,sqlx=warn".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    info!("Starting kasir server...");

    let config = ServerConfig::load()?;
    info!(
        listen_addr = %config.listen_addr,
        database_path = %config.database_path,
        invoice_prefix = %config.invoice_prefix,
        "Configuration loaded"
    );

    let db = Database::new(DbConfig::new(&config.database_path)).await?;
    info!("Database ready, migrations applied");

    let pos = Pos::new(db, config.store_settings());
    let app = routes::router(pos);

    let listener = TcpListener::bind(config.listen_addr).await?;
    info!(addr = %config.listen_addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
