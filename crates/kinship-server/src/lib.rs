//! Kinship Server
//!
//! JSON API for building, editing and sharing family trees. Connections
//! shown in the editor are inferred from member relations on every load.

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod handlers;

use config::ServerConfig;
use handlers::{create_router, AppState};
use kinship_store::{SqliteStore, StoreError};
use tokio::net::TcpListener;
use tracing::info;

/// Server error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Database could not be opened
    #[error("Failed to open store: {0}")]
    Store(#[from] StoreError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Start the HTTP server
///
/// Opens the store, builds the application state and serves until Ctrl-C.
/// The caller is responsible for installing a tracing subscriber.
pub async fn start_server(config: ServerConfig) -> Result<(), ServerError> {
    config.validate()?;

    info!("Starting Kinship server");
    info!("Bind address: {}", config.bind_addr());
    info!("Database: {}", config.database_path);
    info!("Share base URL: {}", config.base_url);

    let store = SqliteStore::new(&config.database_path)?;
    let bind_addr = config.bind_addr();
    let state = AppState::new(store, config);
    info!("Relations loaded: {}", state.taxonomy.len());

    let app = create_router(state);

    let listener = TcpListener::bind(&bind_addr).await?;
    info!("Server listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ServerError::Server(e.to_string()))?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
