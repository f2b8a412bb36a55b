//! Server binary for the Rendezvous data service.
//!
//! Wires configuration, logging, the seeded in-memory store, and the HTTP
//! server together, then serves until `Ctrl-C`.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `rendezvous-config.yaml` (or the path in
//!    `RENDEZVOUS_CONFIG`), falling back to defaults
//! 2. Initialize structured logging (tracing)
//! 3. Load the seed dataset, if configured, and build the data service
//! 4. Bind and serve until a shutdown signal, then drain in-flight requests

mod bootstrap;
mod error;

use std::path::PathBuf;
use std::sync::Arc;

use rendezvous_api::config::DEFAULT_CONFIG_PATH;
use rendezvous_api::{AppState, ServiceConfig, shutdown_signal, start_server};
use tracing::info;

use crate::error::StartupError;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, seed loading, or the server fails.
#[tokio::main]
async fn main() -> Result<(), StartupError> {
    // 1. Load configuration.
    let config_path = std::env::var("RENDEZVOUS_CONFIG")
        .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    let config = ServiceConfig::load_or_default(&config_path)?;

    // 2. Initialize structured logging.
    bootstrap::init_logging(&config);
    info!(
        config = %config_path.display(),
        host = config.server.host,
        port = config.server.port,
        id_strategy = ?config.store.id_strategy,
        channel_capacity = config.notifications.channel_capacity,
        "rendezvous-server starting"
    );

    // 3. Build the data service.
    let service = bootstrap::build_service(&config)?;
    let state = Arc::new(AppState::new(service));

    // 4. Serve.
    start_server(&config.server, state, shutdown_signal()).await?;

    info!("rendezvous-server shutdown complete");
    Ok(())
}
