//! HTTP server lifecycle management.
//!
//! Provides [`start_server`] which binds to the configured address and runs
//! the Axum server until the supplied shutdown future resolves, and
//! [`shutdown_signal`] which resolves on `Ctrl-C`.

use std::future::Future;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::router::build_router;
use crate::state::AppState;

/// Errors that can occur when starting or running the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Failed to bind to the network address.
    #[error("bind failed on {address}: {source}")]
    Bind {
        /// The `host:port` that could not be bound.
        address: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The server encountered a fatal error while serving.
    #[error("serve error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Bind the listener described by `config`.
///
/// Host names are resolved, so `localhost` works as well as an IP address.
///
/// # Errors
///
/// Returns [`ServerError::Bind`] if the address cannot be bound.
pub async fn bind(config: &ServerConfig) -> Result<TcpListener, ServerError> {
    TcpListener::bind((config.host.as_str(), config.port))
        .await
        .map_err(|source| ServerError::Bind {
            address: format!("{}:{}", config.host, config.port),
            source,
        })
}

/// Serve requests on `listener` until `shutdown` resolves, then finish
/// in-flight requests and return.
///
/// # Errors
///
/// Returns [`ServerError::Serve`] if the server hits a fatal I/O error.
pub async fn serve(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), ServerError> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "Rendezvous server listening");
    }

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Rendezvous server stopped");
    Ok(())
}

/// Bind to the configured address and serve until `shutdown` resolves.
///
/// # Errors
///
/// Returns an error if the listener cannot bind or the server encounters a
/// fatal I/O error.
pub async fn start_server(
    config: &ServerConfig,
    state: Arc<AppState>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), ServerError> {
    let listener = bind(config).await?;
    serve(listener, state, shutdown).await
}

/// Resolve when the process receives `Ctrl-C`.
///
/// If the signal handler cannot be installed the future never resolves and
/// the server runs until it is killed.
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
