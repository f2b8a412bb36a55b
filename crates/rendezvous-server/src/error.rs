//! Error types for the server binary.
//!
//! [`StartupError`] is the top-level error type that wraps every failure
//! mode between process start and clean shutdown.

/// Top-level error for the server binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: rendezvous_api::ConfigError,
    },

    /// The seed dataset could not be loaded.
    #[error("seed error: {source}")]
    Seed {
        /// The underlying store error.
        #[from]
        source: rendezvous_store::StoreError,
    },

    /// The HTTP server failed to bind or serve.
    #[error("server error: {source}")]
    Server {
        /// The underlying server error.
        #[from]
        source: rendezvous_api::ServerError,
    },
}
