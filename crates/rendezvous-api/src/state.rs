//! Shared application state for the API server.
//!
//! [`AppState`] wraps the [`DataService`] every handler works against. It is
//! built once at startup and injected via Axum's `State` extractor inside an
//! [`Arc`](std::sync::Arc).

use rendezvous_store::DataService;

/// Shared state for the Axum application.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    /// The data service holding every record and the notification bus.
    pub service: DataService,
}

impl AppState {
    /// Create application state around an existing service.
    pub const fn new(service: DataService) -> Self {
        Self { service }
    }
}
