//! Network boundary for the Rendezvous data service.
//!
//! This crate exposes a [`DataService`](rendezvous_store::DataService)
//! over HTTP:
//!
//! - **REST endpoints** for every record kind (`/api/{kind}`,
//!   `/api/{kind}/{id}`) and for relational fields
//!   (`/api/{kind}/{id}/{field}`)
//! - **Operation dispatch** (`POST /api/operations`) taking
//!   `{kind, operation, id?, data?, include?}`
//! - **`WebSocket` subscriptions** (`/ws/{topic}?user_id=...`) streaming
//!   creation notifications
//! - **Configuration** loaded from `rendezvous-config.yaml` with
//!   environment overrides
//!
//! Errors are returned as `{"error": "...", "status": <code>}`.

pub mod config;
pub mod error;
pub mod handlers;
pub mod operation;
pub mod router;
pub mod server;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use config::{ConfigError, LogFormat, ServiceConfig};
pub use error::ApiError;
pub use operation::{Invocation, Operation, OperationOutput, OperationRequest, execute};
pub use router::build_router;
pub use server::{ServerError, shutdown_signal, start_server};
pub use state::AppState;
