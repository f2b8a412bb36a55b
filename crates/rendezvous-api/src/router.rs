//! Axum router construction.
//!
//! Assembles all routes (REST, operation dispatch, `WebSocket`) into a
//! single [`Router`] with CORS and HTTP tracing middleware.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router.
///
/// The router includes:
/// - `GET /health` -- liveness and record counts
/// - `POST /api/operations` -- generic operation dispatch
/// - `GET|POST|DELETE /api/{kind}` -- list, create, delete-all
/// - `GET|PATCH|DELETE /api/{kind}/{id}` -- get, update, delete
/// - `GET /api/{kind}/{id}/{field}` -- relational fields such as
///   `/api/users/{id}/events` or `/api/participants/{id}/event`
/// - `GET /ws/{topic}` -- notification subscription
///
/// `{kind}` accepts `users`, `locations`, `events`, `participants` (or the
/// singular forms).
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        // Generic dispatch
        .route("/api/operations", post(handlers::run_operation))
        // Collections
        .route(
            "/api/{kind}",
            get(handlers::list_records)
                .post(handlers::create_record)
                .delete(handlers::delete_all_records),
        )
        .route(
            "/api/{kind}/{id}",
            get(handlers::get_record)
                .patch(handlers::update_record)
                .delete(handlers::delete_record),
        )
        .route("/api/{kind}/{id}/{field}", get(handlers::get_relation))
        // Subscriptions
        .route("/ws/{topic}", get(ws::subscribe))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
