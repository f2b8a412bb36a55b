//! `WebSocket` subscriptions to creation notifications.
//!
//! Clients connect to `GET /ws/{topic}` (optionally `?user_id=...` on
//! `event-created` and `participant-added`) and receive one JSON text frame
//! per matching notification:
//!
//! ```json
//! { "topic": "event-created", "published_at": "...", "payload": { ... } }
//! ```
//!
//! The subscription is registered before the upgrade completes and is
//! dropped, which unregisters it, as soon as the client disconnects.

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Path, Query, State, WebSocketUpgrade};
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use rendezvous_store::Subscription;
use rendezvous_types::{Notification, Topic, UserId};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::state::AppState;

/// Query parameters for `GET /ws/{topic}`.
#[derive(Debug, Default, Deserialize)]
pub struct SubscribeQuery {
    /// Only deliver notifications concerning this user.
    pub user_id: Option<String>,
}

/// One notification as sent to a client.
#[derive(Debug, Serialize)]
pub struct Frame<'a> {
    /// The notification, contributing its `topic` and `payload` fields.
    #[serde(flatten)]
    pub notification: &'a Notification,
    /// When the frame was produced.
    pub published_at: DateTime<Utc>,
}

impl<'a> Frame<'a> {
    /// Stamp `notification` with the current time.
    pub fn now(notification: &'a Notification) -> Self {
        Self {
            notification,
            published_at: Utc::now(),
        }
    }
}

/// Validate the topic and filter, register the subscription, and upgrade
/// the connection.
///
/// # Route
///
/// `GET /ws/{topic}`
#[allow(clippy::unused_async)]
pub async fn subscribe(
    State(state): State<Arc<AppState>>,
    Path(topic): Path<String>,
    query: Result<Query<SubscribeQuery>, QueryRejection>,
    upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Result<Response, ApiError> {
    let topic: Topic = topic.parse()?;
    let Query(query) = query?;
    let filter = query
        .user_id
        .filter(|user_id| !user_id.is_empty())
        .map(UserId::new);
    if filter.is_some() && !topic.accepts_user_filter() {
        return Err(ApiError::BadRequest(format!(
            "{topic} does not accept a user_id filter"
        )));
    }

    let upgrade = match upgrade {
        Ok(upgrade) => upgrade,
        Err(rejection) => return Ok(rejection.into_response()),
    };

    let subscription = state.service.subscribe(topic, filter);
    Ok(upgrade.on_upgrade(move |socket| forward(socket, subscription)))
}

/// Handle the `WebSocket` lifecycle: forward each matching notification as
/// a text frame until either side goes away.
async fn forward(mut socket: WebSocket, mut subscription: Subscription) {
    let topic = subscription.topic();
    debug!(%topic, filter = ?subscription.filter(), "WebSocket subscriber connected");

    loop {
        tokio::select! {
            notification = subscription.next() => {
                let Some(notification) = notification else {
                    debug!(%topic, "notification bus closed, shutting down WebSocket");
                    return;
                };
                let json = match serde_json::to_string(&Frame::now(&notification)) {
                    Ok(json) => json,
                    Err(e) => {
                        warn!("Failed to serialize notification frame: {e}");
                        continue;
                    }
                };
                if socket.send(Message::Text(json.into())).await.is_err() {
                    debug!(%topic, "WebSocket subscriber disconnected (send failed)");
                    return;
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!(%topic, "WebSocket subscriber disconnected");
                        return;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            debug!(%topic, "WebSocket subscriber disconnected (pong failed)");
                            return;
                        }
                    }
                    Some(Err(e)) => {
                        debug!(%topic, "WebSocket error: {e}");
                        return;
                    }
                    // Clients have nothing to say on a subscription.
                    _ => {}
                }
            }
        }
    }
}
