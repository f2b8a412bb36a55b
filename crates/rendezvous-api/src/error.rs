//! Error types for the API layer.
//!
//! [`ApiError`] unifies every failure a request can hit into a single enum
//! that converts into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation. The body
//! is always `{"error": "...", "status": <code>}`.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rendezvous_store::StoreError;
use rendezvous_types::ParseNameError;
use tracing::error;

/// Errors that can occur while handling a request.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The named record does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The request named an unknown kind, topic, operation, or relation, or
    /// carried a payload of the wrong shape.
    #[error("{0}")]
    BadRequest(String),

    /// A response could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The store failed in a way the caller cannot fix.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// The HTTP status this error maps to.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Serialization(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Build a [`ApiError::BadRequest`] for a payload that failed to
    /// deserialize.
    pub fn invalid_payload(err: &serde_json::Error) -> Self {
        Self::BadRequest(format!("invalid payload: {err}"))
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        if err.is_not_found() {
            Self::NotFound(err.to_string())
        } else {
            Self::Internal(err.to_string())
        }
    }
}

impl From<ParseNameError> for ApiError {
    fn from(err: ParseNameError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }

        let body = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use rendezvous_types::{Event, EventId};

    use super::*;

    #[test]
    fn not_found_keeps_the_store_message() {
        let err = ApiError::from(StoreError::not_found::<Event>(&EventId::new("e1")));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Event not found");
    }

    #[test]
    fn unknown_names_are_bad_requests() {
        let err = ApiError::from(ParseNameError::UnknownTopic(String::from("nope")));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "unknown topic: nope");
    }

    #[test]
    fn exhausted_ids_are_internal() {
        let err = ApiError::from(StoreError::IdExhausted {
            kind: rendezvous_types::EntityKind::User,
            attempts: 64,
        });
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
