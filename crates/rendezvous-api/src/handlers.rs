//! REST endpoint handlers.
//!
//! Each handler parses its path and query into an [`Invocation`] and hands
//! it to [`operation::execute`], so REST and `POST /api/operations` share
//! one code path. Body and query extraction failures are taken as
//! `Result`s and reported as [`ApiError::BadRequest`], so every error
//! response carries the same JSON shape.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/health` | Liveness plus record counts |
//! | `POST` | `/api/operations` | Generic operation dispatch |
//! | `GET` | `/api/{kind}` | List records (`?include=a,b`) |
//! | `POST` | `/api/{kind}` | Create a record |
//! | `DELETE` | `/api/{kind}` | Delete every record, returns `{"count": n}` |
//! | `GET` | `/api/{kind}/{id}` | One record or `null` |
//! | `PATCH` | `/api/{kind}/{id}` | Merge fields over a record |
//! | `DELETE` | `/api/{kind}/{id}` | Delete one record |
//! | `GET` | `/api/{kind}/{id}/{field}` | Resolve a relational field |

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use rendezvous_types::{EntityKind, Event, Location, Participant, User};
use serde::Deserialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::operation::{
    self, CreateInput, Invocation, Operation, OperationOutput, OperationRequest, UpdateInput,
};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query parameter structs
// ---------------------------------------------------------------------------

/// Query parameters accepted by record-returning endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct IncludeQuery {
    /// Comma-separated relational fields to embed (e.g. `events,participants`).
    pub include: Option<String>,
}

impl IncludeQuery {
    fn fields(&self) -> Vec<&str> {
        self.include
            .as_deref()
            .map(|list| list.split(',').filter(|field| !field.trim().is_empty()).collect())
            .unwrap_or_default()
    }
}

fn build_invocation(operation: Operation, query: &IncludeQuery) -> Result<Invocation, ApiError> {
    let include = operation::parse_include(operation.kind(), &query.fields())?;
    Ok(Invocation::new(operation).with_include(include))
}

// ---------------------------------------------------------------------------
// GET /health
// ---------------------------------------------------------------------------

/// Report liveness and the size of every collection.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    let store = state.service.store();
    Json(serde_json::json!({
        "status": "ok",
        "records": {
            "users": store.count::<User>().await,
            "locations": store.count::<Location>().await,
            "events": store.count::<Event>().await,
            "participants": store.count::<Participant>().await,
        },
    }))
}

// ---------------------------------------------------------------------------
// POST /api/operations
// ---------------------------------------------------------------------------

/// Execute an operation described in the request body.
pub async fn run_operation(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<OperationOutput>, ApiError> {
    let Json(body) = body?;
    let request: OperationRequest =
        serde_json::from_value(body).map_err(|err| ApiError::invalid_payload(&err))?;
    let invocation = request.into_invocation()?;
    let output = operation::execute(&state.service, invocation).await?;
    Ok(Json(output))
}

// ---------------------------------------------------------------------------
// /api/{kind}
// ---------------------------------------------------------------------------

/// List every record of a kind.
pub async fn list_records(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
    query: Result<Query<IncludeQuery>, QueryRejection>,
) -> Result<Json<OperationOutput>, ApiError> {
    let kind: EntityKind = kind.parse()?;
    let Query(query) = query?;
    let invocation = build_invocation(Operation::List(kind), &query)?;
    Ok(Json(operation::execute(&state.service, invocation).await?))
}

/// Create a record from the JSON body. Responds `201 Created`.
pub async fn create_record(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
    query: Result<Query<IncludeQuery>, QueryRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let kind: EntityKind = kind.parse()?;
    let Query(query) = query?;
    let Json(body) = body?;
    let input = CreateInput::parse(kind, body)?;
    let invocation = build_invocation(Operation::Create(input), &query)?;
    let output = operation::execute(&state.service, invocation).await?;
    Ok((StatusCode::CREATED, Json(output)))
}

/// Delete every record of a kind.
pub async fn delete_all_records(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
) -> Result<Json<OperationOutput>, ApiError> {
    let kind: EntityKind = kind.parse()?;
    let output =
        operation::execute(&state.service, Invocation::new(Operation::DeleteAll(kind))).await?;
    Ok(Json(output))
}

// ---------------------------------------------------------------------------
// /api/{kind}/{id}
// ---------------------------------------------------------------------------

/// Fetch one record; `null` if it does not exist.
pub async fn get_record(
    State(state): State<Arc<AppState>>,
    Path((kind, id)): Path<(String, String)>,
    query: Result<Query<IncludeQuery>, QueryRejection>,
) -> Result<Json<OperationOutput>, ApiError> {
    let kind: EntityKind = kind.parse()?;
    let Query(query) = query?;
    let invocation = build_invocation(Operation::Get(kind, id), &query)?;
    Ok(Json(operation::execute(&state.service, invocation).await?))
}

/// Merge the JSON body over an existing record.
pub async fn update_record(
    State(state): State<Arc<AppState>>,
    Path((kind, id)): Path<(String, String)>,
    query: Result<Query<IncludeQuery>, QueryRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<OperationOutput>, ApiError> {
    let kind: EntityKind = kind.parse()?;
    let Query(query) = query?;
    let Json(body) = body?;
    let patch = UpdateInput::parse(kind, body)?;
    let invocation = build_invocation(Operation::Update(id, patch), &query)?;
    Ok(Json(operation::execute(&state.service, invocation).await?))
}

/// Delete one record and return it.
pub async fn delete_record(
    State(state): State<Arc<AppState>>,
    Path((kind, id)): Path<(String, String)>,
) -> Result<Json<OperationOutput>, ApiError> {
    let kind: EntityKind = kind.parse()?;
    let output =
        operation::execute(&state.service, Invocation::new(Operation::Delete(kind, id))).await?;
    Ok(Json(output))
}

// ---------------------------------------------------------------------------
// /api/{kind}/{id}/{field}
// ---------------------------------------------------------------------------

/// Resolve one relational field of a record, e.g. `/api/events/e1/user`.
pub async fn get_relation(
    State(state): State<Arc<AppState>>,
    Path((kind, id, field)): Path<(String, String, String)>,
) -> Result<Json<Value>, ApiError> {
    let kind: EntityKind = kind.parse()?;
    let related = operation::resolve_field(&state.service, kind, id, &field).await?;
    Ok(Json(related))
}
