//! Integration tests for the REST and operation endpoints.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server. Each test builds a fresh service with sequential
//! identifiers so responses are predictable.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use rendezvous_api::router::build_router;
use rendezvous_api::state::AppState;
use rendezvous_store::{DataService, EntityStore, NotificationBus, SequentialGenerator};
use rendezvous_types::{Notification, Topic, User, UserId};
use serde_json::{Value, json};
use tower::ServiceExt;

fn make_service() -> DataService {
    DataService::new(
        EntityStore::new(),
        Arc::new(SequentialGenerator::new()),
        NotificationBus::default(),
    )
}

fn make_app(service: &DataService) -> Router {
    build_router(Arc::new(AppState::new(service.clone())))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn send_raw(app: &Router, method: &str, uri: &str, body: &'static str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn create_ann(app: &Router) -> Value {
    let (status, user) = send(
        app,
        "POST",
        "/api/users",
        Some(json!({ "username": "ann", "email": "ann@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    user
}

fn standup(user_id: &str) -> Value {
    json!({
        "title": "standup",
        "desc": "daily",
        "date": "2024-05-01",
        "from": "09:00",
        "to": "09:15",
        "user_id": user_id,
    })
}

#[tokio::test]
async fn health_reports_counts() {
    let service = make_service();
    let app = make_app(&service);
    create_ann(&app).await;

    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["records"]["users"], 1);
    assert_eq!(body["records"]["events"], 0);
}

#[tokio::test]
async fn create_list_get_round_trip() {
    let service = make_service();
    let app = make_app(&service);

    let user = create_ann(&app).await;
    assert_eq!(user["id"], "u1");
    assert_eq!(user["username"], "ann");

    let (status, users) = send(&app, "GET", "/api/users", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(users, json!([user.clone()]));

    let (status, fetched) = send(&app, "GET", "/api/users/u1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, user);
}

#[tokio::test]
async fn get_of_unknown_id_is_null() {
    let service = make_service();
    let app = make_app(&service);

    let (status, body) = send(&app, "GET", "/api/locations/nowhere", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Null);
}

#[tokio::test]
async fn patch_merges_supplied_fields() {
    let service = make_service();
    let app = make_app(&service);
    create_ann(&app).await;

    let (status, updated) = send(
        &app,
        "PATCH",
        "/api/users/u1",
        Some(json!({ "email": "ann@new.example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["username"], "ann");
    assert_eq!(updated["email"], "ann@new.example.com");
}

#[tokio::test]
async fn patch_with_null_clears_event_location() {
    let service = make_service();
    let app = make_app(&service);
    let (_, location) = send(
        &app,
        "POST",
        "/api/locations",
        Some(json!({ "name": "Hall", "desc": "Main hall", "lat": 41.0, "lng": 29.0 })),
    )
    .await;
    let mut event = standup("u1");
    event["location_id"] = location["id"].clone();
    let (_, event) = send(&app, "POST", "/api/events", Some(event)).await;
    assert_eq!(event["location_id"], "l1");

    let (status, updated) = send(
        &app,
        "PATCH",
        "/api/events/e1",
        Some(json!({ "location_id": null })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["location_id"], Value::Null);
    assert_eq!(updated["user_id"], "u1");
}

#[tokio::test]
async fn update_and_delete_of_unknown_id_are_404() {
    let service = make_service();
    let app = make_app(&service);

    let (status, body) = send(
        &app,
        "PATCH",
        "/api/events/e404",
        Some(json!({ "title": "nothing" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Event not found");
    assert_eq!(body["status"], 404);

    let (status, body) = send(&app, "DELETE", "/api/participants/p404", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Participant not found");
}

#[tokio::test]
async fn delete_removes_exactly_one_record() {
    let service = make_service();
    let app = make_app(&service);
    create_ann(&app).await;
    create_ann(&app).await;

    let (status, removed) = send(&app, "DELETE", "/api/users/u1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(removed["id"], "u1");

    let (_, users) = send(&app, "GET", "/api/users", None).await;
    assert_eq!(users.as_array().unwrap().len(), 1);
    assert_eq!(users[0]["id"], "u2");
}

#[tokio::test]
async fn delete_all_returns_count() {
    let service = make_service();
    let app = make_app(&service);
    create_ann(&app).await;
    create_ann(&app).await;

    let (status, body) = send(&app, "DELETE", "/api/users", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "count": 2 }));

    let (_, body) = send(&app, "DELETE", "/api/users", None).await;
    assert_eq!(body, json!({ "count": 0 }));
}

#[tokio::test]
async fn unknown_kind_is_400() {
    let service = make_service();
    let app = make_app(&service);

    let (status, body) = send(&app, "GET", "/api/venues", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "unknown entity kind: venues");
}

#[tokio::test]
async fn create_with_missing_field_is_400() {
    let service = make_service();
    let app = make_app(&service);

    let (status, body) = send(
        &app,
        "POST",
        "/api/participants",
        Some(json!({ "user_id": "u1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("event_id"));
}

#[tokio::test]
async fn relation_routes_follow_foreign_keys() {
    let service = make_service();
    let app = make_app(&service);
    create_ann(&app).await;
    send(&app, "POST", "/api/events", Some(standup("u1"))).await;
    send(
        &app,
        "POST",
        "/api/participants",
        Some(json!({ "user_id": "u1", "event_id": "e1" })),
    )
    .await;

    let (status, events) = send(&app, "GET", "/api/users/u1/events", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(events[0]["title"], "standup");

    let (_, owner) = send(&app, "GET", "/api/events/e1/user", None).await;
    assert_eq!(owner["username"], "ann");

    let (_, location) = send(&app, "GET", "/api/events/e1/location", None).await;
    assert_eq!(location, Value::Null);

    let (_, participants) = send(&app, "GET", "/api/events/e1/participants", None).await;
    assert_eq!(participants[0]["id"], "p1");

    let (_, event) = send(&app, "GET", "/api/participants/p1/event", None).await;
    assert_eq!(event["id"], "e1");

    let (status, _) = send(&app, "GET", "/api/locations/l1/events", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "GET", "/api/locations/l1/user", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn include_embeds_relations_in_list() {
    let service = make_service();
    let app = make_app(&service);
    create_ann(&app).await;
    send(&app, "POST", "/api/events", Some(standup("u1"))).await;

    let (status, users) = send(&app, "GET", "/api/users?include=events", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(users[0]["events"][0]["id"], "e1");

    let (status, _) = send(&app, "GET", "/api/users?include=location", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn operations_endpoint_dispatches() {
    let service = make_service();
    let app = make_app(&service);

    let (status, user) = send(
        &app,
        "POST",
        "/api/operations",
        Some(json!({
            "kind": "users",
            "operation": "create",
            "data": { "username": "ann", "email": "ann@example.com" },
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["id"], "u1");

    let (_, fetched) = send(
        &app,
        "POST",
        "/api/operations",
        Some(json!({ "kind": "user", "operation": "get", "id": "u1", "include": ["events"] })),
    )
    .await;
    assert_eq!(fetched["username"], "ann");
    assert_eq!(fetched["events"], json!([]));

    let (status, body) = send(
        &app,
        "POST",
        "/api/operations",
        Some(json!({ "kind": "users", "operation": "delete", "id": "u9" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");
}

#[tokio::test]
async fn created_event_is_published_to_filtered_subscribers() {
    let service = make_service();
    let app = make_app(&service);
    let mut for_u1 = service.subscribe(Topic::EventCreated, Some(UserId::new("u1")));
    let mut for_u2 = service.subscribe(Topic::EventCreated, Some(UserId::new("u2")));

    create_ann(&app).await;
    let (_, event) = send(&app, "POST", "/api/events", Some(standup("u1"))).await;

    let expected = Notification::EventCreated(serde_json::from_value(event).unwrap());
    assert_eq!(for_u1.try_next(), Some(expected));
    assert!(for_u2.try_next().is_none());
}

#[tokio::test]
async fn subscription_rejects_unknown_topic_and_user_filter_on_user_created() {
    let service = make_service();
    let app = make_app(&service);

    let (status, body) = send(&app, "GET", "/ws/user-deleted", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "unknown topic: user-deleted");

    let (status, body) = send(&app, "GET", "/ws/user-created?user_id=u1", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "user-created does not accept a user_id filter");
}

#[tokio::test]
async fn malformed_json_body_is_a_json_bad_request() {
    let service = make_service();
    let app = make_app(&service);

    for (method, uri) in [
        ("POST", "/api/users"),
        ("PATCH", "/api/users/u1"),
        ("POST", "/api/operations"),
    ] {
        let (status, body) = send_raw(&app, method, uri, "{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{method} {uri}");
        assert_eq!(body["status"], 400, "{method} {uri}");
        assert!(body["error"].is_string(), "{method} {uri}");
    }
    assert_eq!(service.store().count::<User>().await, 0);
}

#[tokio::test]
async fn operations_endpoint_rejects_unknown_operation_and_missing_kind() {
    let service = make_service();
    let app = make_app(&service);

    let (status, body) = send(
        &app,
        "POST",
        "/api/operations",
        Some(json!({ "kind": "users", "operation": "frobnicate" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .starts_with("invalid payload:")
    );

    let (status, body) = send(
        &app,
        "POST",
        "/api/operations",
        Some(json!({ "operation": "list" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
}
