mod common;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use common::test_router;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    user: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header("x-user-id", user);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn create_task(app: &Router, user: &str, target: i32) -> Value {
    let (status, task) = send(
        app,
        Method::POST,
        "/api/tasks",
        Some(user),
        Some(json!({
            "name": "Pushups",
            "category": "Fitness",
            "metricType": "count",
            "target": target,
            "intervalMinutes": 60
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    task
}

#[tokio::test]
async fn health_is_public() {
    let app = test_router();
    let (status, _) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn api_routes_require_a_user_header() {
    let app = test_router();
    let (status, body) = send(&app, Method::GET, "/api/tasks", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized - No user ID provided");
}

#[tokio::test]
async fn unknown_routes_are_not_found() {
    let app = test_router();
    let (status, _) = send(&app, Method::GET, "/api/nope", Some("alice"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn task_crud_is_scoped_to_the_caller() {
    let app = test_router();
    let task = create_task(&app, "alice", 30).await;
    let id = task["id"].as_str().unwrap().to_string();
    assert_eq!(task["streak"], 0);
    assert_eq!(task["metricType"], "count");
    assert_eq!(task["isInReplayMode"], false);

    let (status, listed) = send(&app, Method::GET, "/api/tasks", Some("alice"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, clock) = send(
        &app,
        Method::GET,
        &format!("/api/tasks/{id}/clock"),
        Some("alice"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(clock["isDue"], false);
    assert_eq!(clock["overdueMinutes"], 0);

    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/api/tasks/{id}"),
        Some("bob"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, updated) = send(
        &app,
        Method::PATCH,
        &format!("/api/tasks/{id}"),
        Some("alice"),
        Some(json!({ "name": "Squats", "target": 40 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Squats");
    assert_eq!(updated["target"], 40);

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/tasks/{id}"),
        Some("alice"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, listed) = send(&app, Method::GET, "/api/tasks", Some("alice"), None).await;
    assert!(listed.as_array().unwrap().is_empty());

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/check-ins",
        Some("alice"),
        Some(json!({ "taskId": id, "value": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_task_payloads_are_rejected() {
    let app = test_router();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/tasks",
        Some("alice"),
        Some(json!({
            "name": "Pushups",
            "category": "Fitness",
            "metricType": "distance",
            "target": 10,
            "intervalMinutes": 60
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/tasks",
        Some("alice"),
        Some(json!({
            "name": "Pushups",
            "category": "Fitness",
            "metricType": "count",
            "target": 10,
            "interval": 0
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn defeat_replay_and_recovery_over_http() {
    let app = test_router();
    let task = create_task(&app, "alice", 30).await;
    let id = task["id"].as_str().unwrap().to_string();

    let (status, defeat) = send(
        &app,
        Method::POST,
        "/api/check-ins",
        Some("alice"),
        Some(json!({ "taskId": id, "value": 0, "wasDefeat": true })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(defeat["task"]["streak"], 0);
    assert_eq!(defeat["checkIn"]["wasDefeat"], true);
    assert_eq!(defeat["replayOffer"]["originalTarget"], 30);
    assert_eq!(defeat["replayOffer"]["suggestedGoal"], 15);

    let (status, replaying) = send(
        &app,
        Method::POST,
        &format!("/api/tasks/{id}/replay"),
        Some("alice"),
        Some(json!({ "replayGoal": 15 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(replaying["isInReplayMode"], true);
    assert_eq!(replaying["target"], 15);
    assert_eq!(replaying["replayTarget"], 15);
    assert_eq!(replaying["originalTarget"], 30);

    let (status, recovered) = send(
        &app,
        Method::POST,
        "/api/check-ins",
        Some("alice"),
        Some(json!({ "taskId": id, "value": 15, "wasReplay": true, "replayGoal": 15 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(recovered["task"]["target"], 30);
    assert_eq!(recovered["task"]["streak"], 1);
    assert_eq!(recovered["task"]["isInReplayMode"], false);
    assert!(recovered["task"]["originalTarget"].is_null());
    assert_eq!(recovered["checkIn"]["replayGoal"], 15);
    assert!(recovered["replayOffer"].is_null());

    let (status, history) = send(
        &app,
        Method::GET,
        &format!("/api/tasks/{id}/check-ins"),
        Some("alice"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history.as_array().unwrap().len(), 2);

    let (_, everything) = send(&app, Method::GET, "/api/check-ins/all", Some("alice"), None).await;
    assert_eq!(everything.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn bad_check_ins_map_to_client_errors() {
    let app = test_router();
    let task = create_task(&app, "alice", 30).await;
    let id = task["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/check-ins",
        Some("alice"),
        Some(json!({ "taskId": id, "value": -1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/check-ins",
        Some("bob"),
        Some(json!({ "taskId": id, "value": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/api/tasks/{id}/replay"),
        Some("alice"),
        Some(json!({ "replayGoal": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, history) = send(
        &app,
        Method::GET,
        &format!("/api/tasks/{id}/check-ins"),
        Some("alice"),
        None,
    )
    .await;
    assert!(history.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn stats_and_activity_reflect_check_ins() {
    let app = test_router();
    let task = create_task(&app, "alice", 30).await;
    let id = task["id"].as_str().unwrap().to_string();

    for value in [10, 5] {
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/check-ins",
            Some("alice"),
            Some(json!({ "taskId": id, "value": value })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, stats) = send(
        &app,
        Method::GET,
        &format!("/api/tasks/{id}/stats"),
        Some("alice"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["todayTotal"], 15);
    assert_eq!(stats["weekTotal"], 15);
    assert_eq!(stats["monthTotal"], 15);

    let (status, overview) = send(&app, Method::GET, "/api/stats", Some("alice"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(overview["momentumScore"], 100);
    assert_eq!(overview["taskStats"][0]["taskName"], "Pushups");

    let (status, days) = send(&app, Method::GET, "/api/activity", Some("alice"), None).await;
    assert_eq!(status, StatusCode::OK);
    let days = days.as_array().unwrap();
    assert_eq!(days.len(), 1);
    assert_eq!(days[0]["total"], 15);
    assert_eq!(days[0]["hadDefeat"], false);

    let (_, empty) = send(&app, Method::GET, "/api/stats", Some("bob"), None).await;
    assert_eq!(empty["momentumScore"], 0);
}

#[tokio::test]
async fn categories_and_journal_entries() {
    let app = test_router();

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/categories",
        Some("alice"),
        Some(json!({ "name": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, category) = send(
        &app,
        Method::POST,
        "/api/categories",
        Some("alice"),
        Some(json!({ "name": "Health" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(category["name"], "Health");

    let (_, categories) = send(&app, Method::GET, "/api/categories", Some("alice"), None).await;
    assert_eq!(categories.as_array().unwrap().len(), 1);

    let (status, entry) = send(
        &app,
        Method::POST,
        "/api/journal",
        Some("alice"),
        Some(json!({ "content": "Missed the morning set, did it at lunch." })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let entry_id = entry["id"].as_str().unwrap().to_string();

    let (status, fetched) = send(
        &app,
        Method::GET,
        &format!("/api/journal/{entry_id}"),
        Some("alice"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["content"], "Missed the morning set, did it at lunch.");

    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/api/journal/{entry_id}"),
        Some("bob"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = test_router();
    let (status, doc) = send(&app, Method::GET, "/api-docs/openapi.json", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]["/api/check-ins"].is_object());
    assert!(doc["paths"]["/api/tasks/{id}/replay"].is_object());
}
