//! Task API tests.

mod helpers;

use axum::http::StatusCode;
use helpers::{TestApp, assert_error_body, assert_task_schema};
use serde_json::{Value, json};

async fn create(app: &TestApp, body: Value) -> Value {
    let response = app.client.post_json("/tasks", body).await;
    response.assert_status(StatusCode::CREATED);
    response.json()
}

#[tokio::test]
async fn create_returns_created_task_with_defaults() {
    let app = TestApp::with_limit(100);

    let task = create(&app, json!({"title": "write docs", "user_id": 7})).await;

    assert_task_schema(&task);
    assert_eq!(task["title"], "write docs");
    assert_eq!(task["status"], "pending");
    assert_eq!(task["priority"], "medium");
    assert_eq!(task["user_id"], 7);
}

#[tokio::test]
async fn create_rejects_empty_title() {
    let app = TestApp::with_limit(100);

    let response = app
        .client
        .post_json("/tasks", json!({"title": "  ", "user_id": 7}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_error_body(&response.json(), "Bad Request");
}

#[tokio::test]
async fn get_returns_task_and_404_for_missing() {
    let app = TestApp::with_limit(100);
    let task = create(&app, json!({"title": "a", "user_id": 1})).await;

    let found = app.client.get(&format!("/tasks/{}", task["id"])).await;
    found.assert_status(StatusCode::OK);
    assert_eq!(found.json::<Value>(), task);

    let missing = app.client.get("/tasks/999").await;
    missing.assert_status(StatusCode::NOT_FOUND);
    assert_error_body(&missing.json(), "Not Found");
}

#[tokio::test]
async fn update_applies_partial_changes() {
    let app = TestApp::with_limit(100);
    let task = create(
        &app,
        json!({"title": "draft", "description": "keep me", "user_id": 1}),
    )
    .await;
    let uri = format!("/tasks/{}", task["id"]);

    let response = app
        .client
        .put_json(
            &uri,
            json!({"title": "final", "description": "", "status": "in_progress"}),
        )
        .await;
    response.assert_status(StatusCode::OK);

    let updated: Value = response.json();
    assert_eq!(updated["title"], "final");
    assert_eq!(updated["description"], "keep me");
    assert_eq!(updated["status"], "in_progress");

    app.settle().await;
    let fetched: Value = app.client.get(&uri).await.json();
    assert_eq!(fetched["title"], "final");
}

#[tokio::test]
async fn update_missing_task_is_404() {
    let app = TestApp::with_limit(100);

    app.client
        .put_json("/tasks/42", json!({"title": "x"}))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_removes_task() {
    let app = TestApp::with_limit(100);
    let task = create(&app, json!({"title": "gone", "user_id": 1})).await;
    let uri = format!("/tasks/{}", task["id"]);

    app.client
        .delete(&uri)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    app.settle().await;
    app.client.get(&uri).await.assert_status(StatusCode::NOT_FOUND);
    app.client
        .delete(&uri)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_filters_by_user_status_and_priority() {
    let app = TestApp::with_limit(100);
    create(&app, json!({"title": "a", "user_id": 1, "priority": "high"})).await;
    create(&app, json!({"title": "b", "user_id": 1, "status": "completed"})).await;
    create(&app, json!({"title": "c", "user_id": 2})).await;

    let all: Vec<Value> = app.client.get("/tasks?user_id=1").await.json();
    assert_eq!(all.len(), 2);

    let high: Vec<Value> = app
        .client
        .get("/tasks?user_id=1&priority=high")
        .await
        .json();
    assert_eq!(high.len(), 1);
    assert_eq!(high[0]["title"], "a");

    let done: Vec<Value> = app
        .client
        .get("/tasks?user_id=1&status=completed")
        .await
        .json();
    assert_eq!(done.len(), 1);
    assert_eq!(done[0]["title"], "b");
}

#[tokio::test]
async fn list_requires_user_id() {
    let app = TestApp::with_limit(100);

    let response = app.client.get("/tasks").await;
    assert!(response.status.is_client_error());
}
