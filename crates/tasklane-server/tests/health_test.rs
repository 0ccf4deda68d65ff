mod helpers;

use axum::http::StatusCode;
use helpers::{TestApp, client};

#[tokio::test]
async fn health_check_returns_200() {
    client().get("/health").await.assert_status(StatusCode::OK);
}

#[tokio::test]
async fn health_check_returns_json() {
    client()
        .get("/health")
        .await
        .assert_content_type_contains("application/json");
}

#[tokio::test]
async fn health_check_body_contains_status_up() {
    let health: serde_json::Value = client().get("/health").await.json();
    assert_eq!(health["status"], "UP");
}

#[tokio::test]
async fn health_check_is_not_rate_limited() {
    let app = TestApp::with_limit(1);

    for _ in 0..5 {
        app.client.get("/health").await.assert_status(StatusCode::OK);
    }
    assert_eq!(app.limiter.tracked_keys(), 0);
}

#[tokio::test]
async fn health_check_reports_pool_state() {
    let health: serde_json::Value = client().get("/health").await.json();

    assert_eq!(health["active_workers"], 1);
    assert_eq!(health["queued_jobs"], 0);
    assert_eq!(health["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn health_check_is_down_after_pool_shutdown() {
    let app = TestApp::with_limit(1_000);
    app.service.pool().shutdown().await;

    let response = app.client.get("/health").await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);

    let health: serde_json::Value = response.json();
    assert_eq!(health["status"], "DOWN");
    assert_eq!(health["active_workers"], 0);
}

#[tokio::test]
async fn health_response_serializes_from_pool() {
    use tasklane_server::HealthResponse;
    use tasklane_worker::{Pool, PoolConfig};

    let pool = Pool::new(PoolConfig::new(2, 4)).unwrap();
    let response = HealthResponse::from_pool(&pool);
    let json = serde_json::to_value(&response).unwrap();

    assert!(response.is_up());
    assert_eq!(json["status"], "UP");
    assert_eq!(json["active_workers"], 2);

    pool.shutdown().await;
}
