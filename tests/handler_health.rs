mod common;

use axum::{Router, routing::get};
use axum_test::TestServer;
use link_rotator::api::handlers::health_handler;

#[tokio::test]
async fn test_health_endpoint_success() {
    let app = common::create_test_app(3);

    let response = app.server.get("/health").await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["checks"]["kv"]["status"], "ok");
    assert_eq!(json["checks"]["metrics_queue"]["status"], "ok");
    assert_eq!(json["checks"]["metrics_queue"]["capacity"], 1000);
}

#[tokio::test]
async fn test_health_endpoint_structure() {
    let (state, _repo, _queue) = common::create_test_state(3);
    let app = Router::new()
        .route("/health", get(health_handler))
        .with_state(state);

    let server = TestServer::new(app).unwrap();

    let response = server.get("/health").await;

    let json = response.json::<serde_json::Value>();

    assert!(json.get("status").is_some());
    assert!(json.get("version").is_some());
    assert!(json.get("checks").is_some());
    assert!(json["checks"].get("kv").is_some());
    assert!(json["checks"]["metrics_queue"].get("depth").is_some());
    assert!(json["checks"]["metrics_queue"].get("dropped").is_some());
}

#[tokio::test]
async fn test_health_reports_queue_depth() {
    let app = common::create_test_app(3);
    common::create_test_slug(&app.repo, "docs", &["https://example.com"]).await;

    app.server.get("/docs").await;
    app.server.get("/docs").await;

    let json = app.server.get("/health").await.json::<serde_json::Value>();
    assert_eq!(json["checks"]["metrics_queue"]["depth"], 2);
}

#[tokio::test]
async fn test_health_degraded_when_queue_closed() {
    let (state, _repo, queue) = common::create_test_state(3);
    queue.close();
    let app = Router::new()
        .route("/health", get(health_handler))
        .with_state(state);
    let server = TestServer::new(app).unwrap();

    let response = server.get("/health").await;

    assert_eq!(response.status_code(), 503);
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["checks"]["metrics_queue"]["status"], "error");
}
