//! Integration tests for the HTTP API
//!
//! Requests go straight into the router with `oneshot`; crawls run against
//! wiremock servers.

use crate::common::{html_page, test_config};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use product_scout::config::Config;
use product_scout::server::dto::ErrorResponse;
use product_scout::server::routes::router;
use product_scout::server::AppState;
use product_scout::Coordinator;
use std::sync::Arc;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn app(config: Config, shutdown: CancellationToken) -> Router {
    let coordinator = Coordinator::from_config(&config).unwrap();
    router(Arc::new(AppState::new(config, coordinator, shutdown)))
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn shop() -> MockServer {
    let server = MockServer::start().await;
    let base = server.uri();
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html_page(&[
            format!("{base}/products/lamp-204"),
            format!("{base}/products/desk-88"),
            format!("{base}/contact"),
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/contact"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html_page(&[])))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_health() {
    let dir = TempDir::new().unwrap();
    let app = app(test_config(dir.path()), CancellationToken::new());

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = body_json(response).await;
    assert_eq!(body, serde_json::json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_start_returns_sorted_products_and_writes_file() {
    let server = shop().await;
    let base = server.uri();
    let dir = TempDir::new().unwrap();
    let app = app(test_config(dir.path()), CancellationToken::new());

    let response = app
        .oneshot(post_json(
            "/api/v1/crawler/start",
            serde_json::json!({ "urls": [base], "output_filename": "lamps.json" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let products: Vec<String> = body_json(response).await;
    assert_eq!(
        products,
        vec![
            format!("{base}/products/desk-88"),
            format!("{base}/products/lamp-204"),
        ]
    );

    let written = std::fs::read_to_string(dir.path().join("lamps.json")).unwrap();
    let snapshots = product_scout::output::read_snapshots(&written).unwrap();
    assert_eq!(snapshots.last().unwrap(), &products);
}

#[tokio::test]
async fn test_report_endpoint() {
    let server = shop().await;
    let base = server.uri();
    let dir = TempDir::new().unwrap();
    let app = app(test_config(dir.path()), CancellationToken::new());

    let response = app
        .oneshot(post_json(
            "/api/v1/crawler/report",
            serde_json::json!({ "urls": [base], "max_depth": 0, "concurrency": 1 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let report: serde_json::Value = body_json(response).await;
    assert_eq!(report["products"].as_array().unwrap().len(), 2);
    assert_eq!(report["seeds"][0]["seed"], format!("{base}/"));
    assert_eq!(report["seeds"][0]["state"], "done");
    // Depth 0: only the seed is fetched
    assert_eq!(report["seeds"][0]["pages_visited"], 1);
}

#[tokio::test]
async fn test_validation_errors() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path());

    let bodies = [
        serde_json::json!({ "urls": [] }),
        serde_json::json!({ "urls": ["shop.test"], "concurrency": 0 }),
        serde_json::json!({ "urls": ["shop.test"], "concurrency": u64::MAX }),
        serde_json::json!({ "urls": ["shop.test"], "output_filename": "../escape.json" }),
        serde_json::json!({ "urls": ["https://"] }),
    ];

    for body in bodies {
        let response = app(config.clone(), CancellationToken::new())
            .oneshot(post_json("/api/v1/crawler/start", body.clone()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body}");
        let error: ErrorResponse = body_json(response).await;
        assert_eq!(error.error, "validation_error");
    }
}

#[tokio::test]
async fn test_shutdown_cancels_crawl() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html_page(&[])))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let shutdown = CancellationToken::new();
    shutdown.cancel();
    let app = app(test_config(dir.path()), shutdown);

    let response = app
        .oneshot(post_json(
            "/api/v1/crawler/start",
            serde_json::json!({ "urls": [server.uri()] }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let error: ErrorResponse = body_json(response).await;
    assert_eq!(error.error, "crawl_cancelled");
}
