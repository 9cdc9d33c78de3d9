#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use axum::Router;
use driftwatch_api::config::{LogFormat, ServerConfig};
use driftwatch_api::router::build_app_router;
use driftwatch_api::state::AppState;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults.
///
/// `database_url` is unused: `#[sqlx::test]` hands over a ready pool.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: String::new(),
        database_max_connections: 5,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        threshold_cache_ttl_secs: 300,
        threshold_cache_max_entries: 100,
        cache_sweep_interval_secs: 60,
        evaluation_concurrency: 4,
        log_format: LogFormat::Pretty,
    }
}

/// Build the full application router, middleware included, on `pool`.
pub fn build_test_app(pool: PgPool) -> Router {
    build_app_router(AppState::new(pool, test_config())).expect("test config is valid")
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    app.clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn post_empty(app: &Router, uri: &str) -> Response<Body> {
    send(app, Method::POST, uri, None).await
}

pub async fn put_json(app: &Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn delete(app: &Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Create a project and return its id.
pub async fn create_project(app: &Router, name: &str) -> i64 {
    let response = post_json(app, "/api/v1/projects", json!({ "name": name })).await;
    assert_eq!(response.status(), 201);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

/// Submit a single-metric report and return the `data` payload.
pub async fn submit_value(
    app: &Router,
    project_id: i64,
    branch: &str,
    measure: &str,
    value: f64,
) -> Value {
    let response = post_json(
        app,
        &format!("/api/v1/projects/{project_id}/reports"),
        json!({
            "branch": branch,
            "testbed": "ci-linux",
            "metrics": [
                { "benchmark": "parse_small", "measure": measure, "value": value }
            ]
        }),
    )
    .await;
    assert_eq!(response.status(), 201);
    body_json(response).await["data"].clone()
}

/// Look up a named row in one of the dimension listings.
pub async fn dimension_id(app: &Router, project_id: i64, kind: &str, name: &str) -> i64 {
    let json = body_json(get(app, &format!("/api/v1/projects/{project_id}/{kind}")).await).await;
    json["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|row| row["name"] == name)
        .and_then(|row| row["id"].as_i64())
        .unwrap_or_else(|| panic!("{kind} '{name}' not found"))
}

/// Create a threshold and return its id.
pub async fn create_threshold(app: &Router, project_id: i64, body: Value) -> i64 {
    let response = post_json(
        app,
        &format!("/api/v1/projects/{project_id}/thresholds"),
        body,
    )
    .await;
    assert_eq!(response.status(), 201);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

/// Two `latency` baselines at 100 on `main`, an upper 10% threshold, then a
/// report at 120. Returns the regressed report payload.
pub async fn seed_regression(app: &Router, project_id: i64) -> Value {
    submit_value(app, project_id, "main", "latency", 100.0).await;
    submit_value(app, project_id, "main", "latency", 100.0).await;
    let measure_id = dimension_id(app, project_id, "measures", "latency").await;
    create_threshold(
        app,
        project_id,
        json!({ "measure_id": measure_id, "upper_boundary": 10.0, "min_sample_size": 2 }),
    )
    .await;
    submit_value(app, project_id, "main", "latency", 120.0).await
}
