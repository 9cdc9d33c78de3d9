//! Integration tests for projects and their dimension listings.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, create_project, delete, get, post_json, submit_value};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../db/migrations")]
async fn create_project_derives_slug(pool: PgPool) {
    let app = build_test_app(pool);

    let response = post_json(
        &app,
        "/api/v1/projects",
        json!({ "name": "Serde JSON Bench", "description": "parser benchmarks" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["data"]["slug"], "serde-json-bench");
    assert_eq!(json["data"]["description"], "parser benchmarks");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn duplicate_slug_returns_409(pool: PgPool) {
    let app = build_test_app(pool);
    create_project(&app, "dup").await;

    let response = post_json(&app, "/api/v1/projects", json!({ "name": "Dup" })).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "CONFLICT");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn invalid_explicit_slug_returns_400(pool: PgPool) {
    let app = build_test_app(pool);

    let response = post_json(
        &app,
        "/api/v1/projects",
        json!({ "name": "Anything", "slug": "Not A Slug" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn blank_name_returns_400(pool: PgPool) {
    let app = build_test_app(pool);
    let response = post_json(&app, "/api/v1/projects", json!({ "name": "   " })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn get_list_and_delete_project(pool: PgPool) {
    let app = build_test_app(pool);
    let first = create_project(&app, "alpha").await;
    create_project(&app, "beta").await;

    let json = body_json(get(&app, &format!("/api/v1/projects/{first}")).await).await;
    assert_eq!(json["data"]["name"], "alpha");

    let json = body_json(get(&app, "/api/v1/projects?limit=1").await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);

    let response = delete(&app, &format!("/api/v1/projects/{first}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get(&app, &format!("/api/v1/projects/{first}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = delete(&app, &format!("/api/v1/projects/{first}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn report_creates_dimensions_on_first_use(pool: PgPool) {
    let app = build_test_app(pool);
    let project_id = create_project(&app, "dims").await;

    submit_value(&app, project_id, "main", "latency", 1.0).await;
    submit_value(&app, project_id, "main", "latency", 2.0).await;

    for (kind, name) in [
        ("branches", "main"),
        ("testbeds", "ci-linux"),
        ("benchmarks", "parse_small"),
        ("measures", "latency"),
    ] {
        let json = body_json(get(&app, &format!("/api/v1/projects/{project_id}/{kind}")).await).await;
        let rows = json["data"].as_array().unwrap();
        assert_eq!(rows.len(), 1, "{kind} reused by name");
        assert_eq!(rows[0]["name"], name);
    }
}

#[sqlx::test(migrations = "../db/migrations")]
async fn create_measure_upserts_units(pool: PgPool) {
    let app = build_test_app(pool);
    let project_id = create_project(&app, "units").await;
    let uri = format!("/api/v1/projects/{project_id}/measures");

    let response = post_json(&app, &uri, json!({ "name": "latency", "units": "ns" })).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = post_json(&app, &uri, json!({ "name": "latency", "units": "ms" })).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["id"], id);
    assert_eq!(json["data"]["units"], "ms");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn dimensions_of_missing_project_return_404(pool: PgPool) {
    let app = build_test_app(pool);
    let response = get(&app, "/api/v1/projects/999999/branches").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
