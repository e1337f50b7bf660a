//! Integration tests for the sweet shop HTTP API
//!
//! Exercises the full router (auth middleware included) through
//! `tower::ServiceExt::oneshot`, with a throwaway SQLite file per test.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tower::ServiceExt;

use sweetshop_backend::{
    auth::{JwtHandler, UserStore},
    inventory::SweetStore,
    server::{build_router, AppState},
};

fn test_app() -> (Router, AppState, NamedTempFile) {
    let temp = NamedTempFile::new().unwrap();
    let path = temp.path().to_str().unwrap();

    let state = AppState {
        users: Arc::new(UserStore::new(path).unwrap()),
        sweets: Arc::new(SweetStore::new(path).unwrap()),
        jwt: Arc::new(JwtHandler::new("integration-test-secret".to_string(), 3600)),
    };

    (build_router(state.clone()), state, temp)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, String) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8_lossy(&bytes).to_string())
}

fn parse(body: &str) -> Value {
    serde_json::from_str(body).unwrap_or(Value::Null)
}

async fn register(app: &Router, username: &str, email: &str, password: &str) -> StatusCode {
    let (status, _) = send(
        app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "username": username, "email": email, "password": password })),
    )
    .await;
    status
}

async fn login(app: &Router, username: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "username": username, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    parse(&body)["token"].as_str().unwrap().to_string()
}

async fn add_sweet(app: &Router, token: &str, payload: Value) -> (StatusCode, Value) {
    let (status, body) = send(app, Method::POST, "/api/sweets", Some(token), Some(payload)).await;
    (status, parse(&body))
}

#[tokio::test]
async fn test_health_is_public() {
    let (app, _state, _temp) = test_app();
    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse(&body)["status"], "ok");
}

#[tokio::test]
async fn test_register_and_login() {
    let (app, _state, _temp) = test_app();

    assert_eq!(
        register(&app, "tester", "t@t.com", "testpass").await,
        StatusCode::CREATED
    );

    let token = login(&app, "tester", "testpass").await;
    assert!(!token.is_empty());

    let (status, body) = send(&app, Method::GET, "/api/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let me = parse(&body);
    assert_eq!(me["username"], "tester");
    assert_eq!(me["email"], "t@t.com");
    assert_eq!(me["is_admin"], false);
}

#[tokio::test]
async fn test_duplicate_username_conflicts() {
    let (app, _state, _temp) = test_app();

    assert_eq!(
        register(&app, "tester", "t@t.com", "testpass").await,
        StatusCode::CREATED
    );
    // Same username with a different email still conflicts.
    assert_eq!(
        register(&app, "tester", "other@t.com", "testpass").await,
        StatusCode::CONFLICT
    );
}

#[tokio::test]
async fn test_login_failures_are_uniform() {
    let (app, _state, _temp) = test_app();
    register(&app, "tester", "t@t.com", "testpass").await;

    let (wrong_status, wrong_body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "username": "tester", "password": "wrongpass" })),
    )
    .await;
    let (unknown_status, unknown_body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "username": "nobody", "password": "testpass" })),
    )
    .await;

    // Wrong password and unknown username are indistinguishable.
    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body, unknown_body);
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let (app, _state, _temp) = test_app();

    let (status, _) = send(&app, Method::GET, "/api/sweets", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, Method::GET, "/api/sweets", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_for_deleted_subject_rejected() {
    let (app, state, _temp) = test_app();
    register(&app, "ghost", "g@g.com", "testpass").await;
    let token = login(&app, "ghost", "testpass").await;

    // Token for a subject the credential store no longer resolves.
    let ghost = sweetshop_backend::auth::User {
        id: 424_242,
        username: "ghost".to_string(),
        email: "g@g.com".to_string(),
        password_hash: String::new(),
        is_admin: false,
        created_at: String::new(),
    };
    let (stale, _) = state.jwt.issue(&ghost).unwrap();

    let (status, _) = send(&app, Method::GET, "/api/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, Method::GET, "/api/me", Some(&stale), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_ladoo_lifecycle() {
    let (app, state, _temp) = test_app();

    state
        .users
        .ensure_admin("testadmin", "a@a.com", "adminpass")
        .unwrap();
    register(&app, "tester", "t@t.com", "testpass").await;

    let user_token = login(&app, "tester", "testpass").await;
    let admin_token = login(&app, "testadmin", "adminpass").await;

    // Any authenticated user can add a sweet.
    let (status, sweet) = add_sweet(
        &app,
        &user_token,
        json!({ "name": "Ladoo", "category": "Indian", "price": 10.0, "quantity": 5 }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = sweet["id"].as_i64().unwrap();

    // Purchase 2 -> quantity 3.
    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/sweets/{}/purchase", id),
        Some(&user_token),
        Some(json!({ "quantity": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse(&body)["quantity"], 3);

    // Restock 5 as admin -> quantity 8.
    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/sweets/{}/restock", id),
        Some(&admin_token),
        Some(json!({ "quantity": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse(&body)["quantity"], 8);

    // Delete as admin -> 204, then mutations report 404.
    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/sweets/{}", id),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/sweets/{}", id),
        Some(&user_token),
        Some(json!({ "price": 11.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/api/sweets/{}/purchase", id),
        Some(&user_token),
        Some(json!({ "quantity": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_restock_and_delete_require_admin() {
    let (app, _state, _temp) = test_app();
    register(&app, "tester", "t@t.com", "testpass").await;
    let token = login(&app, "tester", "testpass").await;

    let (_, sweet) = add_sweet(
        &app,
        &token,
        json!({ "name": "Barfi", "category": "Indian", "price": 20.0, "quantity": 4 }),
    )
    .await;
    let id = sweet["id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/api/sweets/{}/restock", id),
        Some(&token),
        Some(json!({ "quantity": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/sweets/{}", id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Quantity untouched by the rejected restock.
    let (_, body) = send(&app, Method::GET, "/api/sweets", Some(&token), None).await;
    assert_eq!(parse(&body)[0]["quantity"], 4);
}

#[tokio::test]
async fn test_purchase_validation_over_http() {
    let (app, _state, _temp) = test_app();
    register(&app, "tester", "t@t.com", "testpass").await;
    let token = login(&app, "tester", "testpass").await;

    let (_, sweet) = add_sweet(
        &app,
        &token,
        json!({ "name": "Fudge", "category": "Western", "price": 8.0, "quantity": 2 }),
    )
    .await;
    let id = sweet["id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/api/sweets/{}/purchase", id),
        Some(&token),
        Some(json!({ "quantity": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/api/sweets/{}/purchase", id),
        Some(&token),
        Some(json!({ "quantity": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // The body defaults to a single unit.
    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/sweets/{}/purchase", id),
        Some(&token),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse(&body)["quantity"], 1);
}

#[tokio::test]
async fn test_search_by_price_range() {
    let (app, _state, _temp) = test_app();
    register(&app, "tester", "t@t.com", "testpass").await;
    let token = login(&app, "tester", "testpass").await;

    for (name, category, price) in [
        ("Ladoo", "Indian", 10.0),
        ("Barfi", "Indian", 20.0),
        ("Fudge", "Western", 5.0),
        ("Toffee", "Western", 2.0),
    ] {
        add_sweet(
            &app,
            &token,
            json!({ "name": name, "category": category, "price": price }),
        )
        .await;
    }

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/sweets/search?min_price=5&max_price=15",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<String> = parse(&body)
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Ladoo", "Fudge"]);

    // Case-insensitive substring on category combines with price bounds.
    let (status, body) = send(
        &app,
        Method::GET,
        "/api/sweets/search?category=west&max_price=3",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let hits = parse(&body);
    assert_eq!(hits.as_array().unwrap().len(), 1);
    assert_eq!(hits[0]["name"], "Toffee");
}

#[tokio::test]
async fn test_list_pagination() {
    let (app, _state, _temp) = test_app();
    register(&app, "tester", "t@t.com", "testpass").await;
    let token = login(&app, "tester", "testpass").await;

    for i in 0..5 {
        add_sweet(
            &app,
            &token,
            json!({ "name": format!("Sweet{}", i), "category": "Misc", "price": 1.0 }),
        )
        .await;
    }

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/sweets?offset=2&limit=2",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let page = parse(&body);
    assert_eq!(page.as_array().unwrap().len(), 2);
    assert_eq!(page[0]["name"], "Sweet2");
    assert_eq!(page[1]["name"], "Sweet3");
}

#[tokio::test]
async fn test_update_partial_fields_over_http() {
    let (app, _state, _temp) = test_app();
    register(&app, "tester", "t@t.com", "testpass").await;
    let token = login(&app, "tester", "testpass").await;

    let (_, sweet) = add_sweet(
        &app,
        &token,
        json!({ "name": "Ladoo", "category": "Indian", "price": 10.0, "quantity": 5 }),
    )
    .await;
    let id = sweet["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/sweets/{}", id),
        Some(&token),
        Some(json!({ "price": 12.5 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let updated = parse(&body);
    assert_eq!(updated["price"], 12.5);
    assert_eq!(updated["name"], "Ladoo");
    assert_eq!(updated["quantity"], 5);
}
