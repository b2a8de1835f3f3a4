//! Handler tests for the Users domain
//!
//! Exercise the router over an in-memory store:
//! - Request deserialization (JSON → Rust structs)
//! - Response serialization, including that password hashes never leak
//! - HTTP status codes and the error envelope

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use domain_users::{InMemoryUserRepository, UserResponse, UserService, handlers};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt; // For oneshot()

// Helper to parse JSON response body
async fn json_body<T: serde::de::DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn app() -> Router {
    handlers::router(UserService::new(InMemoryUserRepository::new()))
}

fn send(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);
    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn create(app: &Router, email: &str, password: &str) -> UserResponse {
    let response = app
        .clone()
        .oneshot(send(
            "POST",
            "/",
            Some(json!({ "email": email, "password": password })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    json_body(response.into_body()).await
}

#[tokio::test]
async fn test_create_user_returns_201_without_password() {
    let app = app();

    let response = app
        .oneshot(send(
            "POST",
            "/",
            Some(json!({ "email": "a@x.io", "password": "p1" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);

    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["email"], "a@x.io");
    assert_eq!(body["active"], false);
    assert_eq!(body["id"].as_str().unwrap().len(), 24);
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn test_create_duplicate_email_returns_409() {
    let app = app();
    create(&app, "a@x.io", "p1").await;

    let response = app
        .oneshot(send(
            "POST",
            "/",
            Some(json!({ "email": "a@x.io", "password": "p2" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["error"], "CONFLICT");
    assert_eq!(body["code"], 1008);
}

#[tokio::test]
async fn test_create_with_missing_field_is_rejected() {
    let response = app()
        .oneshot(send("POST", "/", Some(json!({ "email": "a@x.io" }))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["error"], "JSON_EXTRACTION");
}

#[tokio::test]
async fn test_list_users_in_creation_order() {
    let app = app();
    create(&app, "b@x.io", "p").await;
    create(&app, "a@x.io", "p").await;

    let response = app.oneshot(send("GET", "/", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let users: Vec<UserResponse> = json_body(response.into_body()).await;
    let emails: Vec<_> = users.iter().map(|u| u.email.as_str()).collect();
    assert_eq!(emails, ["b@x.io", "a@x.io"]);
}

#[tokio::test]
async fn test_get_user_by_id() {
    let app = app();
    let created = create(&app, "a@x.io", "p1").await;

    let response = app
        .oneshot(send("GET", &format!("/{}", created.id), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let user: UserResponse = json_body(response.into_body()).await;
    assert_eq!(user, created);
}

#[tokio::test]
async fn test_get_user_malformed_id_returns_400() {
    let response = app()
        .oneshot(send("GET", "/not-an-id", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["error"], "INVALID_ID");
}

#[tokio::test]
async fn test_get_user_unknown_id_returns_404() {
    let response = app()
        .oneshot(send("GET", "/65f1c0ffee0123456789abcd", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_get_user_by_email() {
    let app = app();
    let created = create(&app, "a@x.io", "p1").await;

    let found = app
        .clone()
        .oneshot(send("GET", "/email/a@x.io", None))
        .await
        .unwrap();
    assert_eq!(found.status(), StatusCode::OK);
    let user: UserResponse = json_body(found.into_body()).await;
    assert_eq!(user.id, created.id);

    let missing = app
        .oneshot(send("GET", "/email/ghost@x.io", None))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_user_email() {
    let app = app();
    let created = create(&app, "a@x.io", "p1").await;

    let response = app
        .oneshot(send(
            "PUT",
            &format!("/{}", created.id),
            Some(json!({ "email": "new@x.io" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let user: UserResponse = json_body(response.into_body()).await;
    assert_eq!(user.id, created.id);
    assert_eq!(user.email, "new@x.io");
}

#[tokio::test]
async fn test_update_to_taken_email_returns_409() {
    let app = app();
    create(&app, "a@x.io", "p1").await;
    let b = create(&app, "b@x.io", "p2").await;

    let response = app
        .oneshot(send(
            "PUT",
            &format!("/{}", b.id),
            Some(json!({ "email": "a@x.io" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_update_unknown_id_returns_404() {
    let response = app()
        .oneshot(send("PUT", "/xyz", Some(json!({ "email": "new@x.io" }))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_user_returns_204_then_404() {
    let app = app();
    let created = create(&app, "a@x.io", "p1").await;
    let uri = format!("/{}", created.id);

    let deleted = app.clone().oneshot(send("DELETE", &uri, None)).await.unwrap();
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

    let again = app.clone().oneshot(send("DELETE", &uri, None)).await.unwrap();
    assert_eq!(again.status(), StatusCode::NOT_FOUND);

    let fetched = app.oneshot(send("GET", &uri, None)).await.unwrap();
    assert_eq!(fetched.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_activate_flow() {
    let app = app();
    create(&app, "a@x.io", "p1").await;

    let wrong = app
        .clone()
        .oneshot(send(
            "PUT",
            "/activate",
            Some(json!({ "email": "a@x.io", "password": "nope" })),
        ))
        .await
        .unwrap();
    assert_eq!(wrong.status(), StatusCode::BAD_REQUEST);
    let body: Value = json_body(wrong.into_body()).await;
    assert_eq!(body["error"], "INVALID_CREDENTIALS");

    let active = app
        .clone()
        .oneshot(send("GET", "/active", None))
        .await
        .unwrap();
    let users: Vec<UserResponse> = json_body(active.into_body()).await;
    assert!(users.is_empty());

    let right = app
        .clone()
        .oneshot(send(
            "PUT",
            "/activate",
            Some(json!({ "email": "a@x.io", "password": "p1" })),
        ))
        .await
        .unwrap();
    assert_eq!(right.status(), StatusCode::OK);
    let user: UserResponse = json_body(right.into_body()).await;
    assert!(user.active);

    let active = app.oneshot(send("GET", "/active", None)).await.unwrap();
    let users: Vec<UserResponse> = json_body(active.into_body()).await;
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].email, "a@x.io");
}

#[tokio::test]
async fn test_activate_unknown_email_returns_404() {
    let response = app()
        .oneshot(send(
            "PUT",
            "/activate",
            Some(json!({ "email": "ghost@x.io", "password": "p1" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
