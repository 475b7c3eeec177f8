//! Handler tests for Users domain
//!
//! Drive the users router directly with an in-memory repository and check
//! status codes, bodies and error messages.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum_helpers::ErrorResponse;
use domain_users::{InMemoryUserRepository, UserResponse, UserService, handlers};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

fn app() -> Router {
    handlers::router(UserService::new(InMemoryUserRepository::new()))
}

async fn json_body<T: serde::de::DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> axum::response::Response {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            request = request.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&value).unwrap())
        }
        None => Body::empty(),
    };
    app.clone().oneshot(request.body(body).unwrap()).await.unwrap()
}

#[tokio::test]
async fn test_create_then_duplicate_email_returns_409() {
    let app = app();

    let response = send(&app, "POST", "/", Some(json!({"name": "A", "email": "a@x.com", "age": 30}))).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let user: UserResponse = json_body(response.into_body()).await;
    assert_eq!(user.id.len(), 24);
    assert_eq!(user.email, "a@x.com");
    assert!(user.is_active);

    let response = send(&app, "POST", "/", Some(json!({"name": "B", "email": "A@x.com", "age": 40}))).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let error: ErrorResponse = json_body(response.into_body()).await;
    assert_eq!(error.status_code, 409);
    assert_eq!(error.message, "Email already exists");

    let response = send(&app, "POST", "/", Some(json!({"name": "C", "email": "  A@X.COM ", "age": 50}))).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_create_validates_input() {
    let app = app();

    let response = send(&app, "POST", "/", Some(json!({"name": "A", "email": "not-an-email", "age": 30}))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: ErrorResponse = json_body(response.into_body()).await;
    assert!(error.message.contains("email"));
    assert!(error.details.is_some());

    let response = send(&app, "POST", "/", Some(json!({"name": "A", "email": "a@x.com", "age": 200}))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_rejects_unknown_fields() {
    let app = app();
    let response = send(
        &app,
        "POST",
        "/",
        Some(json!({"name": "A", "email": "a@x.com", "age": 30, "password": "x"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_with_invalid_id_is_400() {
    let response = send(&app(), "GET", "/not-an-id", None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let error: ErrorResponse = json_body(response.into_body()).await;
    assert_eq!(error.message, "Invalid MongoDB ObjectId: not-an-id");
}

#[tokio::test]
async fn test_get_unknown_id_is_404() {
    let response = send(&app(), "GET", "/665f1c2b9d3e4a0012345678", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let error: ErrorResponse = json_body(response.into_body()).await;
    assert_eq!(error.message, "User with ID 665f1c2b9d3e4a0012345678 not found");
}

#[tokio::test]
async fn test_lookup_by_email() {
    let app = app();
    send(&app, "POST", "/", Some(json!({"name": "Ada", "email": "ada@example.com", "age": 36}))).await;

    let response = send(&app, "GET", "/email/ADA@example.com", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let user: UserResponse = json_body(response.into_body()).await;
    assert_eq!(user.name, "Ada");

    let response = send(&app, "GET", "/email/nobody@example.com", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_patch_updates_only_given_fields() {
    let app = app();
    let response = send(
        &app,
        "POST",
        "/",
        Some(json!({"name": "A", "email": "a@x.com", "age": 30, "tags": ["vip"]})),
    )
    .await;
    let created: UserResponse = json_body(response.into_body()).await;

    let response = send(&app, "PATCH", &format!("/{}", created.id), Some(json!({"isActive": false}))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated: UserResponse = json_body(response.into_body()).await;
    assert!(!updated.is_active);
    assert_eq!(updated.tags, vec!["vip".to_string()]);
    assert_eq!(updated.age, 30);

    let response = send(&app, "GET", "/active", None).await;
    let active: Vec<UserResponse> = json_body(response.into_body()).await;
    assert!(active.is_empty());
}

#[tokio::test]
async fn test_delete_returns_204_then_404() {
    let app = app();
    let response = send(&app, "POST", "/", Some(json!({"name": "A", "email": "a@x.com", "age": 30}))).await;
    let created: UserResponse = json_body(response.into_body()).await;
    let uri = format!("/{}", created.id);

    let response = send(&app, "DELETE", &uri, None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(&app, "DELETE", &uri, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_returns_insertion_order() {
    let app = app();
    for (name, email) in [("first", "first@x.com"), ("second", "second@x.com")] {
        send(&app, "POST", "/", Some(json!({"name": name, "email": email, "age": 20}))).await;
    }

    let response = send(&app, "GET", "/", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let users: Vec<UserResponse> = json_body(response.into_body()).await;
    let names: Vec<_> = users.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(names, vec!["first", "second"]);
}
