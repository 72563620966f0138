//! HTTP-level tests for registration, login, refresh and `/me`, driven
//! through the router over an in-memory account store.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use spa_backend::accounts::{DefaultPasswordPolicy, MemoryAccountStore};
use spa_backend::{build_app, AppState};
use tower::util::ServiceExt;

fn app_with_store() -> (Router, Arc<MemoryAccountStore>) {
    let store = Arc::new(MemoryAccountStore::new());
    let fake = AppState::fake();
    let state = AppState::from_parts(
        fake.config.clone(),
        store.clone(),
        Arc::new(DefaultPasswordPolicy::default()),
    );
    (build_app(state), store)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>, bearer: Option<&str>) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let req = match body {
        Some(json) => req
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn registration() -> Value {
    json!({
        "email": "a@b.com",
        "password": "Passw0rd!",
        "password2": "Passw0rd!",
        "first_name": "A",
        "last_name": "B",
    })
}

async fn send_raw(app: &Router, uri: &str, content_type: &str, body: &'static str) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(body))
        .unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn health_reports_status_json() {
    let (app, _) = app_with_store();
    let (status, body) = send(&app, "GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn register_defaults_role_to_student() {
    let (app, store) = app_with_store();
    let (status, body) = send(&app, "POST", "/api/auth/register/", Some(registration()), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["email"], "a@b.com");
    assert_eq!(body["role"], "student");
    assert_eq!(body["first_name"], "A");
    assert!(body.get("password").is_none());
    assert!(body.get("password2").is_none());
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn register_rejects_mismatched_passwords() {
    let (app, store) = app_with_store();
    let mut payload = registration();
    payload["password2"] = json!("Passw0rd?");
    let (status, body) = send(&app, "POST", "/api/auth/register/", Some(payload), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "password": ["Password fields didn't match."] }));
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn register_rejects_unknown_role() {
    let (app, _) = app_with_store();
    let mut payload = registration();
    payload["role"] = json!("instructor");
    let (status, body) = send(&app, "POST", "/api/auth/register/", Some(payload), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["role"][0], "\"instructor\" is not a valid choice.");
}

#[tokio::test]
async fn register_reports_missing_fields() {
    let (app, _) = app_with_store();
    let (status, body) = send(&app, "POST", "/api/auth/register/", Some(json!({})), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    for field in ["email", "password", "password2", "first_name", "last_name"] {
        assert_eq!(body[field][0], "This field is required.", "{field}");
    }
}

#[tokio::test]
async fn register_accepts_password_sharing_email_domain_piece() {
    let (app, store) = app_with_store();
    let payload = json!({
        "email": "jane@example.com",
        "password": "Welcome2024!x",
        "password2": "Welcome2024!x",
        "first_name": "Jane",
        "last_name": "Doe",
    });
    let (status, body) = send(&app, "POST", "/api/auth/register/", Some(payload), None).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn register_reports_wrongly_typed_fields_per_field() {
    let (app, store) = app_with_store();
    let mut payload = registration();
    payload["email"] = json!(123);
    let (status, body) = send(&app, "POST", "/api/auth/register/", Some(payload), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "email": ["Enter a valid email address."] }));

    let mut payload = registration();
    payload["first_name"] = json!(true);
    let (status, body) = send(&app, "POST", "/api/auth/register/", Some(payload), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "first_name": ["Not a valid string."] }));
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn malformed_bodies_get_json_errors() {
    let (app, _) = app_with_store();
    let (status, body) = send_raw(&app, "/api/auth/register/", "application/json", "{\"email\": ").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().is_some_and(|d| !d.is_empty()));

    let (status, body) = send_raw(&app, "/api/auth/login/", "text/plain", "email=a@b.com").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());

    let (status, body) = send_raw(&app, "/api/auth/register/", "application/json", "[1, 2]").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "non_field_errors": ["Invalid data. Expected a dictionary, but got list."] })
    );
}

#[tokio::test]
async fn register_rejects_duplicate_email() {
    let (app, store) = app_with_store();
    let (status, _) = send(&app, "POST", "/api/auth/register/", Some(registration()), None).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = send(&app, "POST", "/api/auth/register/", Some(registration()), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["email"][0], "user with this email already exists.");
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn login_returns_pair_and_profile_claims() {
    let (app, _) = app_with_store();
    let mut payload = registration();
    payload["role"] = json!("admin");
    payload["first_name"] = json!("Ada");
    payload["last_name"] = json!("Lovelace");
    send(&app, "POST", "/api/auth/register/", Some(payload), None).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login/",
        Some(json!({ "email": "a@b.com", "password": "Passw0rd!" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["access"].as_str().is_some_and(|t| !t.is_empty()));
    assert!(body["refresh"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(body["email"], "a@b.com");
    assert_eq!(body["role"], "admin");
    assert_eq!(body["first_name"], "Ada");
    assert_eq!(body["last_name"], "Lovelace");
}

#[tokio::test]
async fn login_with_unknown_email_returns_no_token() {
    let (app, _) = app_with_store();
    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login/",
        Some(json!({ "email": "ghost@b.com", "password": "Passw0rd!" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "detail": "No active account found with the given credentials" }));
}

#[tokio::test]
async fn login_with_wrong_password_fails() {
    let (app, _) = app_with_store();
    send(&app, "POST", "/api/auth/register/", Some(registration()), None).await;
    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login/",
        Some(json!({ "email": "a@b.com", "password": "wrong-password" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.get("access").is_none());
}

#[tokio::test]
async fn login_of_deactivated_account_fails() {
    let (app, store) = app_with_store();
    send(&app, "POST", "/api/auth/register/", Some(registration()), None).await;
    store.set_active("a@b.com", false).await;
    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/login/",
        Some(json!({ "email": "a@b.com", "password": "Passw0rd!" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn refresh_and_me_accept_only_their_token_kind() {
    let (app, _) = app_with_store();
    send(&app, "POST", "/api/auth/register/", Some(registration()), None).await;
    let (_, tokens) = send(
        &app,
        "POST",
        "/api/auth/login/",
        Some(json!({ "email": "a@b.com", "password": "Passw0rd!" })),
        None,
    )
    .await;
    let access = tokens["access"].as_str().unwrap().to_string();
    let refresh = tokens["refresh"].as_str().unwrap().to_string();

    let (status, me) = send(&app, "GET", "/api/auth/me/", None, Some(&access)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "a@b.com");
    assert_eq!(me["role"], "student");

    let (status, _) = send(&app, "GET", "/api/auth/me/", None, Some(&refresh)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, "POST", "/api/auth/token/refresh/", Some(json!({ "refresh": access })), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "token_not_valid");

    let (status, body) = send(&app, "POST", "/api/auth/token/refresh/", Some(json!({ "refresh": refresh })), None).await;
    assert_eq!(status, StatusCode::OK);
    let new_access = body["access"].as_str().unwrap();
    let (status, _) = send(&app, "GET", "/api/auth/me/", None, Some(new_access)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn me_requires_credentials() {
    let (app, _) = app_with_store();
    let (status, body) = send(&app, "GET", "/api/auth/me/", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Authentication credentials were not provided.");
}
