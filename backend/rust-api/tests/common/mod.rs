#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use pole_digital_api::{
    config::Config,
    create_router,
    services::AppState,
    storage::{MemoryStorage, SharedStorage},
};

/// Router over a fresh in-memory store with the demo fixtures loaded.
pub fn create_test_app() -> (Router, Arc<AppState>) {
    create_test_app_with_storage(Arc::new(MemoryStorage::new()))
}

pub fn create_test_app_with_storage(storage: SharedStorage) -> (Router, Arc<AppState>) {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();

    let config = Config {
        seed_fixtures: true,
        ..Config::in_memory()
    };
    let state = Arc::new(AppState::with_storage(config, storage));
    (create_router(state.clone()), state)
}

/// Sends a request and returns the status with the JSON body (`Null` when empty).
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, json)
}

pub async fn login(app: &Router, email: &str, password: &str) -> (StatusCode, Value) {
    send(
        app,
        "POST",
        "/api/v1/auth/login",
        Some(serde_json::json!({ "email": email, "password": password })),
    )
    .await
}

/// Logs in the fixture stagiaire `user-1`.
pub async fn login_stagiaire(app: &Router) {
    let (status, _) = login(app, "TEST1@stagiaire.com", "password").await;
    assert_eq!(status, StatusCode::OK);
}

/// Logs in the fixture enseignant `user-2`.
pub async fn login_enseignant(app: &Router) {
    let (status, _) = login(app, "TEST2@enseignant.com", "password").await;
    assert_eq!(status, StatusCode::OK);
}
