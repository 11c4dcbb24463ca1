use anyhow::Result;
use axum::body::Body;
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use workout_api::app::{router, AppState};

pub fn app() -> Router {
    router(AppState::in_memory())
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub fn authed_request(method: &str, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"));
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request")
}

pub fn bare_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

/// Send a request through the router and collect status, headers, and the
/// JSON body (Null for empty bodies such as 204s).
pub async fn send(app: &Router, request: Request<Body>) -> Result<(StatusCode, HeaderMap, Value)> {
    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, headers, body))
}

/// Register a user and log them in, returning the bearer token plaintext.
pub async fn register_and_login(app: &Router, email: &str, password: &str) -> Result<String> {
    let (status, _, _) = send(
        app,
        json_request(
            "POST",
            "/users",
            json!({
                "name": "Test User",
                "email": email,
                "password": password,
                "bio": "integration test user"
            }),
        ),
    )
    .await?;
    anyhow::ensure!(status == StatusCode::CREATED, "register failed: {status}");

    let (status, _, body) = send(
        app,
        json_request(
            "POST",
            "/login",
            json!({ "email": email, "password": password }),
        ),
    )
    .await?;
    anyhow::ensure!(status == StatusCode::CREATED, "login failed: {status}");

    let plaintext = body["token"]["plaintext"]
        .as_str()
        .ok_or_else(|| anyhow::anyhow!("token plaintext missing from login response"))?;
    Ok(plaintext.to_string())
}
