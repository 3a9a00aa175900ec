//! Helpers for driving the router in-process

#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, Response, header},
};
use catalog::{AppState, config::AppConfig, routes::create_router};
use serde_json::Value;
use tower::ServiceExt;

pub fn test_config() -> AppConfig {
    AppConfig {
        password_memory_kib: 64,
        password_iterations: 1,
        password_parallelism: 1,
        ..AppConfig::default()
    }
}

pub fn test_app() -> Router {
    let state = AppState::in_memory(&test_config()).unwrap();
    create_router(state)
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub fn json_request(method: Method, uri: &str, body: Option<Value>, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub fn form_request(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
    json_request(Method::GET, uri, None, cookie)
}

/// `name=value` pairs from every Set-Cookie header
pub fn set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .map(|value| value.split(';').next().unwrap_or_default().to_string())
        .collect()
}

/// Full Set-Cookie header for `name`, attributes included
pub fn set_cookie_header(response: &Response<Body>, name: &str) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with(&format!("{name}=")))
        .map(str::to_string)
}

pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    set_cookies(response)
        .into_iter()
        .find(|cookie| cookie.starts_with("catalog_session=") && cookie.len() > "catalog_session=".len())
}

pub fn location(response: &Response<Body>) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Register `alice` through the API and return her session cookie
pub async fn logged_in(app: &Router) -> String {
    let response = send(
        app,
        json_request(
            Method::POST,
            "/api/auth/register",
            Some(serde_json::json!({
                "username": "alice",
                "email": "alice@example.com",
                "password": "secret1"
            })),
            None,
        ),
    )
    .await;
    assert_eq!(response.status(), 201);

    let response = send(
        app,
        json_request(
            Method::POST,
            "/api/auth/login",
            Some(serde_json::json!({
                "email": "alice@example.com",
                "password": "secret1"
            })),
            None,
        ),
    )
    .await;
    assert_eq!(response.status(), 200);

    session_cookie(&response).expect("login sets a session cookie")
}
