//! HTTP routes: the JSON API under `/api` and the HTML front end

use axum::{Json, Router, response::IntoResponse, routing::get};
use serde_json::json;

use crate::AppState;

pub mod api;
pub mod auth;
pub mod web;

/// Create the router for the catalog service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api::router(state.clone()))
        .merge(auth::router(state.clone()))
        .merge(web::router(state.clone()))
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "catalog"
    }))
}
