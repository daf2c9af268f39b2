pub mod classify;
pub mod error;
pub mod webhook;

use crate::middleware::correlation::correlation_middleware;
use crate::AppState;
use axum::routing::get;
use axum::{middleware, Json, Router};
use tower_http::trace::TraceLayer;

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(webhook::router(state.clone()))
        .merge(classify::router(state))
        .route("/health", get(health))
        .route_layer(middleware::from_fn(correlation_middleware))
        .layer(TraceLayer::new_for_http())
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok", "service": "switchboard" }))
}
