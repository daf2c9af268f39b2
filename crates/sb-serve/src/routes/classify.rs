use crate::middleware::correlation::CorrelationId;
use crate::routes::error::error_response;
use crate::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Extension, Json, Router};
use sb_core::router::route_task;
use sb_core::types::{TaskInput, TaskKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ClassifyInput {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Serialize)]
pub struct ClassifyOutput {
    complexity: TaskKind,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/classify", post(classify))
        .with_state(state)
}

/// Standalone classification endpoint, useful for poking at the router
/// without going through a webhook delivery.
pub(crate) async fn classify(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Json(input): Json<ClassifyInput>,
) -> Response {
    let task = TaskInput {
        title: input.title,
        description: input.description,
        hint: None,
    };
    match route_task(&task, state.model.as_ref()).await {
        Ok(kind) => Json(ClassifyOutput { complexity: kind }).into_response(),
        Err(err) => error_response(
            StatusCode::BAD_GATEWAY,
            "classification_failed",
            err.to_string(),
            Some(correlation.0),
        ),
    }
}
