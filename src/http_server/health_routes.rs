//! Health HTTP Routes
//!
//! Liveness endpoints. Both are stateless and always succeed.

use axum::{http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use tracing::info;

/// Status response
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

/// Create health routes: `/` and `/health`
pub fn health_routes<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
}

/// Root handler
async fn root_handler() -> impl IntoResponse {
    status_response("Up")
}

/// Health check handler
async fn health_handler() -> impl IntoResponse {
    status_response("Healthy")
}

fn status_response(status: &'static str) -> impl IntoResponse {
    info!(status, "status pinged");
    (StatusCode::OK, Json(StatusResponse { status }))
}
