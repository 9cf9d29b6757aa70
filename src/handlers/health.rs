//! Liveness endpoints (`GET /` and `GET /api`)

use axum::http::StatusCode;

/// Plain-text "server is running" response
pub async fn handler(message: &'static str) -> (StatusCode, &'static str) {
    (StatusCode::OK, message)
}
