//! Request logging middleware
//!
//! Every request gets a UUID, and its method, URI, headers, and (for JSON and
//! form bodies) body are logged before any handler runs. The ID is echoed in
//! the `x-request-id` response header.

use crate::error::AppError;
use crate::handlers::AppState;
use crate::metrics::UNMATCHED_ROUTE;
use axum::{
    body::{Body, to_bytes},
    extract::{MatchedPath, Request, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Request ID header name
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request ID wrapper type for Axum extensions
#[derive(Debug, Clone, Copy)]
pub struct RequestId(pub Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether the body is small structured text worth buffering for the log
fn has_text_body(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| {
            let mime = value.split(';').next().unwrap_or_default().trim();
            mime.eq_ignore_ascii_case("application/json")
                || mime.eq_ignore_ascii_case("application/x-www-form-urlencoded")
        })
        .unwrap_or(false)
}

/// Headers rendered as a JSON object
fn headers_json(headers: &HeaderMap) -> String {
    let map: BTreeMap<&str, &str> = headers
        .iter()
        .map(|(name, value)| (name.as_str(), value.to_str().unwrap_or("<binary>")))
        .collect();
    serde_json::to_string(&map).unwrap_or_default()
}

fn attach_request_id(mut response: Response, request_id: RequestId) -> Response {
    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// Middleware that logs each request and attaches a request ID
pub async fn request_log_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let request_id = RequestId::new();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| UNMATCHED_ROUTE.to_string());

    let (parts, body) = request.into_parts();

    let (body, logged_body) = if has_text_body(&parts.headers) {
        match to_bytes(body, state.config().server.max_upload_bytes).await {
            Ok(bytes) => {
                let text = String::from_utf8_lossy(&bytes).into_owned();
                (Body::from(bytes), Some(text))
            }
            Err(e) => {
                tracing::warn!(
                    request_id = %request_id,
                    error = %e,
                    "Rejected request body before handling"
                );
                let rejection = AppError::Rejected {
                    status: StatusCode::PAYLOAD_TOO_LARGE,
                    message: "request entity too large".to_string(),
                };
                state.metrics().record_request(&route, rejection.status());
                return attach_request_id(rejection.into_response(), request_id);
            }
        }
    } else {
        (body, None)
    };

    tracing::info!(
        request_id = %request_id,
        method = %parts.method,
        uri = %parts.uri,
        headers = %headers_json(&parts.headers),
        body = logged_body.as_deref().unwrap_or("-"),
        "Incoming request"
    );

    let mut request = Request::from_parts(parts, body);
    request.extensions_mut().insert(request_id);

    let response = next.run(request).await;
    state.metrics().record_request(&route, response.status());

    attach_request_id(response, request_id)
}
