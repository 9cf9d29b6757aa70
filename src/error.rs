//! Error types for gemini-relay
//!
//! All HTTP-facing errors implement `IntoResponse` and render as
//! `{"error": "..."}` with the matching status code.

use crate::gemini::ModelError;
use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Message used for every 404, matching the generated not-found error text.
pub const NOT_FOUND_MESSAGE: &str = "Not Found";

/// Body used by routes that hide upstream failure details.
pub const GENERIC_ERROR_MESSAGE: &str = "Internal server error";

/// Main error type for the application
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read config file '{path}': {source}")]
    ConfigFileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse TOML config '{path}': {source}")]
    ConfigParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration in '{path}': {reason}")]
    ConfigValidationFailed { path: String, reason: String },

    /// Client input error. The message is returned to the caller verbatim.
    #[error("{0}")]
    Validation(String),

    #[error("{}", NOT_FOUND_MESSAGE)]
    NotFound,

    /// Body the framework could not accept (size limit, unreadable stream)
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },

    #[error(transparent)]
    Model(#[from] ModelError),

    /// Malformed or oversized multipart body
    #[error("{}", .0.body_text())]
    Multipart(#[from] MultipartError),

    #[error("Failed to process uploaded file: {0}")]
    Upload(String),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status this error maps to
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Rejected { status, .. } => *status,
            Self::Multipart(e) => e.status(),
            Self::Config(_)
            | Self::ConfigFileRead { .. }
            | Self::ConfigParseFailed { .. }
            | Self::ConfigValidationFailed { .. }
            | Self::Model(_)
            | Self::Upload(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({
            "error": self.to_string(),
        }));

        (self.status(), body).into_response()
    }
}

/// How much of a server-side failure a route reveals to its caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorExposure {
    /// Return the underlying error text
    Raw,
    /// Replace 5xx bodies with [`GENERIC_ERROR_MESSAGE`]
    Generic,
}

impl ErrorExposure {
    /// Apply the exposure policy. Client errors (4xx) pass through untouched.
    pub fn apply(self, err: AppError) -> AppError {
        match self {
            Self::Raw => err,
            Self::Generic if err.status().is_server_error() => {
                AppError::Internal(GENERIC_ERROR_MESSAGE.to_string())
            }
            Self::Generic => err,
        }
    }
}

/// Convenience type alias for Results
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_validation_error_displays_message_verbatim() {
        let err = AppError::Validation("Message is required".to_string());
        assert_eq!(err.to_string(), "Message is required");
    }

    #[test]
    fn test_config_error_creates() {
        let err = AppError::Config("test error".to_string());
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[tokio::test]
    async fn test_validation_error_response() {
        let (status, body) = body_json(AppError::Validation("bad".to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, serde_json::json!({ "error": "bad" }));
    }

    #[tokio::test]
    async fn test_not_found_response() {
        let (status, body) = body_json(AppError::NotFound).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Not Found");
    }

    #[tokio::test]
    async fn test_model_error_exposes_raw_message() {
        let err = AppError::Model(ModelError::Blocked("SAFETY".to_string()));
        let expected = err.to_string();
        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], expected);
    }

    #[test]
    fn test_generic_exposure_hides_server_errors() {
        let err = ErrorExposure::Generic.apply(AppError::Upload("disk gone".to_string()));
        assert_eq!(err.to_string(), GENERIC_ERROR_MESSAGE);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_generic_exposure_keeps_client_errors() {
        let err = ErrorExposure::Generic.apply(AppError::Validation("Message is required".into()));
        assert_eq!(err.to_string(), "Message is required");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_raw_exposure_is_identity() {
        let err = ErrorExposure::Raw.apply(AppError::Internal("boom".to_string()));
        assert_eq!(err.to_string(), "boom");
    }
}
