//! Cross-origin policy
//!
//! Outside production every origin is allowed. With `NODE_ENV=production`
//! only `BASE_URL` is, and credentials are allowed for it.

use crate::config::CorsConfig;
use crate::error::{AppError, AppResult};
use axum::http::{HeaderValue, Method, header};
use tower_http::cors::{Any, CorsLayer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsPolicy {
    /// `Access-Control-Allow-Origin: *`
    AllowAll,
    /// Only this origin, with credentials
    Exact(HeaderValue),
}

impl CorsPolicy {
    pub fn from_config(config: &CorsConfig) -> AppResult<Self> {
        if !config.is_production() {
            return Ok(Self::AllowAll);
        }

        match config.base_url.as_deref() {
            Some(origin) => {
                let origin = origin.trim().trim_end_matches('/');
                HeaderValue::from_str(origin).map(Self::Exact).map_err(|_| {
                    AppError::Config(format!("BASE_URL '{}' is not a valid origin", origin))
                })
            }
            None => {
                tracing::warn!("NODE_ENV is production but BASE_URL is unset, allowing all origins");
                Ok(Self::AllowAll)
            }
        }
    }

    pub fn layer(&self) -> CorsLayer {
        let layer = CorsLayer::new()
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
            ])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

        match self {
            // tower-http refuses credentials together with a wildcard origin
            Self::AllowAll => layer.allow_origin(Any),
            Self::Exact(origin) => layer.allow_origin(origin.clone()).allow_credentials(true),
        }
    }
}
