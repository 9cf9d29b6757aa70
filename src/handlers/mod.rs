//! HTTP request handlers for gemini-relay

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::gemini::{GenerativeModel, ModelInput, ModelResponse};
use crate::metrics::{Metrics, ModelOutcome};
use crate::upload::UploadStore;
use std::sync::Arc;
use std::time::Instant;

pub mod extractor;
pub mod fallback;
pub mod health;
pub mod media;
pub mod metrics;
pub mod text;

/// Application state shared across all handlers
///
/// The model client is built once at startup and injected here, so tests can
/// swap in a mock. Everything is Arc'd for cheap cloning across handlers.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    model: Arc<dyn GenerativeModel>,
    uploads: Arc<UploadStore>,
    metrics: Metrics,
}

impl AppState {
    /// Create state, making sure the upload directory exists
    pub fn new(config: Arc<Config>, model: Arc<dyn GenerativeModel>) -> AppResult<Self> {
        let uploads = UploadStore::new(&config.api.upload_dir).map_err(|e| {
            AppError::Config(format!(
                "could not create upload directory '{}': {}",
                config.api.upload_dir.display(),
                e
            ))
        })?;
        let metrics = Metrics::new()
            .map_err(|e| AppError::Internal(format!("Failed to initialize metrics: {}", e)))?;

        Ok(Self {
            config,
            model,
            uploads: Arc::new(uploads),
            metrics,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn uploads(&self) -> &UploadStore {
        &self.uploads
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Call the model once, recording outcome and latency
    pub async fn generate(&self, input: ModelInput) -> AppResult<ModelResponse> {
        let started = Instant::now();
        let result = self.model.generate_content(input).await;

        let outcome = if result.is_ok() {
            ModelOutcome::Success
        } else {
            ModelOutcome::Failure
        };
        self.metrics.record_model_call(outcome, started.elapsed());

        Ok(result?)
    }
}
