//! Gemini REST client

use super::types::GenerateContentResponse;
use super::{GenerativeModel, ModelError, ModelInput, ModelResponse};
use crate::config::GeminiConfig;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Client for a single Gemini model.
///
/// Built once at startup and shared by every request.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    timeout: Option<Duration>,
}

impl GeminiClient {
    /// `model` may be given with or without the `models/` prefix.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        let model = model.into();
        let model = model.strip_prefix("models/").unwrap_or(&model).to_string();

        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
        }
    }

    pub fn from_config(config: &GeminiConfig) -> Self {
        let client = Self::new(config.api_key.clone(), config.model.clone())
            .with_base_url(config.base_url.clone());
        match config.request_timeout_seconds {
            Some(seconds) => client.with_timeout(Duration::from_secs(seconds)),
            None => client,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Configured model ID without the `models/` prefix
    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

/// Pull `error.message` out of a Gemini error body, or fall back to the raw text.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .pointer("/error/message")
                .and_then(|message| message.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate_content(&self, input: ModelInput) -> Result<ModelResponse, ModelError> {
        let url = self.endpoint();
        let request = input.into_request();

        tracing::debug!(model = %self.model, "Sending generateContent request to Gemini");

        let mut builder = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(|source| {
            tracing::error!("Failed to send request to Gemini: {}", source);
            ModelError::Transport {
                url: url.clone(),
                source,
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Gemini API error (status {}): {}", status, body);
            return Err(ModelError::Api {
                url,
                status,
                message: api_error_message(&body),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|source| ModelError::Transport {
                url: url.clone(),
                source,
            })?;
        let payload: GenerateContentResponse = serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse Gemini response: {}\nBody: {}", e, body);
            ModelError::Decode(e.to_string())
        })?;

        ModelResponse::from_payload(payload)
    }
}
