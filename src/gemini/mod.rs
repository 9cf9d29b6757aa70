//! Model-call adapter for the Gemini `generateContent` API
//!
//! Handlers only see the [`GenerativeModel`] trait. Production wires in
//! [`GeminiClient`]; tests substitute [`MockModel`].

pub mod client;
pub mod mock;
pub mod response;
pub mod types;

pub use client::GeminiClient;
pub use mock::MockModel;
pub use response::{Fallback, ModelResponse, NO_OUTPUT_SENTINEL, ResponseText};
pub use types::{
    Candidate, Content, GenerateContentRequest, GenerateContentResponse, InlineData, Part,
    PromptFeedback,
};

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;

/// Failure of a single model call
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Error fetching from {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Error fetching from {url}: [{status}] {message}")]
    Api {
        url: String,
        status: reqwest::StatusCode,
        message: String,
    },

    #[error("Failed to parse Gemini response: {0}")]
    Decode(String),

    #[error("Response was blocked due to {0}")]
    Blocked(String),

    /// Failure reported by a backend that is not the Gemini REST client
    #[error("{0}")]
    Upstream(String),
}

/// One model call: an optional inline binary part followed by a prompt
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInput {
    pub inline: Option<InlineData>,
    pub prompt: String,
}

impl ModelInput {
    /// Text-only input
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            inline: None,
            prompt: prompt.into(),
        }
    }

    /// Multimodal input; `bytes` are base64-encoded here.
    pub fn with_inline(prompt: impl Into<String>, bytes: &[u8], mime_type: impl Into<String>) -> Self {
        Self {
            inline: Some(InlineData {
                mime_type: mime_type.into(),
                data: STANDARD.encode(bytes),
            }),
            prompt: prompt.into(),
        }
    }

    /// Build the request body. The inline part always precedes the prompt.
    pub fn into_request(self) -> GenerateContentRequest {
        let mut parts = Vec::with_capacity(2);
        if let Some(inline_data) = self.inline {
            parts.push(Part::InlineData { inline_data });
        }
        parts.push(Part::Text { text: self.prompt });

        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts,
            }],
        }
    }
}

/// Anything that can answer a prompt
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    async fn generate_content(&self, input: ModelInput) -> Result<ModelResponse, ModelError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_input_has_single_text_part() {
        let request = ModelInput::text("hello").into_request();
        assert_eq!(request.contents.len(), 1);
        assert_eq!(request.contents[0].role.as_deref(), Some("user"));
        assert_eq!(
            request.contents[0].parts,
            vec![Part::Text {
                text: "hello".to_string()
            }]
        );
    }

    #[test]
    fn test_inline_input_places_binary_before_prompt() {
        let request = ModelInput::with_inline("Analyze this image", b"hi", "image/png").into_request();
        let json = serde_json::to_value(&request).unwrap();
        let parts = &json["contents"][0]["parts"];

        assert_eq!(parts[0]["inlineData"]["data"], "aGk=");
        assert_eq!(parts[0]["inlineData"]["mimeType"], "image/png");
        assert_eq!(parts[1]["text"], "Analyze this image");
    }
}
