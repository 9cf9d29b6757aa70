//! Model responses and plain-text extraction
//!
//! A backend hands back one of two shapes: text it already resolved through
//! its accessor, or the raw nested `candidates` payload. Extraction checks the
//! accessor first, then `candidates[0].content.parts[0].text`, then falls back.

use super::ModelError;
use super::types::GenerateContentResponse;

/// Returned when neither shape carries any text.
pub const NO_OUTPUT_SENTINEL: &str = "No output from Gemini API";

/// Finish reasons for which Gemini withholds the candidate's text.
const BLOCKED_FINISH_REASONS: &[&str] = &[
    "SAFETY",
    "RECITATION",
    "LANGUAGE",
    "BLOCKLIST",
    "PROHIBITED_CONTENT",
    "SPII",
];

/// What a model backend returned for one call
#[derive(Debug, Clone, PartialEq)]
pub enum ModelResponse {
    /// The backend exposes a text accessor; this is its result.
    Text(String),
    /// Only the nested `candidates` structure is available.
    Candidates(GenerateContentResponse),
}

impl ModelResponse {
    /// Classify a raw Gemini payload.
    ///
    /// A payload with at least one candidate gets the accessor: the text parts
    /// of the first candidate joined together. Blocked candidates and blocked
    /// prompts are errors, like the accessor throwing.
    pub fn from_payload(payload: GenerateContentResponse) -> Result<Self, ModelError> {
        if let Some(first) = payload.candidates.first() {
            if let Some(reason) = first
                .finish_reason
                .as_deref()
                .filter(|reason| BLOCKED_FINISH_REASONS.contains(reason))
            {
                return Err(ModelError::Blocked(reason.to_string()));
            }
            return Ok(Self::Text(first.joined_text()));
        }

        if let Some(reason) = payload
            .prompt_feedback
            .as_ref()
            .and_then(|feedback| feedback.block_reason.as_deref())
        {
            return Err(ModelError::Blocked(reason.to_string()));
        }

        Ok(Self::Candidates(payload))
    }
}

/// Text found in a [`ModelResponse`], tagged with where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseText {
    Accessor(String),
    Nested(String),
    Missing,
}

/// What a route does when the accessor has nothing for it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    /// Try the nested path, then [`NO_OUTPUT_SENTINEL`].
    Sentinel,
    /// Accessor only; anything else becomes an empty string.
    AccessorOnly,
}

impl ResponseText {
    pub fn resolve(response: ModelResponse) -> Self {
        match response {
            ModelResponse::Text(text) => Self::Accessor(text),
            ModelResponse::Candidates(payload) => match payload.nested_text() {
                Some(text) => Self::Nested(text.to_string()),
                None => Self::Missing,
            },
        }
    }

    pub fn into_output(self, fallback: Fallback) -> String {
        match (self, fallback) {
            (Self::Accessor(text), _) => text,
            (Self::Nested(text), Fallback::Sentinel) => text,
            (Self::Missing, Fallback::Sentinel) => NO_OUTPUT_SENTINEL.to_string(),
            (Self::Nested(_) | Self::Missing, Fallback::AccessorOnly) => String::new(),
        }
    }
}
