use super::{GenerativeModel, ModelError, ModelInput, ModelResponse};
use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard};

/// Scripted reply for [`MockModel`]
#[derive(Debug, Clone)]
pub enum MockReply {
    Response(ModelResponse),
    Error(String),
}

/// In-process model used in place of Gemini.
///
/// Replies are served in order and wrap around; every input is recorded.
pub struct MockModel {
    replies: Mutex<Vec<MockReply>>,
    calls: Mutex<Vec<ModelInput>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockModel {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Reply through the text accessor
    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_response(ModelResponse::Text(text.into()))
    }

    pub fn with_response(self, response: ModelResponse) -> Self {
        lock(&self.replies).push(MockReply::Response(response));
        self
    }

    pub fn with_error(self, message: impl Into<String>) -> Self {
        lock(&self.replies).push(MockReply::Error(message.into()));
        self
    }

    pub fn calls(&self) -> Vec<ModelInput> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }
}

impl Default for MockModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerativeModel for MockModel {
    async fn generate_content(&self, input: ModelInput) -> Result<ModelResponse, ModelError> {
        let count = {
            let mut calls = lock(&self.calls);
            calls.push(input);
            calls.len()
        };

        let replies = lock(&self.replies);
        if replies.is_empty() {
            return Ok(ModelResponse::Text(String::new()));
        }

        match &replies[(count - 1) % replies.len()] {
            MockReply::Response(response) => Ok(response.clone()),
            MockReply::Error(message) => Err(ModelError::Upstream(message.clone())),
        }
    }
}
