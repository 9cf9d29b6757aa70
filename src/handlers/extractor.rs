//! Request body extractor for prompt endpoints
//!
//! Accepts `application/json` and `application/x-www-form-urlencoded` bodies.
//! Anything else, and an empty JSON body, reads as an empty object so the
//! handler reports the missing field rather than a content-type error.

use crate::error::{AppError, AppResult};
use axum::{
    Form, Json,
    body::Bytes,
    extract::{FromRequest, Request},
    http::{HeaderMap, header},
};
use serde_json::{Map, Value};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyKind {
    Json,
    Form,
    Other,
}

impl BodyKind {
    fn of(headers: &HeaderMap) -> Self {
        let Some(content_type) = headers
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
        else {
            return Self::Other;
        };

        let mime = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        if mime == "application/json" || mime.ends_with("+json") {
            Self::Json
        } else if mime == "application/x-www-form-urlencoded" {
            Self::Form
        } else {
            Self::Other
        }
    }
}

/// Parsed request body, looked up by field name
#[derive(Debug, Clone, PartialEq)]
pub struct BodyFields(Value);

impl BodyFields {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    fn empty() -> Self {
        Self(Value::Object(Map::new()))
    }

    /// The field's text, if present and non-empty.
    ///
    /// Missing, `null`, `""`, `false`, and `0` all count as absent and yield
    /// `missing_message`. Any other non-string value is rejected.
    pub fn required_text(&self, field: &str, missing_message: &str) -> AppResult<String> {
        match self.0.get(field) {
            Some(Value::String(text)) if !text.is_empty() => Ok(text.clone()),
            None | Some(Value::Null) | Some(Value::String(_)) | Some(Value::Bool(false)) => {
                Err(AppError::Validation(missing_message.to_string()))
            }
            Some(Value::Number(n)) if n.as_f64() == Some(0.0) => {
                Err(AppError::Validation(missing_message.to_string()))
            }
            Some(_) => Err(AppError::Validation(format!("{} must be a string", field))),
        }
    }
}

impl<S> FromRequest<S> for BodyFields
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match BodyKind::of(req.headers()) {
            BodyKind::Json => {
                let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
                    AppError::Rejected {
                        status: rejection.status(),
                        message: rejection.body_text(),
                    }
                })?;

                if bytes.iter().all(u8::is_ascii_whitespace) {
                    return Ok(Self::empty());
                }

                let Json(value) = Json::<Value>::from_bytes(&bytes).map_err(|rejection| {
                    AppError::Rejected {
                        status: rejection.status(),
                        message: rejection.body_text(),
                    }
                })?;
                Ok(Self(value))
            }
            BodyKind::Form => {
                let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
                    .await
                    .map_err(|rejection| AppError::Rejected {
                        status: rejection.status(),
                        message: rejection.body_text(),
                    })?;
                Ok(Self(Value::Object(
                    fields
                        .into_iter()
                        .map(|(key, value)| (key, Value::String(value)))
                        .collect(),
                )))
            }
            BodyKind::Other => Ok(Self::empty()),
        }
    }
}
