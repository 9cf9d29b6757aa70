//! Route tables and router assembly
//!
//! Both server variants are described by a static table of [`RouteSpec`]s.
//! Each entry carries its own validation message, response envelope, error
//! exposure, and text fallback, so the two variants differ only in data.

use crate::config::Variant;
use crate::cors::CorsPolicy;
use crate::error::{AppResult, ErrorExposure};
use crate::gemini::{Fallback, ModelResponse, ResponseText};
use crate::handlers::{self, AppState, extractor::BodyFields};
use crate::middleware::request_log_middleware;
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State, multipart::MultipartRejection},
    handler::HandlerWithoutStateExt,
    http::Method,
    middleware,
    routing::{get, post},
};
use tower_http::{services::ServeDir, trace::TraceLayer};

/// Key the model's text is returned under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Envelope {
    /// `{"output": ...}`
    Output,
    /// `{"response": ...}`
    Response,
}

impl Envelope {
    pub fn key(self) -> &'static str {
        match self {
            Envelope::Output => "output",
            Envelope::Response => "response",
        }
    }

    pub fn wrap(self, text: String) -> serde_json::Value {
        let mut body = serde_json::Map::new();
        body.insert(self.key().to_string(), serde_json::Value::String(text));
        serde_json::Value::Object(body)
    }
}

/// How a route turns a model result into an HTTP response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reply {
    pub envelope: Envelope,
    pub exposure: ErrorExposure,
    pub fallback: Fallback,
}

impl Reply {
    /// `context` names the operation in the error log, e.g. "generating text".
    pub fn render(
        self,
        result: AppResult<ModelResponse>,
        context: &str,
    ) -> AppResult<Json<serde_json::Value>> {
        match result {
            Ok(response) => {
                let text = ResponseText::resolve(response).into_output(self.fallback);
                Ok(Json(self.envelope.wrap(text)))
            }
            Err(e) => {
                tracing::error!(error = %e, "Error {}", context);
                Err(self.exposure.apply(e))
            }
        }
    }
}

/// JSON or form endpoint with one required text field
#[derive(Debug, Clone, Copy)]
pub struct TextRoute {
    pub field: &'static str,
    pub missing_message: &'static str,
    pub reply: Reply,
    pub context: &'static str,
}

/// Multipart endpoint with one required file and an optional `prompt`
#[derive(Debug, Clone, Copy)]
pub struct MediaRoute {
    pub field: &'static str,
    pub missing_message: &'static str,
    pub default_prompt: &'static str,
    pub reply: Reply,
    pub context: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub enum Endpoint {
    /// `GET`, plain-text liveness message
    Health(&'static str),
    /// `POST` with a JSON or form body
    Text(TextRoute),
    /// `POST` with a multipart body
    Media(MediaRoute),
}

#[derive(Debug, Clone, Copy)]
pub struct RouteSpec {
    pub path: &'static str,
    pub endpoint: Endpoint,
}

impl RouteSpec {
    pub fn method(&self) -> Method {
        match self.endpoint {
            Endpoint::Health(_) => Method::GET,
            Endpoint::Text(_) | Endpoint::Media(_) => Method::POST,
        }
    }
}

const GENERATE_REPLY: Reply = Reply {
    envelope: Envelope::Output,
    exposure: ErrorExposure::Raw,
    fallback: Fallback::Sentinel,
};

const CHAT_REPLY: Reply = Reply {
    envelope: Envelope::Response,
    exposure: ErrorExposure::Generic,
    fallback: Fallback::AccessorOnly,
};

/// Text, image, document, and audio generation
pub const GENERATE_ROUTES: &[RouteSpec] = &[
    RouteSpec {
        path: "/",
        endpoint: Endpoint::Health("Gemini Flash API is running"),
    },
    RouteSpec {
        path: "/generate-text",
        endpoint: Endpoint::Text(TextRoute {
            field: "prompt",
            missing_message: "Prompt is required in the request body.",
            reply: GENERATE_REPLY,
            context: "generating text",
        }),
    },
    RouteSpec {
        path: "/generate-from-image",
        endpoint: Endpoint::Media(MediaRoute {
            field: "image",
            missing_message: "No image file uploaded",
            default_prompt: "Analyze this image",
            reply: GENERATE_REPLY,
            context: "generating content from image",
        }),
    },
    RouteSpec {
        path: "/generate-from-document",
        endpoint: Endpoint::Media(MediaRoute {
            field: "document",
            missing_message: "No file uploaded",
            default_prompt: "Analyze this document",
            reply: GENERATE_REPLY,
            context: "generating content from document",
        }),
    },
    RouteSpec {
        path: "/generate-from-audio",
        endpoint: Endpoint::Media(MediaRoute {
            field: "audio",
            missing_message: "No file uploaded",
            default_prompt: "Analyze this audio",
            reply: GENERATE_REPLY,
            context: "generating content from audio",
        }),
    },
];

/// Chat API backing the static chat page
pub const CHAT_ROUTES: &[RouteSpec] = &[
    RouteSpec {
        path: "/api",
        endpoint: Endpoint::Health("Server API is running"),
    },
    RouteSpec {
        path: "/api/chat",
        endpoint: Endpoint::Text(TextRoute {
            field: "message",
            missing_message: "Message is required",
            reply: CHAT_REPLY,
            context: "generating chat response",
        }),
    },
];

pub fn table(variant: Variant) -> &'static [RouteSpec] {
    match variant {
        Variant::Generate => GENERATE_ROUTES,
        Variant::Chat => CHAT_ROUTES,
    }
}

/// Build the full application: route table, static files, 404s, and the
/// front-door layers (request log, trace, CORS, body limit).
pub fn router(state: AppState) -> AppResult<Router> {
    let config = state.config();
    let cors = CorsPolicy::from_config(&config.cors)?;
    let mut router: Router<AppState> = Router::new();

    for spec in table(config.api.variant) {
        router = match spec.endpoint {
            Endpoint::Health(message) => {
                router.route(spec.path, get(move || handlers::health::handler(message)))
            }
            Endpoint::Text(route) => router.route(
                spec.path,
                post(move |State(state): State<AppState>, body: BodyFields| {
                    handlers::text::handler(state, route, body)
                }),
            ),
            Endpoint::Media(route) => router.route(
                spec.path,
                post(
                    move |State(state): State<AppState>,
                          multipart: Result<Multipart, MultipartRejection>| {
                        handlers::media::handler(state, route, multipart)
                    },
                ),
            ),
        };
    }

    if config.observability.metrics_enabled {
        router = router.route("/metrics", get(handlers::metrics::handler));
    }

    router = match config.api.static_root() {
        Some(root) => {
            tracing::info!("Serving static files from {}", root.display());
            let assets = ServeDir::new(root)
                .call_fallback_on_method_not_allowed(true)
                .not_found_service(handlers::fallback::not_found.into_service());
            router.fallback_service(assets)
        }
        None => router.fallback(handlers::fallback::not_found),
    };

    let max_body = config.server.max_upload_bytes;

    Ok(router
        .method_not_allowed_fallback(handlers::fallback::not_found)
        .layer(DefaultBodyLimit::max(max_body))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            request_log_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors.layer())
        .with_state(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[test]
    fn test_generate_table_paths() {
        let paths: Vec<_> = GENERATE_ROUTES.iter().map(|r| r.path).collect();
        assert_eq!(
            paths,
            vec![
                "/",
                "/generate-text",
                "/generate-from-image",
                "/generate-from-document",
                "/generate-from-audio"
            ]
        );
    }

    #[test]
    fn test_chat_table_paths_and_methods() {
        let routes: Vec<_> = CHAT_ROUTES.iter().map(|r| (r.method(), r.path)).collect();
        assert_eq!(
            routes,
            vec![(Method::GET, "/api"), (Method::POST, "/api/chat")]
        );
    }

    #[test]
    fn test_table_selects_variant() {
        assert_eq!(table(Variant::Generate).len(), GENERATE_ROUTES.len());
        assert_eq!(table(Variant::Chat).len(), CHAT_ROUTES.len());
    }

    #[test]
    fn test_envelope_wrap() {
        assert_eq!(
            Envelope::Output.wrap("hi".to_string()),
            serde_json::json!({ "output": "hi" })
        );
        assert_eq!(
            Envelope::Response.wrap("hi".to_string()),
            serde_json::json!({ "response": "hi" })
        );
    }

    #[test]
    fn test_chat_reply_hides_model_errors() {
        let err = AppError::Model(crate::gemini::ModelError::Upstream("quota".to_string()));
        let rendered = CHAT_REPLY.render(Err(err), "testing").unwrap_err();
        assert_eq!(rendered.to_string(), "Internal server error");
    }

    #[test]
    fn test_generate_reply_keeps_model_errors() {
        let err = AppError::Model(crate::gemini::ModelError::Upstream("quota".to_string()));
        let rendered = GENERATE_REPLY.render(Err(err), "testing").unwrap_err();
        assert_eq!(rendered.to_string(), "quota");
    }

    #[test]
    fn test_generate_reply_uses_sentinel() {
        let Json(body) = GENERATE_REPLY
            .render(Ok(ModelResponse::Candidates(Default::default())), "testing")
            .unwrap();
        assert_eq!(body, serde_json::json!({ "output": "No output from Gemini API" }));
    }
}
