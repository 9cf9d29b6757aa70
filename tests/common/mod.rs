//! Shared fixtures for router integration tests

#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response, header},
};
use gemini_relay::{
    config::{Config, Variant},
    gemini::MockModel,
    handlers::AppState,
    routes,
};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

pub const BOUNDARY: &str = "relay-test-boundary";

/// Router backed by a mock model, with uploads going to a private temp dir
pub struct TestApp {
    pub router: Router,
    pub model: Arc<MockModel>,
    pub uploads: TempDir,
}

impl TestApp {
    pub fn upload_count(&self) -> usize {
        std::fs::read_dir(self.uploads.path())
            .expect("upload dir should exist")
            .count()
    }
}

pub fn test_config(variant: Variant, upload_dir: &Path) -> Config {
    let mut config = Config::default();
    config.gemini.api_key = "test-key".to_string();
    config.api.variant = variant;
    config.api.upload_dir = upload_dir.to_path_buf();
    config
}

pub fn build_app(config: Config, model: MockModel, uploads: TempDir) -> TestApp {
    let model = Arc::new(model);
    let state = AppState::new(Arc::new(config), model.clone()).expect("state should build");
    let router = routes::router(state).expect("router should build");
    TestApp {
        router,
        model,
        uploads,
    }
}

pub fn app(variant: Variant, model: MockModel) -> TestApp {
    let uploads = TempDir::new().expect("temp dir");
    let config = test_config(variant, uploads.path());
    build_app(config, model, uploads)
}

pub fn json_request(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// One part of a hand-built multipart body
pub enum FormPart<'a> {
    File {
        name: &'a str,
        filename: &'a str,
        content_type: &'a str,
        data: &'a [u8],
    },
    Text {
        name: &'a str,
        value: &'a str,
    },
}

pub fn multipart_request(uri: &str, parts: &[FormPart<'_>]) -> Request<Body> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            FormPart::File {
                name,
                filename,
                content_type,
                data,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                         Content-Type: {}\r\n\r\n",
                        name, filename, content_type
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
            FormPart::Text { name, value } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"\r\n\r\n{}",
                        name, value
                    )
                    .as_bytes(),
                );
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
