//! Integration tests for the Gemini REST client against a local mock server

use gemini_relay::gemini::{
    GeminiClient, GenerativeModel, ModelError, ModelInput, ModelResponse, ResponseText,
};
use serde_json::{Value, json};
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ENDPOINT: &str = "/v1beta/models/gemini-1.5-flash:generateContent";

fn client_for(server: &MockServer) -> GeminiClient {
    GeminiClient::new("test-key", "gemini-1.5-flash").with_base_url(server.uri())
}

fn text_reply(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    })
}

#[tokio::test]
async fn test_text_prompt_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(header("x-goog-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_reply("hi there")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let response = client
        .generate_content(ModelInput::text("hello"))
        .await
        .expect("request should succeed");

    assert_eq!(response, ModelResponse::Text("hi there".to_string()));

    let requests = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(
        body,
        json!({ "contents": [{ "role": "user", "parts": [{ "text": "hello" }] }] })
    );
}

#[tokio::test]
async fn test_inline_part_precedes_prompt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_reply("a cat")))
        .mount(&server)
        .await;

    let client = client_for(&server);
    client
        .generate_content(ModelInput::with_inline("Analyze this image", b"abc", "image/png"))
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(
        body["contents"][0]["parts"],
        json!([
            { "inlineData": { "mimeType": "image/png", "data": "YWJj" } },
            { "text": "Analyze this image" }
        ])
    );
}

#[tokio::test]
async fn test_model_prefix_is_stripped() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_reply("ok")))
        .expect(1)
        .mount(&server)
        .await;

    let client = GeminiClient::new("test-key", "models/gemini-1.5-flash")
        .with_base_url(format!("{}/", server.uri()));
    assert_eq!(client.model(), "gemini-1.5-flash");

    client
        .generate_content(ModelInput::text("hello"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_multiple_text_parts_are_joined() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": { "parts": [{ "text": "Hello, " }, { "text": "world" }] }
            }]
        })))
        .mount(&server)
        .await;

    let response = client_for(&server)
        .generate_content(ModelInput::text("hi"))
        .await
        .unwrap();

    assert_eq!(response, ModelResponse::Text("Hello, world".to_string()));
}

#[tokio::test]
async fn test_api_error_message_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "code": 400,
                "message": "API key not valid. Please pass a valid API key.",
                "status": "INVALID_ARGUMENT"
            }
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .generate_content(ModelInput::text("hi"))
        .await
        .unwrap_err();

    match &err {
        ModelError::Api {
            status, message, ..
        } => {
            assert_eq!(status.as_u16(), 400);
            assert_eq!(message, "API key not valid. Please pass a valid API key.");
        }
        other => panic!("expected Api error, got {:?}", other),
    }
    assert!(err.to_string().contains("[400 Bad Request]"));
    assert!(err.to_string().contains(ENDPOINT));
}

#[tokio::test]
async fn test_no_candidates_yields_nested_shape() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let response = client_for(&server)
        .generate_content(ModelInput::text("hi"))
        .await
        .unwrap();

    assert!(matches!(response, ModelResponse::Candidates(_)));
    assert_eq!(ResponseText::resolve(response), ResponseText::Missing);
}

#[tokio::test]
async fn test_blocked_prompt_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .generate_content(ModelInput::text("hi"))
        .await
        .unwrap_err();

    assert!(matches!(err, ModelError::Blocked(ref reason) if reason == "SAFETY"));
    assert_eq!(err.to_string(), "Response was blocked due to SAFETY");
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .generate_content(ModelInput::text("hi"))
        .await
        .unwrap_err();

    assert!(matches!(err, ModelError::Decode(_)));
}

#[tokio::test]
async fn test_timeout_is_enforced_when_configured() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(text_reply("late"))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let client = client_for(&server)
        .with_timeout(Duration::from_millis(100));
    let err = client
        .generate_content(ModelInput::text("hi"))
        .await
        .unwrap_err();

    match err {
        ModelError::Transport { source, .. } => assert!(source.is_timeout()),
        other => panic!("expected Transport error, got {:?}", other),
    }
}
