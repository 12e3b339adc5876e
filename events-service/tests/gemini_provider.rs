//! Gemini provider tests against a local stand-in for the Gemini API.

mod common;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use common::{test_config, TestApp};
use events_service::services::providers::gemini::{GeminiConfig, GeminiTextProvider};
use events_service::services::providers::{GenerationOptions, ProviderError, TextProvider};
use events_service::startup::Application;
use secrecy::Secret;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

#[derive(Debug, Clone)]
struct RecordedCall {
    call: String,
    api_key: Option<String>,
    body: Value,
}

#[derive(Clone)]
struct FakeGemini {
    status: StatusCode,
    reply: Value,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

async fn generate_content(
    State(fake): State<FakeGemini>,
    Path(call): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    fake.calls.lock().unwrap().push(RecordedCall {
        call,
        api_key: headers
            .get("x-goog-api-key")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body,
    });
    (fake.status, Json(fake.reply.clone()))
}

/// Start the fake Gemini API and return its base URL and call log.
async fn spawn_fake(status: StatusCode, reply: Value) -> (String, Arc<Mutex<Vec<RecordedCall>>>) {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let fake = FakeGemini {
        status,
        reply,
        calls: calls.clone(),
    };

    let router = Router::new()
        .route("/v1beta/models/:call", post(generate_content))
        .with_state(fake);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });

    (format!("http://127.0.0.1:{}/v1beta", port), calls)
}

fn provider(base_url: &str) -> GeminiTextProvider {
    GeminiTextProvider::new(GeminiConfig {
        base_url: base_url.to_string(),
        timeout: Duration::from_secs(5),
    })
    .unwrap()
}

fn options() -> GenerationOptions {
    GenerationOptions {
        model: "gemini-2.5-flash".to_string(),
        search_grounding: true,
    }
}

fn candidate(parts: Value) -> Value {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": parts},
            "finishReason": "STOP"
        }],
        "usageMetadata": {"promptTokenCount": 40, "candidatesTokenCount": 12}
    })
}

#[tokio::test]
async fn sends_grounded_request_with_key_header() {
    let (base_url, calls) = spawn_fake(StatusCode::OK, candidate(json!([{"text": "[]"}]))).await;

    let response = provider(&base_url)
        .generate(&Secret::new("secret-key".to_string()), "find events", &options())
        .await
        .unwrap();

    assert_eq!(response.text.as_deref(), Some("[]"));
    assert_eq!(response.input_tokens, 40);
    assert_eq!(response.output_tokens, 12);

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].call, "gemini-2.5-flash:generateContent");
    assert_eq!(calls[0].api_key.as_deref(), Some("secret-key"));
    assert_eq!(calls[0].body["tools"], json!([{"googleSearch": {}}]));
    assert_eq!(calls[0].body["contents"][0]["parts"][0]["text"], "find events");
}

#[tokio::test]
async fn concatenates_text_parts() {
    let parts = json!([{"text": "[{\"a\":"}, {"text": "1}]"}]);
    let (base_url, _) = spawn_fake(StatusCode::OK, candidate(parts)).await;

    let response = provider(&base_url)
        .generate(&Secret::new("k".to_string()), "p", &options())
        .await
        .unwrap();

    assert_eq!(response.text.as_deref(), Some("[{\"a\":1}]"));
}

#[tokio::test]
async fn no_candidates_means_no_text() {
    let (base_url, _) = spawn_fake(StatusCode::OK, json!({"candidates": []})).await;

    let response = provider(&base_url)
        .generate(&Secret::new("k".to_string()), "p", &options())
        .await
        .unwrap();

    assert!(response.text.is_none());
}

#[tokio::test]
async fn too_many_requests_maps_to_rate_limited() {
    let (base_url, _) = spawn_fake(
        StatusCode::TOO_MANY_REQUESTS,
        json!({"error": {"code": 429, "message": "quota"}}),
    )
    .await;

    let err = provider(&base_url)
        .generate(&Secret::new("k".to_string()), "p", &options())
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::RateLimited));
}

#[tokio::test]
async fn rejected_key_maps_to_api_error() {
    let (base_url, _) = spawn_fake(
        StatusCode::FORBIDDEN,
        json!({"error": {"code": 403, "message": "API key not valid"}}),
    )
    .await;

    let err = provider(&base_url)
        .generate(&Secret::new("bad".to_string()), "p", &options())
        .await
        .unwrap_err();

    match err {
        ProviderError::ApiError(msg) => assert!(msg.contains("403")),
        other => panic!("expected ApiError, got {:?}", other),
    }
}

#[tokio::test]
async fn safety_block_maps_to_content_filtered() {
    let (base_url, _) = spawn_fake(
        StatusCode::OK,
        json!({"candidates": [{"finishReason": "SAFETY"}]}),
    )
    .await;

    let err = provider(&base_url)
        .generate(&Secret::new("k".to_string()), "p", &options())
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::ContentFiltered));
}

#[tokio::test]
async fn unreachable_upstream_is_a_network_error() {
    // Bind then drop to get a port with nothing listening.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let err = provider(&format!("http://127.0.0.1:{}", port))
        .generate(&Secret::new("never-logged".to_string()), "p", &options())
        .await
        .unwrap_err();

    match err {
        ProviderError::NetworkError(msg) => assert!(!msg.contains("never-logged")),
        other => panic!("expected NetworkError, got {:?}", other),
    }
}

#[tokio::test]
async fn full_service_through_fake_gemini() {
    let answer = "Here you go!\n```json\n[{\"title\":\"Lantern Festival Preview\",\"city\":\"Taoyuan\"}]\n```";
    let (base_url, calls) = spawn_fake(StatusCode::OK, candidate(json!([{"text": answer}]))).await;

    let app = Application::build(test_config(Some("wire-key"), &base_url))
        .await
        .expect("Failed to build application");
    let app = TestApp::run(app).await;

    let response = reqwest::Client::new()
        .get(format!("{}/api/events", app.address))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body,
        json!([{"title": "Lantern Festival Preview", "city": "Taoyuan"}])
    );

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].api_key.as_deref(), Some("wire-key"));
    let prompt = calls[0].body["contents"][0]["parts"][0]["text"]
        .as_str()
        .unwrap();
    assert!(prompt.contains("CURRENT DATE:"));
}
