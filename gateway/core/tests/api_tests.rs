// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! HTTP surface tests driven through the axum router.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use gateway_core::application::{EmbeddingService, GenerationService};
use gateway_core::domain::gateway_config::{GatewayConfig, ProviderConfig};
use gateway_core::domain::llm::ProviderKind;
use gateway_core::infrastructure::llm::ProviderRegistry;
use gateway_core::presentation::{app, AppState};
use metrics_exporter_prometheus::PrometheusBuilder;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

/// Configuration with the given providers pointed at `url`
fn config(url: &str, providers: &[ProviderKind]) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.spec.providers = providers
        .iter()
        .map(|kind| ProviderConfig {
            api_key: Some("test-key".to_string()),
            endpoint: Some(url.to_string()),
            ..ProviderConfig::new(*kind)
        })
        .collect();
    config
}

fn state_for(config: &GatewayConfig) -> AppState {
    let registry = Arc::new(ProviderRegistry::from_config_with_env(config, |_| None));
    let generation = GenerationService::new(registry.clone(), config.fallback())
        .with_default_provider(config.default_provider());
    AppState::new(Arc::new(generation), Arc::new(EmbeddingService::new(registry)))
}

fn router(url: &str, providers: &[ProviderKind]) -> axum::Router {
    app(state_for(&config(url, providers)))
}

async fn send(router: axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_generate(body: &str) -> Request<Body> {
    post("/llm/generate", body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_generate_success() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/v1beta/models/gemini-2.5-flash-lite:generateContent")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "candidates": [{"content": {"parts": [{"text": "hi"}]}, "finishReason": "STOP"}],
                "usageMetadata": {"promptTokenCount": 1, "candidatesTokenCount": 1}
            })
            .to_string(),
        )
        .create_async()
        .await;

    let body = json!({
        "prompt": "hello",
        "provider": "google",
        "model": "gemini-2.5-flash-lite",
        "temperature": 0.3
    });
    let (status, body) = send(router(&server.url(), &[ProviderKind::Google]), post_generate(&body.to_string())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"], "hi");
    assert_eq!(body["provider"], "google");
    assert_eq!(body["model"], "gemini-2.5-flash-lite");
    assert_eq!(body["usage"]["total_tokens"], 2);
    assert!(body["request_id"].is_string());
}

#[tokio::test]
async fn test_vendor_auth_failure_is_bad_gateway() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(401)
        .with_body(json!({"error": {"message": "Incorrect API key provided"}}).to_string())
        .create_async()
        .await;

    let (status, body) = send(
        router(&server.url(), &[ProviderKind::OpenAI]),
        post_generate(r#"{"prompt": "hello", "provider": "openai"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["success"], false);
    assert_eq!(body["error_code"], "PROVIDER_AUTH_ERROR");
    assert_eq!(body["details"]["provider"], "openai");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_error_envelope_statuses() {
    let cases = [
        (r#"{"prompt": "hello", "temperature": 3.0}"#, StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        (r#"{"prompt": "hello", "max_tokens": 0}"#, StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        (r#"{"prompt": "hello", "stream": true}"#, StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        (r#"{"prompt": "hello", "provider": "openai", "use_search": true}"#, StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        (r#"{"prompt": "hello", "provider": "bedrock"}"#, StatusCode::INTERNAL_SERVER_ERROR, "CONFIGURATION_ERROR"),
        (r#"{"prompt": "hello""#, StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        (r#"{"provider": "google"}"#, StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
    ];

    for (request, expected_status, expected_code) in cases {
        let (status, body) = send(
            router("http://127.0.0.1:9", &ProviderKind::ALL),
            post_generate(request),
        )
        .await;
        assert_eq!(status, expected_status, "request {}", request);
        assert_eq!(body["error_code"], expected_code, "request {}", request);
        assert_eq!(body["success"], false);
    }
}

#[tokio::test]
async fn test_providers_listing() {
    let (status, body) = send(router("http://127.0.0.1:9", &[ProviderKind::Google]), get("/llm/providers")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let providers = &body["data"]["providers"];
    assert_eq!(providers["google"]["enabled"], true);
    assert_eq!(providers["google"]["default_model"], "gemini-3-flash-preview");
    assert_eq!(providers["openai"]["enabled"], false);
    assert_eq!(providers["openai"]["display_name"], "OpenAI");
}

#[tokio::test]
async fn test_models_listing() {
    let (status, body) = send(router("http://127.0.0.1:9", &ProviderKind::ALL), get("/llm/models?provider=openai")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"]["models"]["openai"],
        json!(["gpt-4-turbo", "gpt-4", "gpt-3.5-turbo"])
    );
    assert!(body["data"]["models"].get("google").is_none());

    let (_, body) = send(router("http://127.0.0.1:9", &ProviderKind::ALL), get("/llm/models")).await;
    assert_eq!(body["data"]["models"].as_object().unwrap().len(), 2);

    let (status, body) = send(router("http://127.0.0.1:9", &ProviderKind::ALL), get("/llm/models?provider=cohere")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_liveness() {
    let (status, body) = send(router("http://127.0.0.1:9", &[]), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "llm-gateway");
    assert!(body["uptime_seconds"].is_u64());
}

#[tokio::test]
async fn test_readiness_reflects_provider_health() {
    let mut server = mockito::Server::new_async().await;
    let _google = server
        .mock("GET", "/v1beta/models")
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let (status, body) = send(router(&server.url(), &[ProviderKind::Google]), get("/health/detailed")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["providers"]["google"], true);

    let (status, body) = send(router(&server.url(), &[]), get("/health/detailed")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "degraded");
}

#[tokio::test]
async fn test_metrics_route_absent_without_recorder() {
    let response = router("http://127.0.0.1:9", &[])
        .oneshot(get("/metrics"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unnamed_provider_uses_configured_default() {
    let mut server = mockito::Server::new_async().await;
    let openai = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "id": "chatcmpl-9",
                "choices": [{"message": {"role": "assistant", "content": "hi"}, "finish_reason": "stop"}],
                "usage": {"prompt_tokens": 1, "completion_tokens": 1}
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let mut config = config(&server.url(), &[ProviderKind::OpenAI]);
    config.spec.selection.default_provider = Some("openai".to_string());
    config.validate().unwrap();

    let (status, body) = send(app(state_for(&config)), post_generate(r#"{"prompt": "hello"}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["provider"], "openai");
    assert_eq!(body["model"], "gpt-3.5-turbo");
    openai.assert_async().await;
}

#[tokio::test]
async fn test_embed_single_and_batch() {
    let mut server = mockito::Server::new_async().await;
    let single = server
        .mock("POST", "/v1beta/models/text-embedding-004:embedContent")
        .match_header("x-goog-api-key", "test-key")
        .match_body(mockito::Matcher::PartialJson(json!({
            "model": "models/text-embedding-004",
            "taskType": "RETRIEVAL_QUERY",
            "outputDimensionality": 768,
            "content": {"parts": [{"text": "battery suppliers"}]}
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"embedding": {"values": [0.25, -0.5, 1.0]}}).to_string())
        .expect(1)
        .create_async()
        .await;
    let batch = server
        .mock("POST", "/v1beta/models/text-embedding-004:batchEmbedContents")
        .match_body(mockito::Matcher::PartialJson(json!({
            "requests": [
                {"taskType": "RETRIEVAL_DOCUMENT", "content": {"parts": [{"text": "first"}]}},
                {"taskType": "RETRIEVAL_DOCUMENT", "content": {"parts": [{"text": "second"}]}}
            ]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"embeddings": [{"values": [0.1, 0.2]}, {"values": [0.3, 0.4]}]}).to_string())
        .expect(1)
        .create_async()
        .await;

    let (status, body) = send(
        router(&server.url(), &[ProviderKind::Google]),
        post("/embed", r#"{"text": "battery suppliers", "task_type": "query"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["embedding"], json!([0.25, -0.5, 1.0]));
    assert_eq!(body["dimensions"], 3);
    assert_eq!(body["model"], "text-embedding-004");

    let (status, body) = send(
        router(&server.url(), &[ProviderKind::Google]),
        post("/embed/batch", r#"{"texts": ["first", "second"]}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert_eq!(body["dimensions"], 2);
    assert_eq!(body["embeddings"][1], json!([0.3, 0.4]));

    single.assert_async().await;
    batch.assert_async().await;
}

#[tokio::test]
async fn test_embed_errors() {
    let mut server = mockito::Server::new_async().await;
    let vendor = server
        .mock("POST", mockito::Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let too_long = json!({"text": "x".repeat(5001)}).to_string();
    let too_many = json!({"texts": vec!["x"; 101]}).to_string();
    let cases = [
        ("/embed", r#"{"text": ""}"#.to_string(), StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        ("/embed", too_long, StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        ("/embed", r#"{"text": "x", "task_type": "cluster"}"#.to_string(), StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        ("/embed/batch", r#"{"texts": []}"#.to_string(), StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        ("/embed/batch", too_many, StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
    ];
    for (uri, request, expected_status, expected_code) in cases {
        let (status, body) = send(router(&server.url(), &[ProviderKind::Google]), post(uri, &request)).await;
        assert_eq!(status, expected_status, "{} {}", uri, request);
        assert_eq!(body["error_code"], expected_code);
    }

    // Embeddings are served by the Google provider only
    let (status, body) = send(router(&server.url(), &[ProviderKind::OpenAI]), post("/embed", r#"{"text": "x"}"#)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error_code"], "CONFIGURATION_ERROR");

    vendor.assert_async().await;
}

#[tokio::test]
async fn test_embed_health() {
    let (status, body) = send(router("http://127.0.0.1:9", &[ProviderKind::Google]), get("/embed/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["dimensions"], 768);
    assert_eq!(body["task_types"], json!(["document", "query"]));

    let (status, body) = send(router("http://127.0.0.1:9", &[]), get("/embed/health")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "unavailable");
}

#[tokio::test]
async fn test_metrics_path_on_gateway_route_is_not_mounted() {
    let handle = PrometheusBuilder::new().build_recorder().handle();
    let state = state_for(&config("http://127.0.0.1:9", &[])).with_metrics(handle, "/health");

    let (status, body) = send(app(state), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_metrics_route_with_recorder() {
    let handle = PrometheusBuilder::new().build_recorder().handle();
    let state = state_for(&config("http://127.0.0.1:9", &[])).with_metrics(handle, "/internal/metrics");

    let response = app(state).oneshot(get("/internal/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
