// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use gateway_sdk::{
    ClientError, EmbedBatchRequest, EmbedRequest, EmbeddingTask, GatewayClient, GenerationRequest, ProviderKind,
};
use mockito::Matcher;
use serde_json::json;

#[tokio::test]
async fn test_generate_sends_bearer_and_decodes_response() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/llm/generate")
        .match_header("authorization", "Bearer sdk-key")
        .match_body(Matcher::PartialJson(json!({"prompt": "hello", "provider": "openai"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "text": "hi",
                "provider": "openai",
                "model": "gpt-3.5-turbo",
                "usage": {"prompt_tokens": 1, "completion_tokens": 1, "total_tokens": 2},
                "finish_reason": "stop",
                "metadata": {},
                "created_at": "2026-01-01T00:00:00Z",
                "request_id": "7f1c7c4e-3b8e-4c55-9d6e-0a3c2f1b9e21"
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let client = GatewayClient::new(server.url()).with_api_key("sdk-key");
    let response = client
        .generate(&GenerationRequest::new("hello", ProviderKind::OpenAI))
        .await
        .unwrap();

    assert_eq!(response.text, "hi");
    assert_eq!(response.usage.total_tokens, 2);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_error_envelope_becomes_api_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/llm/generate")
        .with_status(400)
        .with_body(
            json!({
                "success": false,
                "error": "Invalid request: temperature must be between 0.0 and 1.0, got 2",
                "error_code": "VALIDATION_ERROR",
                "timestamp": "2026-01-01T00:00:00Z"
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = GatewayClient::new(server.url());
    let err = client
        .generate(&GenerationRequest::new("hello", ProviderKind::Google).with_temperature(2.0))
        .await
        .unwrap_err();

    match err {
        ClientError::Api { status, code, .. } => {
            assert_eq!(status, 400);
            assert_eq!(code, "VALIDATION_ERROR");
        }
        other => panic!("expected API error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_listing_endpoints() {
    let mut server = mockito::Server::new_async().await;
    let _providers = server
        .mock("GET", "/llm/providers")
        .with_status(200)
        .with_body(
            json!({
                "success": true,
                "data": {"providers": {"google": {
                    "display_name": "Google Gemini",
                    "models": ["gemini-2.5-flash"],
                    "default_model": "gemini-2.5-flash",
                    "enabled": true
                }}},
                "message": "Providers retrieved successfully",
                "timestamp": "2026-01-01T00:00:00Z"
            })
            .to_string(),
        )
        .create_async()
        .await;
    let _models = server
        .mock("GET", "/llm/models")
        .match_query(Matcher::UrlEncoded("provider".into(), "openai".into()))
        .with_status(200)
        .with_body(json!({"success": true, "data": {"models": {"openai": ["gpt-4"]}}}).to_string())
        .create_async()
        .await;

    let client = GatewayClient::new(format!("{}/", server.url()));

    let providers = client.providers().await.unwrap();
    assert!(providers["google"].enabled);

    let models = client.models(Some("openai")).await.unwrap();
    assert_eq!(models["openai"], vec!["gpt-4".to_string()]);
}

#[tokio::test]
async fn test_degraded_readiness_is_not_an_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/health/detailed")
        .with_status(503)
        .with_body(
            json!({
                "status": "degraded",
                "service": "llm-gateway",
                "version": "0.3.0",
                "uptime_seconds": 12,
                "timestamp": "2026-01-01T00:00:00Z",
                "providers": {"google": false}
            })
            .to_string(),
        )
        .create_async()
        .await;

    let health = GatewayClient::new(server.url()).health_detailed().await.unwrap();
    assert!(!health.is_healthy());
    assert_eq!(health.providers.unwrap()["google"], false);
}

#[tokio::test]
async fn test_models_query_is_encoded() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/llm/models")
        .match_query(Matcher::Exact("provider=a%26b%3Dc".into()))
        .with_status(400)
        .with_body(
            json!({
                "success": false,
                "error": "Invalid request: Unsupported provider 'a&b=c'",
                "error_code": "VALIDATION_ERROR"
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let err = GatewayClient::new(server.url()).models(Some("a&b=c")).await.unwrap_err();
    match err {
        ClientError::Api { status, code, .. } => {
            assert_eq!(status, 400);
            assert_eq!(code, "VALIDATION_ERROR");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    mock.assert_async().await;
}

#[tokio::test]
async fn test_embed_calls() {
    let mut server = mockito::Server::new_async().await;
    let single = server
        .mock("POST", "/embed")
        .match_body(Matcher::Json(json!({"text": "hello", "task_type": "query"})))
        .with_status(200)
        .with_body(json!({"embedding": [0.5, 0.25], "dimensions": 2, "model": "text-embedding-004"}).to_string())
        .expect(1)
        .create_async()
        .await;
    let batch = server
        .mock("POST", "/embed/batch")
        .match_body(Matcher::Json(json!({"texts": ["a", "b"], "task_type": "document"})))
        .with_status(200)
        .with_body(
            json!({"embeddings": [[1.0], [2.0]], "count": 2, "dimensions": 1, "model": "text-embedding-004"})
                .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let client = GatewayClient::new(server.url());
    let response = client.embed(&EmbedRequest::new("hello", EmbeddingTask::Query)).await.unwrap();
    assert_eq!(response.embedding, vec![0.5, 0.25]);

    let response = client
        .embed_batch(&EmbedBatchRequest::new(vec!["a".into(), "b".into()]))
        .await
        .unwrap();
    assert_eq!(response.count, 2);
    assert_eq!(response.embeddings[1], vec![2.0]);

    single.assert_async().await;
    batch.assert_async().await;
}
