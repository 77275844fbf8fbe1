// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Embedding Use Case
//!
//! # DDD Pattern: Application Service
//!
//! - **Layer:** Application
//! - **Responsibility:** Validate embedding requests and delegate them to the embedding backend
//! - **Collaborators:**
//!   - Domain: EmbedRequest, EmbedBatchRequest, EmbeddingProvider
//!   - Infrastructure: ProviderRegistry, telemetry
//!
//! Embeddings never fall back to another provider.

use crate::domain::embedding::{
    EmbedBatchRequest, EmbedBatchResponse, EmbedRequest, EmbedResponse, EmbeddingTask,
    EMBEDDING_DIMENSIONS, EMBEDDING_MODEL,
};
use crate::domain::llm::{LLMError, ProviderKind};
use crate::infrastructure::llm::ProviderRegistry;
use crate::infrastructure::telemetry::{self, Outcome};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Reported on `GET /embed/health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbeddingStatus {
    pub available: bool,
    pub model: &'static str,
    pub dimensions: usize,
    pub task_types: [EmbeddingTask; 2],
}

pub struct EmbeddingService {
    registry: Arc<ProviderRegistry>,
}

impl EmbeddingService {
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self { registry }
    }

    pub async fn embed(&self, request: EmbedRequest) -> Result<EmbedResponse, LLMError> {
        request.validate()?;
        let embedder = self.registry.embedder()?;

        let started = Instant::now();
        let result = embedder.embed(&request.text, request.task_type).await;
        Self::record(&result, 1, request.task_type, started);

        Ok(EmbedResponse::new(result?))
    }

    pub async fn embed_batch(&self, request: EmbedBatchRequest) -> Result<EmbedBatchResponse, LLMError> {
        request.validate()?;
        let embedder = self.registry.embedder()?;

        let started = Instant::now();
        let result = embedder.embed_batch(&request.texts, request.task_type).await;
        Self::record(&result, request.texts.len(), request.task_type, started);

        Ok(EmbedBatchResponse::new(result?))
    }

    pub fn status(&self) -> EmbeddingStatus {
        EmbeddingStatus {
            available: self.registry.embedder().is_ok(),
            model: EMBEDDING_MODEL,
            dimensions: EMBEDDING_DIMENSIONS,
            task_types: [EmbeddingTask::Document, EmbeddingTask::Query],
        }
    }

    fn record<T>(result: &Result<T, LLMError>, count: usize, task: EmbeddingTask, started: Instant) {
        let elapsed = started.elapsed();
        let provider = ProviderKind::Google.as_str();
        match result {
            Ok(_) => {
                info!(
                    model = EMBEDDING_MODEL,
                    count,
                    task = task.vendor_name(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "embedding_completed"
                );
                telemetry::record_request(provider, EMBEDDING_MODEL, Outcome::Success, elapsed);
            }
            Err(e) => {
                warn!(
                    model = EMBEDDING_MODEL,
                    count,
                    error_code = e.code(),
                    error = %e,
                    "embedding_failed"
                );
                telemetry::record_request(provider, EMBEDDING_MODEL, Outcome::Error(e.code()), elapsed);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::embedding::EmbeddingProvider;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct FakeEmbedder {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl EmbeddingProvider for FakeEmbedder {
        async fn embed(&self, text: &str, task: EmbeddingTask) -> Result<Vec<f32>, LLMError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let marker = if task == EmbeddingTask::Query { 1.0 } else { 0.0 };
            Ok(vec![marker, text.len() as f32])
        }

        async fn embed_batch(&self, texts: &[String], task: EmbeddingTask) -> Result<Vec<Vec<f32>>, LLMError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let marker = if task == EmbeddingTask::Query { 1.0 } else { 0.0 };
            Ok(texts.iter().map(|t| vec![marker, t.len() as f32]).collect())
        }
    }

    fn service(embedder: Option<Arc<FakeEmbedder>>) -> EmbeddingService {
        let registry = ProviderRegistry::with_providers(Vec::new());
        let registry = match embedder {
            Some(e) => registry.with_embedder(e),
            None => registry,
        };
        EmbeddingService::new(Arc::new(registry))
    }

    #[tokio::test]
    async fn test_embed_passes_task_type() {
        let embedder = Arc::new(FakeEmbedder::default());
        let svc = service(Some(embedder.clone()));

        let response = svc.embed(EmbedRequest::new("abc", EmbeddingTask::Query)).await.unwrap();
        assert_eq!(response.embedding, vec![1.0, 3.0]);
        assert_eq!(response.dimensions, 2);
        assert_eq!(response.model, EMBEDDING_MODEL);
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_batch_preserves_order() {
        let svc = service(Some(Arc::new(FakeEmbedder::default())));
        let response = svc
            .embed_batch(EmbedBatchRequest::new(vec!["a".into(), "abcd".into(), "ab".into()]))
            .await
            .unwrap();

        assert_eq!(response.count, 3);
        let lengths: Vec<f32> = response.embeddings.iter().map(|v| v[1]).collect();
        assert_eq!(lengths, vec![1.0, 4.0, 2.0]);
    }

    #[tokio::test]
    async fn test_invalid_requests_never_reach_backend() {
        let embedder = Arc::new(FakeEmbedder::default());
        let svc = service(Some(embedder.clone()));

        let err = svc.embed(EmbedRequest::new("", EmbeddingTask::Document)).await.unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
        let err = svc.embed_batch(EmbedBatchRequest::new(vec![])).await.unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");

        assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_backend_is_configuration_error() {
        let svc = service(None);
        let err = svc.embed(EmbedRequest::new("hello", EmbeddingTask::Document)).await.unwrap_err();
        assert_eq!(err.code(), "CONFIGURATION_ERROR");
        assert!(!svc.status().available);
        assert!(service(Some(Arc::new(FakeEmbedder::default()))).status().available);
    }
}
