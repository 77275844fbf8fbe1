// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Embedding
//!
//! Text embedding contract used for retrieval: single texts and batches,
//! embedded either for storage or as search queries.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Implements the embedding request/response shapes and their limits

use crate::domain::llm::LLMError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Public id of the embedding model
pub const EMBEDDING_MODEL: &str = "text-embedding-004";

/// Vector length requested from the vendor
pub const EMBEDDING_DIMENSIONS: usize = 768;

/// Maximum characters per text
pub const MAX_TEXT_CHARS: usize = 5000;

/// Maximum texts per batch
pub const MAX_BATCH_SIZE: usize = 100;

/// Domain interface for embedding backends
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed one text
    async fn embed(&self, text: &str, task: EmbeddingTask) -> Result<Vec<f32>, LLMError>;

    /// Embed several texts in one vendor call; output order matches input order
    async fn embed_batch(&self, texts: &[String], task: EmbeddingTask) -> Result<Vec<Vec<f32>>, LLMError>;
}

/// What the vector will be used for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingTask {
    /// Stored in a vector index
    #[default]
    Document,
    /// Compared against stored documents
    Query,
}

impl EmbeddingTask {
    /// Gemini `taskType` value
    pub fn vendor_name(&self) -> &'static str {
        match self {
            EmbeddingTask::Document => "RETRIEVAL_DOCUMENT",
            EmbeddingTask::Query => "RETRIEVAL_QUERY",
        }
    }
}

/// Body of `POST /embed`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedRequest {
    pub text: String,
    #[serde(default)]
    pub task_type: EmbeddingTask,
}

impl EmbedRequest {
    pub fn new(text: impl Into<String>, task_type: EmbeddingTask) -> Self {
        Self {
            text: text.into(),
            task_type,
        }
    }

    pub fn validate(&self) -> Result<(), LLMError> {
        validate_text(&self.text, None)
    }
}

/// Body of `POST /embed/batch`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedBatchRequest {
    pub texts: Vec<String>,
    #[serde(default)]
    pub task_type: EmbeddingTask,
}

impl EmbedBatchRequest {
    pub fn new(texts: Vec<String>) -> Self {
        Self {
            texts,
            task_type: EmbeddingTask::Document,
        }
    }

    pub fn validate(&self) -> Result<(), LLMError> {
        if self.texts.is_empty() || self.texts.len() > MAX_BATCH_SIZE {
            return Err(LLMError::Validation(format!(
                "texts must contain between 1 and {} items, got {}",
                MAX_BATCH_SIZE,
                self.texts.len()
            )));
        }
        self.texts
            .iter()
            .enumerate()
            .try_for_each(|(i, text)| validate_text(text, Some(i)))
    }
}

fn validate_text(text: &str, index: Option<usize>) -> Result<(), LLMError> {
    let field = match index {
        Some(i) => format!("texts[{}]", i),
        None => "text".to_string(),
    };
    if text.trim().is_empty() {
        return Err(LLMError::Validation(format!("{} must not be empty", field)));
    }
    let chars = text.chars().count();
    if chars > MAX_TEXT_CHARS {
        return Err(LLMError::Validation(format!(
            "{} exceeds {} characters ({})",
            field, MAX_TEXT_CHARS, chars
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedResponse {
    pub embedding: Vec<f32>,
    pub dimensions: usize,
    pub model: String,
}

impl EmbedResponse {
    pub fn new(embedding: Vec<f32>) -> Self {
        Self {
            dimensions: embedding.len(),
            embedding,
            model: EMBEDDING_MODEL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedBatchResponse {
    pub embeddings: Vec<Vec<f32>>,
    pub count: usize,
    pub dimensions: usize,
    pub model: String,
}

impl EmbedBatchResponse {
    pub fn new(embeddings: Vec<Vec<f32>>) -> Self {
        Self {
            count: embeddings.len(),
            dimensions: embeddings.first().map(Vec::len).unwrap_or(0),
            embeddings,
            model: EMBEDDING_MODEL.to_string(),
        }
    }
}
