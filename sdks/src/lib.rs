// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

/// LLM Gateway Rust SDK
///
/// Typed access to a running gateway: generation, embeddings, provider and
/// model listings, and health.
pub mod client;
pub mod types;

pub use client::{ClientError, GatewayClient};
pub use gateway_core::domain::catalog::ProviderInfo;
pub use gateway_core::domain::embedding::{
    EmbedBatchRequest, EmbedBatchResponse, EmbedRequest, EmbedResponse, EmbeddingTask,
};
pub use gateway_core::domain::llm::{GenerationRequest, GenerationResponse, ProviderKind, TokenUsage};
pub use types::*;
