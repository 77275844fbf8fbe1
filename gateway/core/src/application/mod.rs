// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod embedding;
pub mod generation;

// Re-export use cases for convenience
pub use embedding::{EmbeddingService, EmbeddingStatus};
pub use generation::{GenerationService, HealthReport};
