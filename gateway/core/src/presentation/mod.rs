// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Presentation Layer (`llm-gateway-core`)
//!
//! HTTP surface that translates external requests into application service
//! calls. No business logic lives here; every decision is made by
//! `crate::application::GenerationService` and `crate::application::EmbeddingService`.
//!
//! | Module | Transport | Description |
//! |--------|-----------|-------------|
//! | [`api`] | HTTP (Axum) | Generation, embedding, listing, health and metrics endpoints |

pub mod api;

pub use api::{app, AppState};
