// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Mod
//!
//! Provides the domain model of the gateway.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Normalized request/response types, embeddings, model catalog and gateway configuration

pub mod catalog;
pub mod embedding;
pub mod gateway_config;
pub mod llm;
