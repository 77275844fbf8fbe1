// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// LLM Provider Infrastructure - Anti-Corruption Layer Implementations
//
// Each provider adapter translates between the normalized gateway contract
// and one vendor REST API. Vendor error shapes never leave this module.

pub mod google;
pub mod openai;
pub mod registry;
mod vendor_error;

pub use google::GoogleAdapter;
pub use openai::OpenAIAdapter;
pub use registry::ProviderRegistry;
