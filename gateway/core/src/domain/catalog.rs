// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Model Catalog - fixed per-provider model enumeration
//
// Requests may only name models listed here. Order is significant: it is the
// order returned by `list_models()` and the HTTP model listings.

use crate::domain::llm::{LLMError, ProviderKind};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A model the gateway knows how to call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelSpec {
    /// Public identifier accepted in requests and echoed in responses
    pub id: &'static str,

    /// Identifier sent to the vendor API
    pub api_name: &'static str,

    /// Largest `max_tokens` the model accepts
    pub max_output_tokens: u32,

    /// Per-request timeout for a single vendor call
    pub timeout: Duration,
}

const GOOGLE_MODELS: &[ModelSpec] = &[
    ModelSpec {
        id: "gemini-2.5-flash",
        api_name: "gemini-2.5-flash",
        max_output_tokens: 65_536,
        timeout: Duration::from_secs(120),
    },
    ModelSpec {
        id: "gemini-2.5-flash-lite",
        api_name: "gemini-2.5-flash-lite",
        max_output_tokens: 65_536,
        timeout: Duration::from_secs(60),
    },
    ModelSpec {
        id: "gemini-3-flash-preview",
        api_name: "gemini-3-flash-preview",
        max_output_tokens: 65_536,
        timeout: Duration::from_secs(180),
    },
];

const OPENAI_MODELS: &[ModelSpec] = &[
    ModelSpec {
        id: "gpt-4-turbo",
        api_name: "gpt-4-turbo-preview",
        max_output_tokens: 4_096,
        timeout: Duration::from_secs(120),
    },
    ModelSpec {
        id: "gpt-4",
        api_name: "gpt-4",
        max_output_tokens: 8_192,
        timeout: Duration::from_secs(120),
    },
    ModelSpec {
        id: "gpt-3.5-turbo",
        api_name: "gpt-3.5-turbo",
        max_output_tokens: 4_096,
        timeout: Duration::from_secs(60),
    },
];

pub fn models(kind: ProviderKind) -> &'static [ModelSpec] {
    match kind {
        ProviderKind::Google => GOOGLE_MODELS,
        ProviderKind::OpenAI => OPENAI_MODELS,
    }
}

pub fn model_ids(kind: ProviderKind) -> Vec<String> {
    models(kind).iter().map(|m| m.id.to_string()).collect()
}

pub fn default_model(kind: ProviderKind) -> &'static str {
    match kind {
        ProviderKind::Google => "gemini-3-flash-preview",
        ProviderKind::OpenAI => "gpt-3.5-turbo",
    }
}

pub fn lookup(kind: ProviderKind, id: &str) -> Option<&'static ModelSpec> {
    models(kind).iter().find(|m| m.id == id)
}

/// Public description of a provider as listed on `GET /llm/providers`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderInfo {
    pub display_name: String,
    pub models: Vec<String>,
    pub default_model: String,
    /// Whether the provider has a credential and can serve requests
    pub enabled: bool,
}

impl ProviderInfo {
    pub fn new(kind: ProviderKind, enabled: bool) -> Self {
        Self {
            display_name: kind.display_name().to_string(),
            models: model_ids(kind),
            default_model: default_model(kind).to_string(),
            enabled,
        }
    }
}

/// Resolve the requested model (or the provider default) to its catalog entry
pub fn resolve(kind: ProviderKind, requested: Option<&str>) -> Result<&'static ModelSpec, LLMError> {
    let id = requested.unwrap_or_else(|| default_model(kind));
    lookup(kind, id).ok_or_else(|| {
        LLMError::Validation(format!(
            "Unknown model '{}' for provider '{}'. Available: {}",
            id,
            kind,
            model_ids(kind).join(", ")
        ))
    })
}

/// Output token budget for a call: the requested value, or the provider default capped at the model limit
pub fn effective_max_tokens(kind: ProviderKind, spec: &ModelSpec, requested: Option<i64>) -> u32 {
    match requested.and_then(|t| u32::try_from(t).ok()) {
        Some(tokens) if tokens > 0 => tokens.min(spec.max_output_tokens),
        _ => kind.default_max_tokens().min(spec.max_output_tokens),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_in_catalog() {
        for kind in ProviderKind::ALL {
            let spec = resolve(kind, None).unwrap();
            assert_eq!(spec.id, default_model(kind));
        }
    }

    #[test]
    fn test_openai_alias_maps_to_vendor_id() {
        let spec = resolve(ProviderKind::OpenAI, Some("gpt-4-turbo")).unwrap();
        assert_eq!(spec.api_name, "gpt-4-turbo-preview");
    }

    #[test]
    fn test_unknown_model_is_validation_error() {
        let err = resolve(ProviderKind::Google, Some("gpt-4")).unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert!(err.message().contains("gemini-2.5-flash"));
    }

    #[test]
    fn test_effective_max_tokens() {
        let gpt4 = lookup(ProviderKind::OpenAI, "gpt-4").unwrap();
        assert_eq!(effective_max_tokens(ProviderKind::OpenAI, gpt4, None), 2048);
        assert_eq!(effective_max_tokens(ProviderKind::OpenAI, gpt4, Some(100)), 100);

        let lite = lookup(ProviderKind::Google, "gemini-2.5-flash-lite").unwrap();
        assert_eq!(effective_max_tokens(ProviderKind::Google, lite, None), 8000);
    }

    #[test]
    fn test_model_order_is_stable() {
        assert_eq!(
            model_ids(ProviderKind::Google),
            vec!["gemini-2.5-flash", "gemini-2.5-flash-lite", "gemini-3-flash-preview"]
        );
        assert_eq!(model_ids(ProviderKind::OpenAI), model_ids(ProviderKind::OpenAI));
    }
}
