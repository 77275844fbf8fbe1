// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Llm
//!
//! Normalized generation contract shared by every provider.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Implements the vendor-agnostic request/response shapes and error taxonomy

// LLM Provider Domain Interface (Anti-Corruption Layer)
//
// Adapters in infrastructure/llm/ implement `LLMProvider` and translate these
// types to and from vendor wire formats.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Domain interface for LLM providers
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Which vendor this adapter talks to
    fn kind(&self) -> ProviderKind;

    /// Generate a completion from the LLM
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, LLMError>;

    /// Check if provider is healthy and accessible. Never fails; any error is `false`.
    async fn health_check(&self) -> bool;

    /// Ordered, static list of model identifiers. No network call.
    fn list_models(&self) -> Vec<String>;
}

/// Supported LLM vendors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Google,
    OpenAI,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 2] = [ProviderKind::Google, ProviderKind::OpenAI];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Google => "google",
            ProviderKind::OpenAI => "openai",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderKind::Google => "Google Gemini",
            ProviderKind::OpenAI => "OpenAI",
        }
    }

    /// Environment variable holding the credential when none is configured explicitly
    pub fn credential_env(&self) -> &'static str {
        match self {
            ProviderKind::Google => "GOOGLE_API_KEY",
            ProviderKind::OpenAI => "OPENAI_API_KEY",
        }
    }

    pub fn default_endpoint(&self) -> &'static str {
        match self {
            ProviderKind::Google => "https://generativelanguage.googleapis.com",
            ProviderKind::OpenAI => "https://api.openai.com/v1",
        }
    }

    /// Output token budget applied when the request leaves `max_tokens` unset
    pub fn default_max_tokens(&self) -> u32 {
        match self {
            ProviderKind::Google => 8000,
            ProviderKind::OpenAI => 2048,
        }
    }

    /// Grounding (web search / maps) is a Gemini-only capability
    pub fn supports_grounding(&self) -> bool {
        matches!(self, ProviderKind::Google)
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = LLMError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "google" => Ok(ProviderKind::Google),
            "openai" => Ok(ProviderKind::OpenAI),
            other => Err(LLMError::Configuration(format!(
                "Unsupported provider '{}'. Available: google, openai",
                other
            ))),
        }
    }
}

/// Normalized generation request accepted on `POST /llm/generate`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Prompt text
    pub prompt: String,

    /// Provider name; parsed at service time so unknown names surface as configuration errors.
    /// The deployment's default provider serves requests that leave it unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    /// Specific model (provider default if None)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Sampling temperature, 0.0 to 1.0
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum output tokens. Signed so that zero and negatives reach validation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_message: Option<String>,

    /// Google Search grounding (Gemini only)
    #[serde(default)]
    pub use_search: bool,

    /// Google Maps grounding (Gemini only)
    #[serde(default)]
    pub use_maps: bool,

    /// Streaming is unsupported; `true` is rejected
    #[serde(default)]
    pub stream: bool,

    /// Caller metadata, echoed back under `request_metadata`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

fn default_temperature() -> f32 {
    0.7
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, provider: ProviderKind) -> Self {
        Self {
            prompt: prompt.into(),
            provider: Some(provider.as_str().to_string()),
            model: None,
            temperature: default_temperature(),
            max_tokens: None,
            system_message: None,
            use_search: false,
            use_maps: false,
            stream: false,
            metadata: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: i64) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_system_message(mut self, system_message: impl Into<String>) -> Self {
        self.system_message = Some(system_message.into());
        self
    }

    pub fn with_grounding(mut self, use_search: bool, use_maps: bool) -> Self {
        self.use_search = use_search;
        self.use_maps = use_maps;
        self
    }

    /// Whether any grounding mode is requested
    pub fn wants_grounding(&self) -> bool {
        self.use_search || self.use_maps
    }
}

/// Token usage stats, all non-negative
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    /// Build usage from vendor counts. A missing or zero total is derived from the parts.
    pub fn new(prompt_tokens: u32, completion_tokens: u32, total_tokens: Option<u32>) -> Self {
        let sum = prompt_tokens.saturating_add(completion_tokens);
        let total_tokens = match total_tokens {
            Some(total) if total >= sum => total,
            _ => sum,
        };
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// Generated text
    pub text: String,

    /// Provider wire name (e.g., "google", "openai")
    pub provider: String,

    /// Resolved public model id (e.g., "gemini-2.5-flash-lite")
    pub model: String,

    pub usage: TokenUsage,

    /// Why generation stopped, lower-case ("stop", "length", "content_filter", ...)
    pub finish_reason: String,

    /// Provider-specific details; Gemini grounding lands here
    #[serde(default)]
    pub metadata: Map<String, Value>,

    pub created_at: DateTime<Utc>,

    pub request_id: Uuid,
}

impl GenerationResponse {
    pub fn new(
        provider: ProviderKind,
        model: impl Into<String>,
        text: impl Into<String>,
        usage: TokenUsage,
        finish_reason: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            provider: provider.as_str().to_string(),
            model: model.into(),
            usage,
            finish_reason: finish_reason.into(),
            metadata: Map::new(),
            created_at: Utc::now(),
            request_id: Uuid::new_v4(),
        }
    }

    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Errors that can occur during LLM operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LLMError {
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("[{provider}] Authentication failed: {message}")]
    ProviderAuth { provider: ProviderKind, message: String },

    #[error("[{provider}] Rate limit exceeded: {message}")]
    ProviderRateLimit { provider: ProviderKind, message: String },

    #[error("[{provider}] Request timed out: {message}")]
    ProviderTimeout { provider: ProviderKind, message: String },

    #[error("[{provider}] Request rejected by provider: {message}")]
    ProviderInvalidRequest { provider: ProviderKind, message: String },

    #[error("[{provider}] Provider error: {message}")]
    ProviderUnknown { provider: ProviderKind, message: String },
}

impl LLMError {
    /// Stable machine-readable code reported to callers
    pub fn code(&self) -> &'static str {
        match self {
            LLMError::Validation(_) => "VALIDATION_ERROR",
            LLMError::Configuration(_) => "CONFIGURATION_ERROR",
            LLMError::ProviderAuth { .. } => "PROVIDER_AUTH_ERROR",
            LLMError::ProviderRateLimit { .. } => "PROVIDER_RATE_LIMITED",
            LLMError::ProviderTimeout { .. } => "PROVIDER_TIMEOUT",
            LLMError::ProviderInvalidRequest { .. } => "PROVIDER_INVALID_REQUEST",
            LLMError::ProviderUnknown { .. } => "PROVIDER_ERROR",
        }
    }

    /// Vendor that produced the error, if any
    pub fn provider(&self) -> Option<ProviderKind> {
        match self {
            LLMError::Validation(_) | LLMError::Configuration(_) => None,
            LLMError::ProviderAuth { provider, .. }
            | LLMError::ProviderRateLimit { provider, .. }
            | LLMError::ProviderTimeout { provider, .. }
            | LLMError::ProviderInvalidRequest { provider, .. }
            | LLMError::ProviderUnknown { provider, .. } => Some(*provider),
        }
    }

    /// Human-readable message without the provider prefix
    pub fn message(&self) -> &str {
        match self {
            LLMError::Validation(message) | LLMError::Configuration(message) => message,
            LLMError::ProviderAuth { message, .. }
            | LLMError::ProviderRateLimit { message, .. }
            | LLMError::ProviderTimeout { message, .. }
            | LLMError::ProviderInvalidRequest { message, .. }
            | LLMError::ProviderUnknown { message, .. } => message,
        }
    }

    /// True for failures raised by a vendor call, as opposed to request or setup problems
    pub fn is_provider_failure(&self) -> bool {
        self.provider().is_some()
    }

    /// HTTP status reported for this error on the gateway API
    pub fn status_code(&self) -> u16 {
        match self {
            LLMError::Validation(_) => 400,
            LLMError::Configuration(_) => 500,
            LLMError::ProviderAuth { .. } => 502,
            LLMError::ProviderRateLimit { .. } => 429,
            LLMError::ProviderTimeout { .. } => 504,
            LLMError::ProviderInvalidRequest { .. } => 422,
            LLMError::ProviderUnknown { .. } => 502,
        }
    }

    /// Whether a configured fallback provider may be tried after this error
    pub fn retryable_by_fallback(&self) -> bool {
        self.is_provider_failure()
    }
}
