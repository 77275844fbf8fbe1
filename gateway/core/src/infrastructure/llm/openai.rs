// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// OpenAI LLM Provider Adapter
//
// Anti-Corruption Layer for the OpenAI Chat Completions API.
// Grounding flags are never read here; the generation service rejects them
// for this provider before a request reaches the adapter.

use crate::domain::catalog;
use crate::domain::llm::{
    GenerationRequest, GenerationResponse, LLMError, LLMProvider, ProviderKind, TokenUsage,
};
use crate::infrastructure::llm::vendor_error;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map};
use std::time::Duration;
use tracing::{debug, warn};

const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

pub struct OpenAIAdapter {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    /// Replaces the per-model catalog timeout when set
    request_timeout: Option<Duration>,
}

#[derive(Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    max_tokens: u32,
    temperature: f32,
    stream: bool,
}

#[derive(Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    id: String,
    #[serde(default)]
    object: String,
    #[serde(default)]
    model: String,
    choices: Vec<OpenAIChoice>,
    #[serde(default)]
    usage: Option<OpenAIUsage>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct OpenAIUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
    #[serde(default)]
    total_tokens: Option<u32>,
}

impl OpenAIAdapter {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint, api_key)
    }

    pub fn with_client(
        client: reqwest::Client,
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            request_timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    fn build_messages(request: &GenerationRequest) -> Vec<OpenAIMessage> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = request.system_message.as_deref().filter(|s| !s.trim().is_empty()) {
            messages.push(OpenAIMessage {
                role: "system".to_string(),
                content: Some(system.to_string()),
            });
        }
        messages.push(OpenAIMessage {
            role: "user".to_string(),
            content: Some(request.prompt.clone()),
        });
        messages
    }
}

/// OpenAI finish reasons are already lower-case; only absence needs a default
fn normalize_finish_reason(reason: Option<&str>) -> String {
    reason.unwrap_or("stop").to_ascii_lowercase()
}

#[async_trait]
impl LLMProvider for OpenAIAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAI
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, LLMError> {
        let spec = catalog::resolve(ProviderKind::OpenAI, request.model.as_deref())?;

        // Translate our domain types to OpenAI's types
        let body = OpenAIRequest {
            model: spec.api_name.to_string(),
            messages: Self::build_messages(request),
            max_tokens: catalog::effective_max_tokens(ProviderKind::OpenAI, spec, request.max_tokens),
            temperature: request.temperature,
            stream: false,
        };

        let url = format!("{}/chat/completions", self.endpoint);
        debug!(model = spec.api_name, max_tokens = body.max_tokens, "Calling OpenAI API");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .timeout(self.request_timeout.unwrap_or(spec.timeout))
            .json(&body)
            .send()
            .await
            .map_err(|e| vendor_error::from_transport(ProviderKind::OpenAI, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(vendor_error::from_status(ProviderKind::OpenAI, status, &error_text));
        }

        let openai_response: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| vendor_error::from_body(ProviderKind::OpenAI, e))?;

        // Translate OpenAI's response to our domain types
        let choice = openai_response.choices.first().ok_or_else(|| LLMError::ProviderUnknown {
            provider: ProviderKind::OpenAI,
            message: "No choices in response".into(),
        })?;

        let text = choice
            .message
            .content
            .clone()
            .filter(|c| !c.is_empty())
            .ok_or_else(|| LLMError::ProviderUnknown {
                provider: ProviderKind::OpenAI,
                message: "Empty response from OpenAI".into(),
            })?;

        let usage = openai_response
            .usage
            .as_ref()
            .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens, u.total_tokens))
            .unwrap_or_default();

        let mut metadata = Map::new();
        metadata.insert("response_id".into(), json!(openai_response.id));
        metadata.insert("model".into(), json!(openai_response.model));
        metadata.insert("object".into(), json!(openai_response.object));

        Ok(GenerationResponse::new(
            ProviderKind::OpenAI,
            spec.id,
            text,
            usage,
            normalize_finish_reason(choice.finish_reason.as_deref()),
        )
        .with_metadata(metadata))
    }

    async fn health_check(&self) -> bool {
        // Simple check - list models endpoint
        let url = format!("{}/models", self.endpoint);

        match self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .timeout(HEALTH_CHECK_TIMEOUT)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                warn!(status = %response.status(), "OpenAI health check failed");
                false
            }
            Err(e) => {
                warn!(error = %e, "OpenAI health check failed");
                false
            }
        }
    }

    fn list_models(&self) -> Vec<String> {
        catalog::model_ids(ProviderKind::OpenAI)
    }
}
