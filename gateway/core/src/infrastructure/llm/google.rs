// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Google Gemini LLM Provider Adapter
//
// Anti-Corruption Layer for the Gemini `generateContent` REST API, including
// the two optional grounding tools (Google Search, Google Maps), and for the
// `embedContent`/`batchEmbedContents` embedding endpoints.

use crate::domain::catalog;
use crate::domain::embedding::{EmbeddingProvider, EmbeddingTask, EMBEDDING_DIMENSIONS, EMBEDDING_MODEL};
use crate::domain::llm::{
    GenerationRequest, GenerationResponse, LLMError, LLMProvider, ProviderKind, TokenUsage,
};
use crate::infrastructure::llm::vendor_error;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::time::Duration;
use tracing::{debug, info, warn};

const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(10);
const EMBEDDING_TIMEOUT: Duration = Duration::from_secs(30);
const TOP_P: f32 = 0.95;

/// Returned instead of an error when Gemini produces no text (safety filters, overload)
pub const EMPTY_RESPONSE_PLACEHOLDER: &str =
    "[Content temporarily unavailable - Gemini API returned empty response]";

const SAFETY_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_HARASSMENT",
];

pub struct GoogleAdapter {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    /// Replaces the per-model catalog timeout when set
    request_timeout: Option<Duration>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
    safety_settings: Vec<GeminiSafetySetting>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Value>,
}

#[derive(Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
    top_p: f32,
    max_output_tokens: u32,
}

#[derive(Serialize)]
struct GeminiSafetySetting {
    category: &'static str,
    threshold: &'static str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    usage_metadata: Option<GeminiUsage>,
    #[serde(default)]
    prompt_feedback: Option<Value>,
    #[serde(default)]
    model_version: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
    #[serde(default)]
    finish_reason: Option<String>,
    #[serde(default)]
    safety_ratings: Vec<Value>,
    #[serde(default)]
    grounding_metadata: Option<GeminiGroundingMetadata>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGroundingMetadata {
    #[serde(default)]
    web_search_queries: Vec<String>,
    #[serde(default)]
    grounding_chunks: Vec<Value>,
    #[serde(default)]
    grounding_supports: Vec<Value>,
    #[serde(default)]
    google_maps_widget_context_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: Option<u32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiEmbedRequest {
    model: String,
    content: GeminiContent,
    task_type: &'static str,
    output_dimensionality: usize,
}

#[derive(Serialize)]
struct GeminiBatchEmbedRequest {
    requests: Vec<GeminiEmbedRequest>,
}

#[derive(Deserialize)]
struct GeminiEmbedding {
    #[serde(default)]
    values: Vec<f32>,
}

#[derive(Deserialize)]
struct GeminiEmbedResponse {
    embedding: GeminiEmbedding,
}

#[derive(Deserialize)]
struct GeminiBatchEmbedResponse {
    #[serde(default)]
    embeddings: Vec<GeminiEmbedding>,
}

impl GoogleAdapter {
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

    fn build_embed_request(text: &str, task: EmbeddingTask) -> GeminiEmbedRequest {
        GeminiEmbedRequest {
            model: format!("models/{}", EMBEDDING_MODEL),
            content: GeminiContent {
                role: None,
                parts: vec![GeminiPart {
                    text: Some(text.to_string()),
                }],
            },
            task_type: task.vendor_name(),
            output_dimensionality: EMBEDDING_DIMENSIONS,
        }
    }

    /// POST a JSON body to a Gemini model method and decode the success body
    async fn call_model<B, R>(&self, method: &str, body: &B, timeout: Duration) -> Result<R, LLMError>
    where
        B: Serialize + ?Sized,
        R: serde::de::DeserializeOwned,
    {
        let url = format!("{}/v1beta/models/{}:{}", self.endpoint, EMBEDDING_MODEL, method);
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .timeout(self.request_timeout.unwrap_or(timeout))
            .json(body)
            .send()
            .await
            .map_err(|e| vendor_error::from_transport(ProviderKind::Google, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(vendor_error::from_status(ProviderKind::Google, status, &error_text));
        }

        response
            .json()
            .await
            .map_err(|e| vendor_error::from_body(ProviderKind::Google, e))
    }

    fn build_request(request: &GenerationRequest, max_output_tokens: u32) -> GeminiRequest {
        // Gemini receives the system message folded into the single user turn
        let full_prompt = match request.system_message.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(system) => format!("{}\n\n{}", system, request.prompt),
            None => request.prompt.clone(),
        };

        let mut tools = Vec::new();
        if request.use_search {
            info!("Enabling Google Search grounding");
            tools.push(json!({ "googleSearch": {} }));
        }
        if request.use_maps {
            info!("Enabling Google Maps grounding");
            tools.push(json!({ "googleMaps": {} }));
        }

        GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart {
                    text: Some(full_prompt),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: request.temperature,
                top_p: TOP_P,
                max_output_tokens,
            },
            safety_settings: SAFETY_CATEGORIES
                .into_iter()
                .map(|category| GeminiSafetySetting {
                    category,
                    threshold: "BLOCK_NONE",
                })
                .collect(),
            tools,
        }
    }
}

fn normalize_finish_reason(reason: Option<&str>) -> String {
    match reason {
        Some("STOP") | None => "stop".to_string(),
        Some("MAX_TOKENS") => "length".to_string(),
        Some("SAFETY") | Some("RECITATION") | Some("BLOCKLIST") | Some("PROHIBITED_CONTENT")
        | Some("SPII") => "content_filter".to_string(),
        Some(other) => other.to_ascii_lowercase(),
    }
}

fn grounding_to_json(grounding: Option<&GeminiGroundingMetadata>) -> Value {
    match grounding {
        Some(g) => json!({
            "search_queries": g.web_search_queries,
            "grounding_chunks": g.grounding_chunks,
            "grounding_supports": g.grounding_supports,
            "maps_widget_context_token": g.google_maps_widget_context_token,
        }),
        None => Value::Null,
    }
}

#[async_trait]
impl LLMProvider for GoogleAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Google
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, LLMError> {
        let spec = catalog::resolve(ProviderKind::Google, request.model.as_deref())?;
        let max_output_tokens =
            catalog::effective_max_tokens(ProviderKind::Google, spec, request.max_tokens);
        let body = Self::build_request(request, max_output_tokens);

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint, spec.api_name
        );
        debug!(
            model = spec.api_name,
            temperature = request.temperature,
            max_tokens = max_output_tokens,
            tools = body.tools.len(),
            "Calling Google Gemini API"
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .timeout(self.request_timeout.unwrap_or(spec.timeout))
            .json(&body)
            .send()
            .await
            .map_err(|e| vendor_error::from_transport(ProviderKind::Google, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(vendor_error::from_status(ProviderKind::Google, status, &error_text));
        }

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| vendor_error::from_body(ProviderKind::Google, e))?;

        let candidate = gemini_response.candidates.first();
        let text: String = candidate
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect()
            })
            .unwrap_or_default();

        let mut metadata = Map::new();
        metadata.insert("search_enabled".into(), json!(request.use_search));
        metadata.insert("maps_enabled".into(), json!(request.use_maps));
        metadata.insert("candidates".into(), json!(gemini_response.candidates.len()));
        if let Some(version) = &gemini_response.model_version {
            metadata.insert("model_version".into(), json!(version));
        }

        if text.is_empty() {
            warn!(
                model = spec.id,
                finish_reason = ?candidate.and_then(|c| c.finish_reason.as_deref()),
                prompt_feedback = ?gemini_response.prompt_feedback,
                "Empty response from Google Gemini - returning placeholder"
            );
            if let Some(feedback) = gemini_response.prompt_feedback {
                metadata.insert("prompt_feedback".into(), feedback);
            }
            return Ok(GenerationResponse::new(
                ProviderKind::Google,
                spec.id,
                EMPTY_RESPONSE_PLACEHOLDER,
                TokenUsage::default(),
                "empty_response",
            )
            .with_metadata(metadata));
        }

        let usage = gemini_response
            .usage_metadata
            .as_ref()
            .map(|u| TokenUsage::new(u.prompt_token_count, u.candidates_token_count, u.total_token_count))
            .unwrap_or_default();

        metadata.insert(
            "safety_ratings".into(),
            json!(candidate.map(|c| c.safety_ratings.clone()).unwrap_or_default()),
        );
        if request.wants_grounding() {
            metadata.insert(
                "grounding_metadata".into(),
                grounding_to_json(candidate.and_then(|c| c.grounding_metadata.as_ref())),
            );
        }

        Ok(GenerationResponse::new(
            ProviderKind::Google,
            spec.id,
            text,
            usage,
            normalize_finish_reason(candidate.and_then(|c| c.finish_reason.as_deref())),
        )
        .with_metadata(metadata))
    }

    async fn health_check(&self) -> bool {
        let url = format!("{}/v1beta/models", self.endpoint);

        match self
            .client
            .get(&url)
            .header("x-goog-api-key", &self.api_key)
            .timeout(HEALTH_CHECK_TIMEOUT)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                warn!(status = %response.status(), "Google Gemini health check failed");
                false
            }
            Err(e) => {
                warn!(error = %e, "Google Gemini health check failed");
                false
            }
        }
    }

    fn list_models(&self) -> Vec<String> {
        catalog::model_ids(ProviderKind::Google)
    }
}

#[async_trait]
impl EmbeddingProvider for GoogleAdapter {
    async fn embed(&self, text: &str, task: EmbeddingTask) -> Result<Vec<f32>, LLMError> {
        debug!(chars = text.len(), task = task.vendor_name(), "Calling Gemini embedContent");
        let body = Self::build_embed_request(text, task);
        let response: GeminiEmbedResponse = self.call_model("embedContent", &body, EMBEDDING_TIMEOUT).await?;
        Ok(response.embedding.values)
    }

    async fn embed_batch(&self, texts: &[String], task: EmbeddingTask) -> Result<Vec<Vec<f32>>, LLMError> {
        debug!(count = texts.len(), task = task.vendor_name(), "Calling Gemini batchEmbedContents");
        let body = GeminiBatchEmbedRequest {
            requests: texts.iter().map(|t| Self::build_embed_request(t, task)).collect(),
        };
        let response: GeminiBatchEmbedResponse =
            self.call_model("batchEmbedContents", &body, EMBEDDING_TIMEOUT).await?;

        if response.embeddings.len() != texts.len() {
            return Err(LLMError::ProviderUnknown {
                provider: ProviderKind::Google,
                message: format!(
                    "Expected {} embeddings, got {}",
                    texts.len(),
                    response.embeddings.len()
                ),
            });
        }
        Ok(response.embeddings.into_iter().map(|e| e.values).collect())
    }
}
