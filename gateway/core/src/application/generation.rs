// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Generation Use Case
//!
//! Application service that turns a normalized generation request into exactly
//! one provider call, or two when a fallback provider is configured.
//!
//! # DDD Pattern: Application Service
//!
//! - **Layer:** Application
//! - **Responsibility:** Validate requests, resolve provider and model, delegate, fall back
//! - **Collaborators:**
//!   - Domain: GenerationRequest, GenerationResponse, LLMError, model catalog
//!   - Infrastructure: ProviderRegistry, telemetry
//!
//! # Flow
//!
//! 1. Validate request shape (prompt, temperature, max_tokens, stream)
//! 2. Resolve the provider through the registry
//! 3. Resolve the model and check its output token limit
//! 4. Reject grounding on providers that cannot ground
//! 5. Delegate to the provider
//! 6. On a provider failure, retry once against the fallback provider if one is enabled
//!
//! Nothing in steps 1-4 performs network I/O, so invalid requests never reach a vendor.

use crate::domain::catalog::{self, ProviderInfo};
use crate::domain::llm::{GenerationRequest, GenerationResponse, LLMError, LLMProvider, ProviderKind};
use crate::infrastructure::llm::ProviderRegistry;
use crate::infrastructure::telemetry::{self, Outcome};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Provider readiness as reported on `GET /health/detailed`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    /// True when at least one provider is configured and every configured provider answered
    pub healthy: bool,
    pub providers: BTreeMap<String, bool>,
}

pub struct GenerationService {
    registry: Arc<ProviderRegistry>,
    default_provider: ProviderKind,
    fallback: Option<ProviderKind>,
}

impl GenerationService {
    pub fn new(registry: Arc<ProviderRegistry>, fallback: Option<ProviderKind>) -> Self {
        Self {
            registry,
            default_provider: ProviderKind::Google,
            fallback,
        }
    }

    /// Provider for requests that name none
    pub fn with_default_provider(mut self, kind: ProviderKind) -> Self {
        self.default_provider = kind;
        self
    }

    /// Generate a completion, applying the fallback policy on provider failures
    pub async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, LLMError> {
        Self::validate(&request)?;

        let requested = request
            .provider
            .as_deref()
            .unwrap_or(self.default_provider.as_str());
        let provider = self.registry.resolve(requested)?;
        let prepared = Self::prepare(provider.as_ref(), &request)?;

        info!(
            provider = %provider.kind(),
            model = prepared.model.as_deref().unwrap_or_default(),
            grounding = prepared.wants_grounding(),
            "llm_request_received"
        );

        let error = match Self::call(provider.as_ref(), &prepared).await {
            Ok(response) => return Ok(Self::finish(response, &request, None)),
            Err(e) => e,
        };

        let Some(fallback) = self.fallback_for(provider.kind(), &request, &error) else {
            return Err(error);
        };

        // Re-target at the fallback's default model
        let mut retry = request.clone();
        retry.provider = Some(fallback.kind().as_str().to_string());
        retry.model = None;
        let retry = match Self::prepare(fallback.as_ref(), &retry) {
            Ok(retry) => retry,
            Err(e) => {
                warn!(fallback = %fallback.kind(), error = %e, "Fallback cannot serve request, skipping");
                return Err(error);
            }
        };

        info!(
            from = %provider.kind(),
            to = %fallback.kind(),
            reason = error.code(),
            "Retrying request against fallback provider"
        );
        telemetry::record_fallback(provider.kind().as_str(), fallback.kind().as_str());

        let response = Self::call(fallback.as_ref(), &retry).await?;
        Ok(Self::finish(response, &request, Some(provider.kind())))
    }

    /// Shape checks that need no provider
    fn validate(request: &GenerationRequest) -> Result<(), LLMError> {
        if request.prompt.trim().is_empty() {
            return Err(LLMError::Validation("prompt must not be empty".to_string()));
        }

        if !(0.0..=1.0).contains(&request.temperature) {
            return Err(LLMError::Validation(format!(
                "temperature must be between 0.0 and 1.0, got {}",
                request.temperature
            )));
        }

        if let Some(max_tokens) = request.max_tokens {
            if max_tokens <= 0 {
                return Err(LLMError::Validation(format!(
                    "max_tokens must be positive, got {}",
                    max_tokens
                )));
            }
        }

        if request.stream {
            return Err(LLMError::Validation("streaming responses are not supported".to_string()));
        }

        Ok(())
    }

    /// Resolve the model and capability checks for one provider; returns the request to send
    fn prepare(provider: &dyn LLMProvider, request: &GenerationRequest) -> Result<GenerationRequest, LLMError> {
        let kind = provider.kind();
        let models = provider.list_models();
        let model = match request.model.as_deref() {
            Some(model) => model.to_string(),
            None => catalog::default_model(kind).to_string(),
        };

        if !models.iter().any(|m| *m == model) {
            return Err(LLMError::Validation(format!(
                "Unknown model '{}' for provider '{}'. Available: {}",
                model,
                kind,
                models.join(", ")
            )));
        }

        if let (Some(max_tokens), Some(spec)) = (request.max_tokens, catalog::lookup(kind, &model)) {
            if max_tokens > i64::from(spec.max_output_tokens) {
                return Err(LLMError::Validation(format!(
                    "max_tokens {} exceeds the limit of {} for model '{}'",
                    max_tokens, spec.max_output_tokens, model
                )));
            }
        }

        if request.wants_grounding() && !kind.supports_grounding() {
            return Err(LLMError::Validation(format!(
                "Grounding (use_search/use_maps) is not supported by provider '{}'",
                kind
            )));
        }

        let mut prepared = request.clone();
        prepared.provider = Some(kind.as_str().to_string());
        prepared.model = Some(model);
        Ok(prepared)
    }

    /// The fallback provider to try after `error`, if the policy allows one
    fn fallback_for(
        &self,
        failed: ProviderKind,
        request: &GenerationRequest,
        error: &LLMError,
    ) -> Option<Arc<dyn LLMProvider>> {
        let target = self.fallback?;
        if !error.retryable_by_fallback() || target == failed {
            return None;
        }
        if request.wants_grounding() && !target.supports_grounding() {
            return None;
        }
        let provider = self.registry.get(target);
        if provider.is_none() {
            warn!(fallback = %target, "Fallback provider is not configured, skipping");
        }
        provider
    }

    /// Single provider call with logging and metrics
    async fn call(provider: &dyn LLMProvider, request: &GenerationRequest) -> Result<GenerationResponse, LLMError> {
        let kind = provider.kind();
        let model = request.model.clone().unwrap_or_default();
        let started = Instant::now();

        let result = provider.generate(request).await;
        let elapsed = started.elapsed();

        match &result {
            Ok(response) => {
                info!(
                    provider = %kind,
                    model = %model,
                    finish_reason = %response.finish_reason,
                    total_tokens = response.usage.total_tokens,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "llm_request_completed"
                );
                telemetry::record_request(kind.as_str(), &model, Outcome::Success, elapsed);
            }
            Err(e) => {
                warn!(
                    provider = %kind,
                    model = %model,
                    error_code = e.code(),
                    error = %e,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "llm_provider_error"
                );
                telemetry::record_request(kind.as_str(), &model, Outcome::Error(e.code()), elapsed);
            }
        }

        result
    }

    fn finish(
        mut response: GenerationResponse,
        request: &GenerationRequest,
        fallback_from: Option<ProviderKind>,
    ) -> GenerationResponse {
        if let Some(metadata) = &request.metadata {
            response
                .metadata
                .insert("request_metadata".into(), Value::Object(metadata.clone()));
        }
        if let Some(from) = fallback_from {
            response
                .metadata
                .insert("fallback_from".into(), Value::String(from.as_str().to_string()));
        }
        response
    }

    /// Models per provider; a single provider when `provider` is given
    pub fn list_models(&self, provider: Option<&str>) -> Result<BTreeMap<String, Vec<String>>, LLMError> {
        let kinds = match provider {
            Some(name) => vec![Self::parse_listed(name)?],
            None => ProviderKind::ALL.to_vec(),
        };

        Ok(kinds
            .into_iter()
            .map(|kind| {
                let models = self
                    .registry
                    .get(kind)
                    .map(|p| p.list_models())
                    .unwrap_or_else(|| catalog::model_ids(kind));
                (kind.as_str().to_string(), models)
            })
            .collect())
    }

    /// All known providers and whether each can serve requests
    pub fn providers(&self) -> BTreeMap<String, ProviderInfo> {
        self.registry
            .catalog()
            .into_iter()
            .map(|(kind, info)| (kind.as_str().to_string(), info))
            .collect()
    }

    /// Health-check configured providers, or a single named one
    pub async fn health(&self, provider: Option<&str>) -> Result<HealthReport, LLMError> {
        let statuses: BTreeMap<String, bool> = match provider {
            Some(name) => {
                let kind = Self::parse_listed(name)?;
                let healthy = match self.registry.get(kind) {
                    Some(p) => p.health_check().await,
                    None => false,
                };
                BTreeMap::from([(kind.as_str().to_string(), healthy)])
            }
            None => self
                .registry
                .health_check_all()
                .await
                .into_iter()
                .map(|(kind, healthy)| (kind.as_str().to_string(), healthy))
                .collect(),
        };

        let healthy = !statuses.is_empty() && statuses.values().all(|h| *h);
        Ok(HealthReport {
            healthy,
            providers: statuses,
        })
    }

    /// Provider names in listing queries are caller input, not configuration
    fn parse_listed(name: &str) -> Result<ProviderKind, LLMError> {
        name.parse()
            .map_err(|e: LLMError| LLMError::Validation(e.message().to_string()))
    }
}
