// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// LLM Provider Registry - Provider Factory
//
// Builds one adapter per configured provider at startup and resolves provider
// names to those shared instances. A provider whose credential is missing is
// disabled with a warning instead of failing the whole process. The Gemini
// adapter also serves embeddings, so it is registered as the embedding backend.

use crate::domain::catalog::ProviderInfo;
use crate::domain::embedding::EmbeddingProvider;
use crate::domain::gateway_config::GatewayConfig;
use crate::domain::llm::{LLMError, LLMProvider, ProviderKind};
use futures::future::join_all;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use super::google::GoogleAdapter;
use super::openai::OpenAIAdapter;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Registry for managing LLM providers
pub struct ProviderRegistry {
    providers: BTreeMap<ProviderKind, Arc<dyn LLMProvider>>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
}

impl ProviderRegistry {
    /// Create provider registry from gateway configuration, reading credentials from the environment
    pub fn from_config(config: &GatewayConfig) -> Self {
        Self::from_config_with_env(config, |key| std::env::var(key).ok())
    }

    /// Same as `from_config` with an explicit variable source
    pub fn from_config_with_env(
        config: &GatewayConfig,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let mut providers: BTreeMap<ProviderKind, Arc<dyn LLMProvider>> = BTreeMap::new();
        let mut embedder: Option<Arc<dyn EmbeddingProvider>> = None;
        let client = Self::build_client();

        info!("Initializing LLM provider registry");

        for provider_config in &config.spec.providers {
            let kind = match provider_config.name.parse::<ProviderKind>() {
                Ok(kind) => kind,
                Err(e) => {
                    warn!("Skipping provider entry '{}': {}", provider_config.name, e);
                    continue;
                }
            };

            if !provider_config.enabled {
                info!("Provider '{}' disabled, skipping", kind);
                continue;
            }

            let Some(api_key) = Self::resolve_api_key(kind, provider_config.api_key.as_deref(), &lookup)
            else {
                warn!(
                    "No credential for provider '{}' (expected {}); provider disabled",
                    kind,
                    kind.credential_env()
                );
                continue;
            };

            let endpoint = provider_config
                .endpoint
                .clone()
                .unwrap_or_else(|| kind.default_endpoint().to_string());

            info!("Initializing provider: {} ({})", kind, endpoint);
            let provider: Arc<dyn LLMProvider> = match kind {
                ProviderKind::Google => {
                    let google = Arc::new(GoogleAdapter::with_client(client.clone(), endpoint, api_key));
                    embedder = Some(google.clone() as Arc<dyn EmbeddingProvider>);
                    google
                }
                ProviderKind::OpenAI => Arc::new(OpenAIAdapter::with_client(client.clone(), endpoint, api_key)),
            };
            providers.insert(kind, provider);
        }

        if providers.is_empty() {
            warn!("No LLM providers configured - every generation request will fail");
        }
        if embedder.is_none() {
            warn!("Google provider not configured - embedding requests will fail");
        }

        Self { providers, embedder }
    }

    /// Registry over already-built providers (in-process injection and tests)
    pub fn with_providers(providers: impl IntoIterator<Item = Arc<dyn LLMProvider>>) -> Self {
        let providers = providers.into_iter().map(|p| (p.kind(), p)).collect();
        Self {
            providers,
            embedder: None,
        }
    }

    pub fn with_embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    fn build_client() -> reqwest::Client {
        reqwest::Client::builder()
            .user_agent(concat!("llm-gateway/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                warn!("Failed to build tuned HTTP client, using defaults: {}", e);
                reqwest::Client::new()
            })
    }

    /// Resolve API key from config (supports "env:VAR_NAME" syntax, defaults to the provider variable)
    pub fn resolve_api_key(
        kind: ProviderKind,
        key: Option<&str>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Option<String> {
        let value = match key {
            Some(k) if k.starts_with("env:") => lookup(k.trim_start_matches("env:")),
            Some(k) => Some(k.to_string()),
            None => lookup(kind.credential_env()),
        };
        value.filter(|v| !v.trim().is_empty())
    }

    /// Resolve a provider by its wire name
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn LLMProvider>, LLMError> {
        let kind: ProviderKind = name.parse()?;
        self.get(kind).ok_or_else(|| {
            LLMError::Configuration(format!(
                "Provider '{}' is not configured (missing credential {} or disabled)",
                kind,
                kind.credential_env()
            ))
        })
    }

    pub fn get(&self, kind: ProviderKind) -> Option<Arc<dyn LLMProvider>> {
        self.providers.get(&kind).cloned()
    }

    /// Embedding backend; fails when the Google provider is not configured
    pub fn embedder(&self) -> Result<Arc<dyn EmbeddingProvider>, LLMError> {
        self.embedder.clone().ok_or_else(|| {
            LLMError::Configuration(format!(
                "Embeddings require the google provider (missing credential {} or disabled)",
                ProviderKind::Google.credential_env()
            ))
        })
    }

    pub fn is_configured(&self, kind: ProviderKind) -> bool {
        self.providers.contains_key(&kind)
    }

    /// Configured providers, in stable order
    pub fn configured(&self) -> Vec<ProviderKind> {
        self.providers.keys().copied().collect()
    }

    /// Every known provider with its models, flagged by whether it can serve requests
    pub fn catalog(&self) -> BTreeMap<ProviderKind, ProviderInfo> {
        ProviderKind::ALL
            .into_iter()
            .map(|kind| (kind, ProviderInfo::new(kind, self.is_configured(kind))))
            .collect()
    }

    /// Check health of all providers concurrently
    pub async fn health_check_all(&self) -> BTreeMap<ProviderKind, bool> {
        let checks = self.providers.iter().map(|(kind, provider)| async move {
            info!("Health checking provider: {}", kind);
            (*kind, provider.health_check().await)
        });
        join_all(checks).await.into_iter().collect()
    }
}
