// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use gateway_core::domain::catalog::ProviderInfo;
use gateway_core::domain::embedding::{EmbedBatchRequest, EmbedBatchResponse, EmbedRequest, EmbedResponse};
use gateway_core::domain::llm::{GenerationRequest, GenerationResponse};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;

use crate::types::{Envelope, ErrorEnvelope, HealthStatus, ModelsData, ProvidersData};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The gateway answered with its error envelope
    #[error("Gateway error {status} ({code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Unexpected response from gateway (HTTP {status}): {body}")]
    Unexpected { status: u16, body: String },
}

/// Client for interacting with an LLM gateway.
pub struct GatewayClient {
    base_url: String,
    client: Client,
    api_key: Option<String>,
}

impl GatewayClient {
    /// Create a new gateway client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: Client::new(),
            api_key: None,
        }
    }

    /// Set the API key for authentication.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => req.bearer_auth(key),
            None => req,
        }
    }

    /// Generate a completion.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, ClientError> {
        let url = format!("{}/llm/generate", self.base_url);
        let response = self.authorize(self.client.post(&url).json(request)).send().await?;
        Self::decode(response).await
    }

    /// Embed one text.
    pub async fn embed(&self, request: &EmbedRequest) -> Result<EmbedResponse, ClientError> {
        let url = format!("{}/embed", self.base_url);
        let response = self.authorize(self.client.post(&url).json(request)).send().await?;
        Self::decode(response).await
    }

    /// Embed up to 100 texts; vectors come back in input order.
    pub async fn embed_batch(&self, request: &EmbedBatchRequest) -> Result<EmbedBatchResponse, ClientError> {
        let url = format!("{}/embed/batch", self.base_url);
        let response = self.authorize(self.client.post(&url).json(request)).send().await?;
        Self::decode(response).await
    }

    /// All known providers and whether each is enabled.
    pub async fn providers(&self) -> Result<BTreeMap<String, ProviderInfo>, ClientError> {
        let url = format!("{}/llm/providers", self.base_url);
        let response = self.authorize(self.client.get(&url)).send().await?;
        let envelope: Envelope<ProvidersData> = Self::decode(response).await?;
        Ok(envelope.data.providers)
    }

    /// Models per provider, or for one provider.
    pub async fn models(&self, provider: Option<&str>) -> Result<BTreeMap<String, Vec<String>>, ClientError> {
        let url = format!("{}/llm/models", self.base_url);
        let mut request = self.authorize(self.client.get(&url)).build()?;
        if let Some(provider) = provider {
            request
                .url_mut()
                .query_pairs_mut()
                .append_pair("provider", provider.trim());
        }
        let response = self.client.execute(request).await?;
        let envelope: Envelope<ModelsData> = Self::decode(response).await?;
        Ok(envelope.data.models)
    }

    /// Liveness.
    pub async fn health(&self) -> Result<HealthStatus, ClientError> {
        let url = format!("{}/health", self.base_url);
        let response = self.authorize(self.client.get(&url)).send().await?;
        Self::decode(response).await
    }

    /// Readiness with per-provider status. A degraded gateway (HTTP 503) is a
    /// successful call that reports `status == "degraded"`.
    pub async fn health_detailed(&self) -> Result<HealthStatus, ClientError> {
        let url = format!("{}/health/detailed", self.base_url);
        let response = self.authorize(self.client.get(&url)).send().await?;
        if response.status() == StatusCode::SERVICE_UNAVAILABLE {
            let body = response.text().await?;
            return serde_json::from_str(&body).map_err(|_| ClientError::Unexpected { status: 503, body });
        }
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(match serde_json::from_str::<ErrorEnvelope>(&body) {
                Ok(envelope) => ClientError::Api {
                    status: status.as_u16(),
                    code: envelope.error_code,
                    message: envelope.error,
                },
                Err(_) => ClientError::Unexpected {
                    status: status.as_u16(),
                    body,
                },
            });
        }

        serde_json::from_str(&body).map_err(|_| ClientError::Unexpected {
            status: status.as_u16(),
            body,
        })
    }
}
