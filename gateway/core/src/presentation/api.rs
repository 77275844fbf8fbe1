// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::application::{EmbeddingService, GenerationService};
use crate::domain::embedding::{EmbedBatchRequest, EmbedRequest};
use crate::domain::gateway_config::RESERVED_PATHS;
use crate::domain::llm::{GenerationRequest, LLMError};

pub const SERVICE_NAME: &str = "llm-gateway";

pub struct AppState {
    pub generation: Arc<GenerationService>,
    pub embeddings: Arc<EmbeddingService>,
    /// Prometheus handle; `/metrics` is only routed when set
    pub metrics: Option<PrometheusHandle>,
    pub metrics_path: String,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(generation: Arc<GenerationService>, embeddings: Arc<EmbeddingService>) -> Self {
        Self {
            generation,
            embeddings,
            metrics: None,
            metrics_path: "/metrics".to_string(),
            started_at: Instant::now(),
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle, path: impl Into<String>) -> Self {
        self.metrics = Some(handle);
        self.metrics_path = path.into();
        self
    }
}

pub fn app(state: AppState) -> Router {
    let metrics_path = state.metrics.as_ref().map(|_| state.metrics_path.clone());

    let mut router = Router::new()
        .route("/llm/generate", post(generate_handler))
        .route("/llm/providers", get(providers_handler))
        .route("/llm/models", get(models_handler))
        .route("/health", get(health_handler))
        .route("/health/detailed", get(detailed_health_handler))
        .route("/embed", post(embed_handler))
        .route("/embed/batch", post(embed_batch_handler))
        .route("/embed/health", get(embed_health_handler));

    match metrics_path {
        Some(path) if RESERVED_PATHS.contains(&path.trim_end_matches('/')) => {
            warn!("Metrics path {} collides with a gateway route; metrics not exposed", path);
        }
        Some(path) => router = router.route(&path, get(metrics_handler)),
        None => {}
    }

    router
        .with_state(Arc::new(state))
        .layer(TraceLayer::new_for_http())
}

/// Error envelope: `{success:false, error, error_code, timestamp, details?}`
pub struct ApiError(pub LLMError);

impl From<LLMError> for ApiError {
    fn from(err: LLMError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let mut body = json!({
            "success": false,
            "error": self.0.to_string(),
            "error_code": self.0.code(),
            "timestamp": Utc::now().to_rfc3339(),
        });
        if let Some(provider) = self.0.provider() {
            body["details"] = json!({ "provider": provider.as_str() });
        }

        (status, Json(body)).into_response()
    }
}

fn success(data: Value, message: &str) -> Json<Value> {
    Json(json!({
        "success": true,
        "data": data,
        "message": message,
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, LLMError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| LLMError::Validation(format!("Invalid request body: {}", rejection.body_text())))
}

async fn generate_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<GenerationRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let request = json_body(payload)?;
    let response = state.generation.generate(request).await?;
    Ok(Json(response).into_response())
}

async fn embed_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<EmbedRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let request = json_body(payload)?;
    let response = state.embeddings.embed(request).await?;
    Ok(Json(response).into_response())
}

async fn embed_batch_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<EmbedBatchRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let request = json_body(payload)?;
    let response = state.embeddings.embed_batch(request).await?;
    Ok(Json(response).into_response())
}

async fn embed_health_handler(State(state): State<Arc<AppState>>) -> Response {
    let status = state.embeddings.status();
    let (code, label) = if status.available {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
    };
    let body = json!({
        "status": label,
        "model": status.model,
        "dimensions": status.dimensions,
        "task_types": status.task_types,
    });
    (code, Json(body)).into_response()
}

async fn providers_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    let providers = state.generation.providers();
    success(json!({ "providers": providers }), "Providers retrieved successfully")
}

#[derive(Debug, Deserialize)]
struct ModelsQuery {
    provider: Option<String>,
}

async fn models_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ModelsQuery>,
) -> Result<Json<Value>, ApiError> {
    let models = state.generation.list_models(query.provider.as_deref())?;
    Ok(success(json!({ "models": models }), "Models retrieved successfully"))
}

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_seconds": state.started_at.elapsed().as_secs(),
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

async fn detailed_health_handler(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let report = state.generation.health(None).await?;
    let (status, label) = if report.healthy {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    let body = json!({
        "status": label,
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_seconds": state.started_at.elapsed().as_secs(),
        "timestamp": Utc::now().to_rfc3339(),
        "providers": report.providers,
    });
    Ok((status, Json(body)).into_response())
}

async fn metrics_handler(State(state): State<Arc<AppState>>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
