// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Gateway HTTP server bootstrap

use anyhow::{Context, Result};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};

use gateway_core::{
    application::{EmbeddingService, GenerationService},
    domain::gateway_config::GatewayConfig,
    infrastructure::{llm::ProviderRegistry, telemetry},
    presentation::{app, AppState},
};

/// Build the router for a configuration. Exposed for tests.
pub fn build_router(config: &GatewayConfig, metrics: Option<PrometheusHandle>) -> Router {
    let registry = Arc::new(ProviderRegistry::from_config(config));
    let generation = Arc::new(
        GenerationService::new(registry.clone(), config.fallback())
            .with_default_provider(config.default_provider()),
    );
    let embeddings = Arc::new(EmbeddingService::new(registry));

    let state = AppState::new(generation, embeddings);
    let state = match metrics {
        Some(handle) => state.with_metrics(handle, config.spec.metrics.path.clone()),
        None => state,
    };
    app(state)
}

pub async fn run(mut config: GatewayConfig, host: Option<String>, port: Option<u16>) -> Result<()> {
    if let Some(host) = host {
        config.spec.server.bind_address = host;
    }
    if let Some(port) = port {
        config.spec.server.port = port;
    }

    config
        .validate()
        .context("Configuration validation failed")?;

    info!(
        "LLM gateway starting: instance={} version={}",
        config.metadata.name,
        env!("CARGO_PKG_VERSION")
    );

    let metrics = if config.spec.metrics.enabled {
        match telemetry::install_prometheus_recorder() {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!("Metrics disabled: {}", e);
                None
            }
        }
    } else {
        None
    };

    info!("Default provider: {}", config.default_provider());
    if let Some(fallback) = config.fallback() {
        info!("Fallback provider enabled: {}", fallback);
    }

    let app = build_router(&config, metrics);

    let addr = format!("{}:{}", config.spec.server.bind_address, config.spec.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Gateway listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Gateway shutting down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
