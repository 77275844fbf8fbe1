// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Read-only commands against a running gateway
//!
//! Commands: models, providers, health

use anyhow::{bail, Context, Result};
use colored::Colorize;

use gateway_sdk::GatewayClient;

pub async fn models(client: &GatewayClient, provider: Option<&str>) -> Result<()> {
    let models = client
        .models(provider)
        .await
        .context("Failed to list models")?;

    for (provider, models) in models {
        println!("{}", provider.bold());
        for model in models {
            println!("  - {}", model);
        }
    }

    Ok(())
}

pub async fn providers(client: &GatewayClient) -> Result<()> {
    let providers = client
        .providers()
        .await
        .context("Failed to list providers")?;

    for (name, info) in providers {
        let state = if info.enabled {
            "enabled".green()
        } else {
            "disabled".red()
        };
        println!("{} ({}) [{}]", name.bold(), info.display_name, state);
        println!("  Default model: {}", info.default_model);
        println!("  Models: {}", info.models.join(", "));
    }

    Ok(())
}

pub async fn health(client: &GatewayClient, detailed: bool) -> Result<()> {
    let health = if detailed {
        client.health_detailed().await
    } else {
        client.health().await
    }
    .with_context(|| format!("Gateway at {} is unreachable", client.base_url()))?;

    let status = if health.is_healthy() {
        health.status.green()
    } else {
        health.status.yellow()
    };
    println!(
        "{} {} v{} - {} (up {}s)",
        "●".bold(),
        health.service,
        health.version,
        status,
        health.uptime_seconds
    );

    if let Some(providers) = &health.providers {
        for (name, healthy) in providers {
            let mark = if *healthy { "✓".green() } else { "✗".red() };
            println!("  {} {}", mark, name);
        }
    }

    if !health.is_healthy() {
        bail!("Gateway is {}", health.status);
    }

    Ok(())
}
