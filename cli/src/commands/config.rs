// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show, validate, generate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use gateway_core::domain::gateway_config::GatewayConfig;
use gateway_core::domain::llm::ProviderKind;
use gateway_core::infrastructure::llm::ProviderRegistry;

pub const MINIMAL_TEMPLATE: &str = include_str!("../../templates/config-minimal.yaml");
pub const EXAMPLES_TEMPLATE: &str = include_str!("../../templates/config-with-examples.yaml");

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Show config file paths checked
        #[arg(long)]
        paths: bool,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (default: discover)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Generate sample configuration
    Generate {
        /// Output path (default: ./gateway-config.yaml)
        #[arg(short, long, default_value = "./gateway-config.yaml")]
        output: PathBuf,

        /// Include examples and comments
        #[arg(long)]
        examples: bool,
    },
}

pub async fn handle_command(
    command: ConfigCommand,
    config_override: Option<PathBuf>,
) -> Result<()> {
    match command {
        ConfigCommand::Show { paths } => show(config_override, paths).await,
        ConfigCommand::Validate { file } => validate(file.or(config_override)).await,
        ConfigCommand::Generate { output, examples } => generate(output, examples).await,
    }
}

async fn show(config_override: Option<PathBuf>, show_paths: bool) -> Result<()> {
    let config = GatewayConfig::load_or_default(config_override.clone())
        .context("Failed to load configuration")?;

    if show_paths {
        println!("{}", "Configuration discovery paths:".bold());
        match &config_override {
            Some(path) => println!("  1. --config flag: {}", path.display()),
            None => println!("  1. --config flag: {}", "(not set)".dimmed()),
        }
        for (i, path) in GatewayConfig::search_paths().iter().enumerate() {
            let marker = if path.exists() { "found".green() } else { "missing".dimmed() };
            println!("  {}. {} [{}]", i + 2, path.display(), marker);
        }
        println!();
    }

    println!("{}", "Current configuration:".bold());
    println!();

    println!("{}", "Instance:".bold());
    println!("  Name: {}", config.metadata.name);
    println!(
        "  Listen: {}:{}",
        config.spec.server.bind_address, config.spec.server.port
    );
    println!();

    // Credentials are resolved but never printed
    let registry = ProviderRegistry::from_config(&config);
    println!("{}", "LLM Providers:".bold());
    for provider in &config.spec.providers {
        let Ok(kind) = provider.name.parse::<ProviderKind>() else {
            println!("  {} {}", provider.name.bold(), "(unknown provider)".red());
            continue;
        };
        let state = if registry.is_configured(kind) {
            "ready".green()
        } else if !provider.enabled {
            "disabled".dimmed()
        } else {
            format!("missing credential ({})", kind.credential_env()).yellow()
        };
        println!("  {} [{}]", kind.display_name().bold(), state);
        println!(
            "    Endpoint: {}",
            provider.endpoint.as_deref().unwrap_or(kind.default_endpoint())
        );
    }
    println!();

    println!("{}", "Provider Selection:".bold());
    println!(
        "  Default provider: {}",
        config.default_provider()
    );
    match config.fallback() {
        Some(fallback) => println!("  Fallback provider: {}", fallback),
        None => println!("  Fallback provider: {}", "(disabled)".dimmed()),
    }
    println!();

    println!("{}", "Observability:".bold());
    println!(
        "  Logging: {} ({})",
        config.spec.logging.level, config.spec.logging.format
    );
    if config.spec.metrics.enabled {
        println!("  Metrics: {}", config.spec.metrics.path);
    } else {
        println!("  Metrics: {}", "(disabled)".dimmed());
    }

    Ok(())
}

async fn validate(config_path: Option<PathBuf>) -> Result<()> {
    println!("Validating configuration...");

    let config = GatewayConfig::load_or_default(config_path)
        .context("Failed to load configuration")?;

    config
        .validate()
        .context("Configuration validation failed")?;

    println!("{}", "✓ Configuration is valid".green());

    Ok(())
}

async fn generate(output: PathBuf, with_examples: bool) -> Result<()> {
    let sample = if with_examples {
        EXAMPLES_TEMPLATE
    } else {
        MINIMAL_TEMPLATE
    };

    std::fs::write(&output, sample)
        .with_context(|| format!("Failed to write config to {:?}", output))?;

    println!(
        "{}",
        format!("✓ Configuration generated: {}", output.display()).green()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_are_valid() {
        for template in [MINIMAL_TEMPLATE, EXAMPLES_TEMPLATE] {
            let config = GatewayConfig::from_yaml_str(template).unwrap();
            config.validate().unwrap();
        }
    }

    #[tokio::test]
    async fn test_generate_then_validate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gateway-config.yaml");

        generate(path.clone(), true).await.unwrap();
        validate(Some(path)).await.unwrap();
    }
}
