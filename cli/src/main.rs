// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # LLM Gateway CLI
//!
//! The `llm-gateway` binary runs the gateway HTTP server and doubles as a
//! client for a running gateway.
//!
//! ## Commands
//!
//! - `llm-gateway serve` - Run the HTTP server
//! - `llm-gateway generate --prompt ...` - Generate text through a running gateway
//! - `llm-gateway embed TEXT...` - Embed texts through a running gateway
//! - `llm-gateway models|providers|health` - Inspect a running gateway
//! - `llm-gateway config show|validate|generate` - Configuration management

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use gateway_core::domain::gateway_config::GatewayConfig;
use llm_gateway::commands::{self, ConfigCommand, EmbedArgs, GenerateArgs};
use llm_gateway::server;

/// LLM Gateway - one HTTP API in front of several LLM vendors
#[derive(Parser)]
#[command(name = "llm-gateway")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(
        short,
        long,
        global = true,
        env = "GATEWAY_CONFIG_PATH",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// HTTP host to bind (serve) or connect to (client commands)
    #[arg(long, global = true, env = "GATEWAY_HOST")]
    host: Option<String>,

    /// HTTP port to bind (serve) or connect to (client commands)
    #[arg(long, global = true, env = "GATEWAY_PORT")]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, global = true, env = "GATEWAY_LOG_LEVEL")]
    log_level: Option<String>,

    /// Bearer token sent by client commands
    #[arg(long, global = true, env = "GATEWAY_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the gateway HTTP server
    #[command(name = "serve")]
    Serve,

    /// Generate text through a running gateway
    #[command(name = "generate")]
    Generate(GenerateArgs),

    /// Embed texts through a running gateway
    #[command(name = "embed")]
    Embed(EmbedArgs),

    /// List models known to a running gateway
    #[command(name = "models")]
    Models {
        /// Only this provider
        #[arg(short, long)]
        provider: Option<String>,
    },

    /// List providers of a running gateway
    #[command(name = "providers")]
    Providers,

    /// Check a running gateway
    #[command(name = "health")]
    Health {
        /// Check every configured provider
        #[arg(long)]
        detailed: bool,
    },

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is normal
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let Some(command) = cli.command else {
        eprintln!("{}", "No command specified. Use --help for usage.".yellow());
        std::process::exit(1);
    };

    if !matches!(command, Commands::Serve) {
        init_logging(cli.log_level.as_deref().unwrap_or("warn"), "text")?;
    }
    let client = commands::client(cli.host.as_deref(), cli.port, cli.api_key.as_deref());

    match command {
        Commands::Serve => {
            let config = GatewayConfig::load_or_default(cli.config.clone())
                .context("Failed to load configuration")?;
            let level = cli
                .log_level
                .clone()
                .unwrap_or_else(|| config.spec.logging.level.clone());
            init_logging(&level, &config.spec.logging.format)?;
            server::run(config, cli.host, cli.port).await
        }
        Commands::Generate(args) => commands::generate::handle_command(args, &client).await,
        Commands::Embed(args) => commands::embed::handle_command(args, &client).await,
        Commands::Models { provider } => commands::inspect::models(&client, provider.as_deref()).await,
        Commands::Providers => commands::inspect::providers(&client).await,
        Commands::Health { detailed } => commands::inspect::health(&client, detailed).await,
        Commands::Config { command } => commands::config::handle_command(command, cli.config).await,
    }
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str, format: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    if format == "json" {
        builder.json().with_current_span(false).init();
    } else {
        builder.with_target(false).compact().init();
    }

    Ok(())
}
