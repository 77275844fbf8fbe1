// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Text generation through a running gateway

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use gateway_sdk::{GatewayClient, GenerationRequest};

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Prompt text
    #[arg(short, long)]
    pub prompt: String,

    /// Provider (google, openai); the gateway's default if omitted
    #[arg(long)]
    pub provider: Option<String>,

    /// Model id (provider default if omitted)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Sampling temperature, 0.0 to 1.0
    #[arg(short, long, default_value_t = 0.7)]
    pub temperature: f32,

    /// Maximum output tokens
    #[arg(long)]
    pub max_tokens: Option<i64>,

    /// System message
    #[arg(long = "system")]
    pub system_message: Option<String>,

    /// Ground the answer with Google Search (Gemini only)
    #[arg(long)]
    pub search: bool,

    /// Ground the answer with Google Maps (Gemini only)
    #[arg(long)]
    pub maps: bool,

    /// Print the full JSON response
    #[arg(long)]
    pub json: bool,
}

impl GenerateArgs {
    pub fn to_request(&self) -> GenerationRequest {
        GenerationRequest {
            prompt: self.prompt.clone(),
            provider: self.provider.clone(),
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            system_message: self.system_message.clone(),
            use_search: self.search,
            use_maps: self.maps,
            stream: false,
            metadata: None,
        }
    }
}

pub async fn handle_command(args: GenerateArgs, client: &GatewayClient) -> Result<()> {
    let response = client
        .generate(&args.to_request())
        .await
        .with_context(|| format!("Generation failed via {}", client.base_url()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    println!("{}", response.text);
    println!();
    println!(
        "{}",
        format!(
            "{}/{} | finish: {} | tokens: {} prompt + {} completion = {}",
            response.provider,
            response.model,
            response.finish_reason,
            response.usage.prompt_tokens,
            response.usage.completion_tokens,
            response.usage.total_tokens
        )
        .dimmed()
    );

    Ok(())
}
