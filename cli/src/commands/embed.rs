// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Text embeddings through a running gateway

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use gateway_sdk::{EmbedBatchRequest, EmbedRequest, EmbeddingTask, GatewayClient};

#[derive(Args, Debug)]
pub struct EmbedArgs {
    /// Text to embed; several texts are sent as one batch
    #[arg(required = true, value_name = "TEXT")]
    pub texts: Vec<String>,

    /// Embed as a search query instead of a stored document
    #[arg(long)]
    pub query: bool,

    /// Print the full JSON response
    #[arg(long)]
    pub json: bool,
}

impl EmbedArgs {
    fn task(&self) -> EmbeddingTask {
        if self.query {
            EmbeddingTask::Query
        } else {
            EmbeddingTask::Document
        }
    }
}

pub async fn handle_command(args: EmbedArgs, client: &GatewayClient) -> Result<()> {
    let context = || format!("Embedding failed via {}", client.base_url());

    if let [text] = args.texts.as_slice() {
        let response = client
            .embed(&EmbedRequest::new(text.clone(), args.task()))
            .await
            .with_context(context)?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&response)?);
        } else {
            println!("{}", preview(&response.embedding));
            println!("{}", format!("{} | {} dimensions", response.model, response.dimensions).dimmed());
        }
        return Ok(());
    }

    let request = EmbedBatchRequest {
        task_type: args.task(),
        ..EmbedBatchRequest::new(args.texts.clone())
    };
    let response = client.embed_batch(&request).await.with_context(context)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }
    for (text, vector) in args.texts.iter().zip(&response.embeddings) {
        println!("{} {}", text.bold(), preview(vector));
    }
    println!(
        "{}",
        format!(
            "{} | {} vectors x {} dimensions",
            response.model, response.count, response.dimensions
        )
        .dimmed()
    );

    Ok(())
}

/// First few components of a vector
fn preview(vector: &[f32]) -> String {
    const SHOWN: usize = 4;
    let head: Vec<String> = vector.iter().take(SHOWN).map(|v| format!("{:.4}", v)).collect();
    if vector.len() > SHOWN {
        format!("[{}, ...]", head.join(", "))
    } else {
        format!("[{}]", head.join(", "))
    }
}
