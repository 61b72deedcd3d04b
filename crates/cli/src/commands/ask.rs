//! Ask command handler.
//!
//! Retrieves context from a knowledge base and asks the configured
//! completion model to answer from it.

use clap::Args;
use sift_core::{config::AppConfig, AppResult};
use sift_knowledge::{AskOptions, MetadataFilter};

/// Ask a question answered from a knowledge base
#[derive(Args, Debug)]
pub struct AskCommand {
    /// Knowledge base name
    pub base: String,

    /// The question to ask
    pub query: String,

    /// Number of records to retrieve
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Metadata conditions (key=value, key!=value, key=a|b, key)
    #[arg(long = "where", value_name = "CONDITION")]
    pub conditions: Vec<String>,

    /// Drop retrieved records scoring below this similarity
    #[arg(long, default_value_t = 0.0)]
    pub min_score: f32,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        config.validate()?;

        let options = AskOptions {
            base_name: self.base.clone(),
            query: self.query.clone(),
            top_k: self.top_k,
            filter: MetadataFilter::parse_conditions(&self.conditions)?,
            min_score: self.min_score,
        };

        let endpoint = config.provider_endpoint(&config.provider);
        let api_key = config.resolve_api_key(&config.provider);

        let response = sift_knowledge::ask(
            &config.workspace,
            options,
            &config.provider,
            &config.model,
            endpoint.as_deref(),
            api_key.as_deref(),
        )
        .await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&response)?);
            return Ok(());
        }

        println!("{}", response.answer);

        if response.has_sources() {
            println!();
            println!("Sources:");
            for (i, source) in response.sources.iter().enumerate() {
                println!("  {}. {} (score {:.3})", i + 1, source.source, source.score);
            }
        }

        Ok(())
    }
}
