//! Stats command handler.

use clap::Args;
use sift_core::{config::AppConfig, AppResult};

/// Show knowledge base statistics
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Knowledge base name
    pub base: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing stats command");

        let stats = sift_knowledge::stats(&config.workspace, &self.base)?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&stats)?);
            return Ok(());
        }

        println!("Knowledge base: {}", stats.base_name);
        println!("  Records:    {}", stats.records_count);
        println!("  Sources:    {}", stats.sources_count);
        match stats.dimensions {
            Some(dims) => println!("  Dimensions: {}", dims),
            None => println!("  Dimensions: -"),
        }
        println!("  Index size: {} bytes", stats.index_size_bytes);
        println!("  Embeddings: {}", stats.embedding_provider);
        match stats.last_learn_at {
            Some(at) => println!("  Last learn: {}", at.to_rfc3339()),
            None => println!("  Last learn: never"),
        }

        Ok(())
    }
}
