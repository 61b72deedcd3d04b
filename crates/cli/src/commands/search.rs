//! Search command handler.

use clap::Args;
use sift_core::{config::AppConfig, AppResult};
use sift_knowledge::{MetadataFilter, SearchOptions};

/// Retrieve the records most similar to a query
#[derive(Args, Debug)]
pub struct SearchCommand {
    /// Knowledge base name
    pub base: String,

    /// Query text
    pub query: String,

    /// Number of results
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Metadata conditions (key=value, key!=value, key=a|b, key)
    #[arg(long = "where", value_name = "CONDITION")]
    pub conditions: Vec<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl SearchCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing search command");
        tracing::debug!("Search options: {:?}", self);

        let options = SearchOptions {
            base_name: self.base.clone(),
            query: self.query.clone(),
            top_k: self.top_k,
            filter: MetadataFilter::parse_conditions(&self.conditions)?,
        };

        let results =
            sift_knowledge::search(&config.workspace, &options, config.api_key.as_deref()).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&results)?);
            return Ok(());
        }

        if results.is_empty() {
            println!("No matching records in '{}'", self.base);
            return Ok(());
        }

        for (i, result) in results.iter().enumerate() {
            println!("{}. [{:.3}] {}", i + 1, result.score, result.id);
            println!("   {}", preview(&result.text, 120));
        }

        Ok(())
    }
}

/// First `max_chars` characters of `text` on a single line.
fn preview(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        flat
    } else {
        let cut: String = flat.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}
