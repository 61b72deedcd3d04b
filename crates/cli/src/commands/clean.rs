//! Clean command handler.

use clap::Args;
use sift_core::{config::AppConfig, AppResult};

/// Remove all records from a knowledge base
#[derive(Args, Debug)]
pub struct CleanCommand {
    /// Knowledge base name
    pub base: String,
}

impl CleanCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing clean command");

        sift_knowledge::clean(&config.workspace, &self.base)?;
        println!("Knowledge base '{}' cleaned", self.base);

        Ok(())
    }
}
