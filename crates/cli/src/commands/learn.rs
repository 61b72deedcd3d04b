//! Learn command handler.

use clap::Args;
use sift_core::config::{AppConfig, ProviderConfig};
use sift_core::AppResult;
use sift_knowledge::embeddings::EmbeddingConfig;
use sift_knowledge::LearnOptions;
use std::path::PathBuf;

/// Learn from local files and directories
#[derive(Args, Debug)]
pub struct LearnCommand {
    /// Knowledge base name
    pub base: String,

    /// Files or directories to learn from
    #[arg(long, required = true)]
    pub path: Vec<PathBuf>,

    /// Only learn paths containing one of these substrings
    #[arg(long)]
    pub include: Vec<String>,

    /// Skip paths containing one of these substrings
    #[arg(long)]
    pub exclude: Vec<String>,

    /// Reset base before learning
    #[arg(long)]
    pub reset: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl LearnCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing learn command for base '{}'", self.base);

        let options = LearnOptions {
            base_name: self.base.clone(),
            paths: self.path.clone(),
            include: self.include.clone(),
            exclude: self.exclude.clone(),
            reset: self.reset,
            embedding: Some(embedding_defaults(config)?),
        };

        let stats =
            sift_knowledge::learn(&config.workspace, &options, config.api_key.as_deref()).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        } else {
            println!(
                "Learned {} sources ({} chunks, {} bytes) in {:.2}s; '{}' now holds {} records",
                stats.sources_count,
                stats.chunks_count,
                stats.bytes_processed,
                stats.duration_secs,
                self.base,
                stats.records_count
            );
        }

        Ok(())
    }
}

/// Embedding settings for a new base, from the active embedding provider
/// and its `llm.providers` entry.
pub fn embedding_defaults(config: &AppConfig) -> AppResult<EmbeddingConfig> {
    let mut embedding = EmbeddingConfig::for_provider(&config.embedding_provider)?;

    if let Some(provider_config) = config.get_provider_config(&config.embedding_provider) {
        if let Some(model) = provider_config.embedding_model() {
            embedding.model = model.to_string();
        }
        embedding.endpoint = provider_config.endpoint().map(str::to_string);
        embedding.timeout_secs = provider_config.timeout();
        if let ProviderConfig::OpenAI { api_key_env, .. } = provider_config {
            embedding.api_key_env = Some(api_key_env.clone());
        }
    }

    Ok(embedding)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sift_core::config::LlmConfig;
    use std::collections::HashMap;

    #[test]
    fn test_embedding_defaults_trigram() {
        let config = AppConfig::default();
        let embedding = embedding_defaults(&config).unwrap();
        assert_eq!(embedding.provider, "trigram");
        assert_eq!(embedding.dimensions, 384);
    }

    #[test]
    fn test_embedding_defaults_from_provider_config() {
        let mut providers = HashMap::new();
        providers.insert(
            "ollama".to_string(),
            ProviderConfig::Ollama {
                endpoint: "http://gpu-box:11434".to_string(),
                model: "llama3.2".to_string(),
                embedding_model: Some("mxbai-embed-large".to_string()),
                timeout: Some(90),
            },
        );
        let config = AppConfig {
            embedding_provider: "ollama".to_string(),
            llm: Some(LlmConfig {
                active_provider: "ollama".to_string(),
                active_embedding_provider: "ollama".to_string(),
                providers,
            }),
            ..AppConfig::default()
        };

        let embedding = embedding_defaults(&config).unwrap();
        assert_eq!(embedding.model, "mxbai-embed-large");
        assert_eq!(embedding.endpoint.as_deref(), Some("http://gpu-box:11434"));
        assert_eq!(embedding.timeout_secs, Some(90));
    }

    #[test]
    fn test_unknown_embedding_provider() {
        let config = AppConfig {
            embedding_provider: "gguf".to_string(),
            ..AppConfig::default()
        };
        assert!(embedding_defaults(&config).is_err());
    }
}
