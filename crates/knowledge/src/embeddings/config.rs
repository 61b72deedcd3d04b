//! Embedding configuration types.

use serde::{Deserialize, Serialize};
use sift_core::{AppError, AppResult};

/// Embedding configuration for a knowledge base.
///
/// Lives under the `embedding:` key of the base's `config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingConfig {
    /// Provider name: "trigram", "ollama", "openai"
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Model identifier (provider-specific)
    #[serde(default = "default_model")]
    pub model: String,

    /// Embedding vector dimensions
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,

    /// Maximum number of texts per embedding request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Custom endpoint URL (falls back to the provider default)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Environment variable holding the API key (hosted providers)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    /// Request timeout in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

fn default_provider() -> String {
    "trigram".to_string()
}

fn default_model() -> String {
    "trigram-v1".to_string()
}

fn default_dimensions() -> usize {
    384
}

fn default_batch_size() -> usize {
    100
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            dimensions: default_dimensions(),
            batch_size: default_batch_size(),
            endpoint: None,
            api_key_env: None,
            timeout_secs: None,
        }
    }
}

impl EmbeddingConfig {
    /// Defaults for a named provider.
    pub fn for_provider(provider: &str) -> AppResult<Self> {
        let (model, dimensions) = match provider {
            "trigram" => ("trigram-v1", 384),
            "ollama" => ("nomic-embed-text", 768),
            "openai" => ("text-embedding-3-small", 1536),
            other => {
                return Err(AppError::Config(format!(
                    "Unknown embedding provider: '{}'. Supported providers: trigram, ollama, openai",
                    other
                )))
            }
        };

        Ok(Self {
            provider: provider.to_string(),
            model: model.to_string(),
            dimensions,
            ..Default::default()
        })
    }

    /// Validate that another config is consistent with this one.
    ///
    /// Vectors produced under inconsistent configs cannot share an index.
    pub fn validate_consistency(&self, other: &Self) -> AppResult<()> {
        if self.provider != other.provider {
            return Err(AppError::Knowledge(format!(
                "Provider mismatch: expected '{}', got '{}'",
                self.provider, other.provider
            )));
        }

        if self.model != other.model {
            return Err(AppError::Knowledge(format!(
                "Model mismatch: expected '{}', got '{}'",
                self.model, other.model
            )));
        }

        if self.dimensions != other.dimensions {
            return Err(AppError::dimension_mismatch(self.dimensions, other.dimensions));
        }

        Ok(())
    }
}
