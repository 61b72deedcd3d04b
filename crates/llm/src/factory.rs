//! Completion client factory.
//!
//! Resolves a provider name into a concrete [`LlmClient`]. Callers own the
//! returned client and pass it down explicitly; nothing here is cached
//! process-wide.

use crate::client::LlmClient;
use crate::providers::{OllamaClient, OpenAiClient};
use crate::types::ProviderType;
use sift_core::{AppError, AppResult};
use std::sync::Arc;
use std::time::Duration;

/// Create a completion client.
///
/// # Arguments
/// * `provider` - Provider identifier ("ollama", "openai", "groq")
/// * `endpoint` - Optional custom endpoint URL (falls back to the provider default)
/// * `api_key` - API key, required by hosted providers
/// * `timeout_secs` - Optional request timeout (Ollama only)
///
/// # Errors
/// `AppError::Config` when the provider is unknown or a required key is missing.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
    timeout_secs: Option<u64>,
) -> AppResult<Arc<dyn LlmClient>> {
    let provider_type = ProviderType::parse(provider)
        .ok_or_else(|| AppError::Config(format!("Unknown provider: {}", provider)))?;

    let base_url = endpoint.unwrap_or(provider_type.default_endpoint());

    tracing::debug!("Creating {} client for {}", provider_type.as_str(), base_url);

    match provider_type {
        ProviderType::Ollama => {
            let client = match timeout_secs {
                Some(secs) => OllamaClient::with_timeout(base_url, Duration::from_secs(secs)),
                None => OllamaClient::with_base_url(base_url),
            };
            Ok(Arc::new(client))
        }
        ProviderType::OpenAI | ProviderType::Groq => {
            let api_key = api_key.ok_or_else(|| {
                AppError::Config(format!(
                    "{} provider requires API key",
                    provider_type.as_str()
                ))
            })?;
            Ok(Arc::new(OpenAiClient::new(
                provider_type.as_str(),
                base_url,
                api_key,
            )))
        }
    }
}
