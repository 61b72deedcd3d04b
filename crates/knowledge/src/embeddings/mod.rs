//! Embedding generation for knowledge bases.
//!
//! Providers are created from a base's [`EmbeddingConfig`] and passed to the
//! callers that need them; nothing is cached process-wide.

pub mod config;
pub mod provider;
pub mod providers;

pub use config::EmbeddingConfig;
pub use provider::{create_provider, EmbeddingProvider};

use sift_core::{AppError, AppResult};

/// Embed `texts` in batches of at most `batch_size`.
///
/// Every returned vector is checked against the provider's configured
/// dimensions; a mismatch is an `AppError::Embedding`.
pub async fn embed_texts(
    provider: &dyn EmbeddingProvider,
    texts: &[String],
    batch_size: usize,
) -> AppResult<Vec<Vec<f32>>> {
    if texts.is_empty() {
        return Ok(Vec::new());
    }

    let batch_size = batch_size.max(1);
    let expected = provider.dimensions();

    tracing::info!(
        "Embedding {} texts using provider '{}' (model: {})",
        texts.len(),
        provider.provider_name(),
        provider.model_name()
    );

    let mut embeddings = Vec::with_capacity(texts.len());
    for (batch_no, batch) in texts.chunks(batch_size).enumerate() {
        let vectors = provider.embed_batch(batch).await?;

        if vectors.len() != batch.len() {
            return Err(AppError::Embedding(format!(
                "Provider returned {} embeddings for a batch of {}",
                vectors.len(),
                batch.len()
            )));
        }
        if let Some(bad) = vectors.iter().find(|v| v.len() != expected) {
            return Err(AppError::Embedding(format!(
                "Provider '{}' returned {} dimensions, expected {}",
                provider.provider_name(),
                bad.len(),
                expected
            )));
        }

        tracing::debug!("Embedded batch {} ({} texts)", batch_no, batch.len());
        embeddings.extend(vectors);
    }

    Ok(embeddings)
}

/// Embed a single query text with the same dimension check as [`embed_texts`].
pub async fn embed_query(provider: &dyn EmbeddingProvider, query: &str) -> AppResult<Vec<f32>> {
    let embedding = provider.embed(query).await?;
    if embedding.len() != provider.dimensions() {
        return Err(AppError::Embedding(format!(
            "Provider '{}' returned {} dimensions, expected {}",
            provider.provider_name(),
            embedding.len(),
            provider.dimensions()
        )));
    }
    Ok(embedding)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::providers::TrigramProvider;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Records batch sizes and returns vectors of a fixed length.
    #[derive(Debug)]
    struct CountingProvider {
        dimensions: usize,
        returned: usize,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl EmbeddingProvider for CountingProvider {
        fn provider_name(&self) -> &str {
            "counting"
        }

        fn model_name(&self) -> &str {
            "counting-v1"
        }

        fn dimensions(&self) -> usize {
            self.dimensions
        }

        async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(texts.iter().map(|_| vec![1.0; self.returned]).collect())
        }
    }

    fn texts(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("text {}", i)).collect()
    }

    #[tokio::test]
    async fn test_embed_texts_in_batches() {
        let provider = CountingProvider {
            dimensions: 4,
            returned: 4,
            calls: AtomicUsize::new(0),
        };

        let embeddings = embed_texts(&provider, &texts(7), 3).await.unwrap();
        assert_eq!(embeddings.len(), 7);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_wrong_dimensions_is_embedding_error() {
        let provider = CountingProvider {
            dimensions: 4,
            returned: 3,
            calls: AtomicUsize::new(0),
        };

        let result = embed_texts(&provider, &texts(2), 10).await;
        assert!(matches!(result, Err(AppError::Embedding(_))));

        let result = embed_query(&provider, "query").await;
        assert!(matches!(result, Err(AppError::Embedding(_))));
    }

    #[tokio::test]
    async fn test_empty_input() {
        let provider = TrigramProvider::new(16);
        assert!(embed_texts(&provider, &[], 10).await.unwrap().is_empty());
    }
}
