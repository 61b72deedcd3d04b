//! Knowledge base management.
//!
//! A knowledge base is a flat [`VectorIndex`] persisted as JSON under
//! `.sift/knowledge/<base>/`, filled by [`learn`] and queried by [`search`]
//! and [`ask`].

pub mod chunker;
pub mod config;
pub mod embeddings;
pub mod filter;
pub mod index;
pub mod loader;
pub mod persist;
pub mod rag;
pub mod record;
pub mod shared;
pub mod types;

#[cfg(test)]
mod tests;

pub use filter::{Condition, MetadataFilter};
pub use index::{cosine_similarity, SearchHit, VectorIndex};
pub use loader::{CorpusLoader, FileLoader};
pub use rag::{RagResponse, RagSettings, RagSourceRef};
pub use record::{Metadata, MetadataValue, Record};
pub use shared::SharedIndex;
pub use types::{
    AskOptions, BaseStats, Chunk, Document, KnowledgeBaseConfig, LearnOptions, LearnStats,
    ScoredRecord, SearchOptions,
};

use chrono::Utc;
use embeddings::{create_provider, embed_query, embed_texts};
use sift_core::{AppError, AppResult};
use std::collections::BTreeSet;
use std::path::Path;
use std::time::Instant;

/// Learn from local sources and persist the knowledge base.
///
/// Chunk ids are `<source>#<chunk>`, so learning a source again overwrites
/// its chunks in place.
pub async fn learn(
    workspace: &Path,
    options: &LearnOptions,
    api_key: Option<&str>,
) -> AppResult<LearnStats> {
    let start = Instant::now();

    tracing::info!("Starting learn operation for base '{}'", options.base_name);

    if options.paths.is_empty() {
        return Err(AppError::InvalidArgument(
            "At least one path is required to learn from".to_string(),
        ));
    }

    let mut config = config::load_config(workspace, &options.base_name)?;
    let is_new = !config::get_config_path(workspace, &options.base_name).exists();
    if is_new || options.reset {
        if let Some(embedding) = &options.embedding {
            config.embedding = embedding.clone();
        }
    }

    let embedder = create_provider(&config.embedding, api_key)?;
    let index_path = config::get_index_path(workspace, &options.base_name);

    let mut index = if options.reset || !index_path.exists() {
        if options.reset {
            tracing::info!("Resetting knowledge base '{}'", options.base_name);
        }
        VectorIndex::with_dimensions(embedder.dimensions())
    } else {
        VectorIndex::load(&index_path)?
    };

    if let Some(existing) = index.dimensions() {
        if existing != embedder.dimensions() {
            return Err(AppError::dimension_mismatch(existing, embedder.dimensions()));
        }
    }

    let loader = FileLoader::new(options.include.clone(), options.exclude.clone());
    let mut documents = Vec::new();
    for path in &options.paths {
        documents.extend(loader.load(path)?);
    }

    let bytes_processed: u64 = documents.iter().map(|d| d.text.len() as u64).sum();
    let chunks: Vec<Chunk> = documents
        .iter()
        .flat_map(|doc| chunker::chunk_document(doc, config.chunk_size, config.chunk_overlap))
        .collect();

    let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
    let vectors = embed_texts(embedder.as_ref(), &texts, config.embedding.batch_size).await?;

    for (chunk, embedding) in chunks.iter().zip(vectors) {
        index.insert(Record {
            id: chunk.record_id(),
            text: chunk.text.clone(),
            embedding,
            metadata: chunk.metadata.clone(),
        })?;
    }

    index.save(&index_path)?;
    config::save_config(workspace, &config)?;

    let duration = start.elapsed();
    let stats = LearnStats {
        sources_count: documents.len(),
        chunks_count: chunks.len(),
        records_count: index.len(),
        bytes_processed,
        duration_secs: duration.as_secs_f64(),
        learned_at: Utc::now(),
    };
    config::save_learn_stats(workspace, &options.base_name, &stats)?;

    tracing::info!(
        "Learn operation completed: {} sources, {} chunks, {} bytes in {:.2}s",
        stats.sources_count,
        stats.chunks_count,
        stats.bytes_processed,
        stats.duration_secs
    );

    Ok(stats)
}

/// Load the persisted index of a base.
pub fn open_index(workspace: &Path, base_name: &str) -> AppResult<VectorIndex> {
    let index_path = config::get_index_path(workspace, base_name);
    if !index_path.exists() {
        return Err(AppError::Knowledge(format!(
            "Knowledge base '{}' has no index. Run 'sift learn' first.",
            base_name
        )));
    }
    VectorIndex::load(&index_path)
}

/// Retrieve the records most similar to the query text.
pub async fn search(
    workspace: &Path,
    options: &SearchOptions,
    api_key: Option<&str>,
) -> AppResult<Vec<ScoredRecord>> {
    tracing::info!(
        "Searching knowledge base '{}' for: {}",
        options.base_name,
        options.query
    );

    let config = config::load_config(workspace, &options.base_name)?;
    let index = open_index(workspace, &options.base_name)?;
    let embedder = create_provider(&config.embedding, api_key)?;

    let query_embedding = embed_query(embedder.as_ref(), &options.query).await?;
    let top_k = options.top_k.unwrap_or(config.top_k);

    let results: Vec<ScoredRecord> = index
        .search_filtered(&query_embedding, top_k, &options.filter)?
        .into_iter()
        .map(|hit| ScoredRecord {
            id: hit.record.id.clone(),
            score: hit.score,
            text: hit.record.text.clone(),
            metadata: hit.record.metadata.clone(),
        })
        .collect();

    tracing::info!("Found {} results", results.len());
    Ok(results)
}

/// Answer a question from a knowledge base with a completion model.
///
/// `api_key` is the completion provider's key; the embedding provider
/// resolves its own from the base config.
pub async fn ask(
    workspace: &Path,
    options: AskOptions,
    llm_provider: &str,
    llm_model: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
) -> AppResult<RagResponse> {
    tracing::info!(
        "Querying knowledge base '{}' with query: {}",
        options.base_name,
        options.query
    );

    let config = config::load_config(workspace, &options.base_name)?;
    let index = open_index(workspace, &options.base_name)?;
    let embedder = create_provider(&config.embedding, None)?;
    let llm = sift_llm::create_client(llm_provider, endpoint, api_key, None)?;

    let settings = RagSettings {
        top_k: options.top_k.unwrap_or(config.top_k),
        min_score: options.min_score,
        ..RagSettings::new(llm_model)
    };

    rag::answer(
        &index,
        embedder.as_ref(),
        llm.as_ref(),
        &options.query,
        &options.filter,
        &settings,
    )
    .await
}

/// Empty a knowledge base's index, keeping its config.
///
/// The vector file is overwritten with an empty index without being read
/// first, so a corrupt file can be cleaned too.
pub fn clean(workspace: &Path, base_name: &str) -> AppResult<()> {
    tracing::info!("Cleaning knowledge base '{}'", base_name);

    let index_path = config::get_index_path(workspace, base_name);
    if !index_path.exists() {
        return Err(AppError::Knowledge(format!(
            "Knowledge base '{}' does not exist",
            base_name
        )));
    }

    VectorIndex::new().save(&index_path)?;

    let stats_path = config::get_stats_path(workspace, base_name);
    if stats_path.exists() {
        std::fs::remove_file(&stats_path)?;
    }

    tracing::info!("Knowledge base '{}' cleaned", base_name);
    Ok(())
}

/// Get statistics for a knowledge base.
pub fn stats(workspace: &Path, base_name: &str) -> AppResult<BaseStats> {
    tracing::info!("Getting stats for knowledge base '{}'", base_name);

    let index = open_index(workspace, base_name)?;
    let config = config::load_config(workspace, base_name)?;
    let index_path = config::get_index_path(workspace, base_name);

    let sources: BTreeSet<&str> = index
        .records()
        .filter_map(|r| r.metadata.get("source").and_then(|v| v.as_str()))
        .collect();

    let index_size_bytes = std::fs::metadata(&index_path).map(|m| m.len())?;
    let last_learn_at = config::load_learn_stats(workspace, base_name)?.map(|s| s.learned_at);

    Ok(BaseStats {
        base_name: base_name.to_string(),
        records_count: index.len(),
        sources_count: sources.len(),
        dimensions: index.dimensions(),
        index_size_bytes,
        embedding_provider: config.embedding.provider,
        last_learn_at,
    })
}
