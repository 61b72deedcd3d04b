//! RAG answering.
//!
//! Embeds the question, retrieves the best matching records, and asks the
//! completion service to answer from them.

use crate::embeddings::{embed_query, EmbeddingProvider};
use crate::filter::MetadataFilter;
use crate::index::{SearchHit, VectorIndex};
use crate::rag::types::{RagResponse, RagSettings, RagSourceRef};
use sift_core::AppResult;
use sift_llm::{LlmClient, LlmRequest};

/// Maximum snippet length for source references, in characters.
const MAX_SNIPPET_LENGTH: usize = 150;

const ANSWER_INSTRUCTIONS: &str = "You are an assistant for question-answering tasks. \
Use the following pieces of retrieved context to answer the question. \
If you don't know the answer, say that you don't know. \
Use three sentences maximum and keep the answer concise.";

/// Answer `query` from the records of `index`.
///
/// Hits scoring below `settings.min_score` are discarded. When none remain,
/// returns [`RagResponse::no_information`] without calling `llm`.
pub async fn answer(
    index: &VectorIndex,
    embedder: &dyn EmbeddingProvider,
    llm: &dyn LlmClient,
    query: &str,
    filter: &MetadataFilter,
    settings: &RagSettings,
) -> AppResult<RagResponse> {
    let query_embedding = embed_query(embedder, query).await?;

    let hits: Vec<SearchHit<'_>> = index
        .search_filtered(&query_embedding, settings.top_k, filter)?
        .into_iter()
        .filter(|hit| hit.score >= settings.min_score)
        .collect();

    if hits.is_empty() {
        tracing::info!(
            "No relevant records found (min score {:.2})",
            settings.min_score
        );
        return Ok(RagResponse::no_information(query));
    }

    tracing::info!(
        "Answering from {} records (max score: {:.3})",
        hits.len(),
        hits[0].score
    );

    let request = LlmRequest::new(query, settings.model.as_str())
        .with_system(build_system_prompt(&hits))
        .with_temperature(settings.temperature);

    let response = llm.complete(&request).await?;

    Ok(RagResponse::new(response.content, map_hits_to_sources(&hits)))
}

/// Format hits as `Source: ...\nContent: ...` blocks.
pub fn build_context(hits: &[SearchHit<'_>]) -> String {
    hits.iter()
        .map(|hit| format!("Source: {}\nContent: {}", source_of(hit), hit.record.text))
        .collect::<Vec<_>>()
        .join("\n")
}

fn build_system_prompt(hits: &[SearchHit<'_>]) -> String {
    format!("{}\n\n{}", ANSWER_INSTRUCTIONS, build_context(hits))
}

fn source_of<'a>(hit: &SearchHit<'a>) -> &'a str {
    hit.record
        .metadata
        .get("source")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
}

fn map_hits_to_sources(hits: &[SearchHit<'_>]) -> Vec<RagSourceRef> {
    hits.iter()
        .map(|hit| RagSourceRef {
            id: hit.record.id.clone(),
            source: source_of(hit).to_string(),
            score: hit.score,
            snippet: truncate_snippet(&hit.record.text, MAX_SNIPPET_LENGTH),
        })
        .collect()
}

/// Collapse whitespace and cut to `max_chars`, adding "..." when cut.
fn truncate_snippet(text: &str, max_chars: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        return collapsed;
    }

    let cut: String = collapsed.chars().take(max_chars).collect();
    format!("{}...", cut.trim_end())
}
