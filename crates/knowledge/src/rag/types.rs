//! RAG response types.

use serde::{Deserialize, Serialize};

/// A record used as context for an answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RagSourceRef {
    /// Record id
    pub id: String,

    /// `source` metadata of the record (empty when absent)
    pub source: String,

    /// Cosine similarity to the query
    pub score: f32,

    /// Start of the record text, truncated
    pub snippet: String,
}

/// Answer produced by the RAG pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagResponse {
    /// Text returned by the completion service
    pub answer: String,

    /// Records the answer was grounded on, best first
    pub sources: Vec<RagSourceRef>,

    /// Highest similarity among the sources (0.0 when there are none)
    pub max_score: f32,
}

impl RagResponse {
    pub fn new(answer: String, sources: Vec<RagSourceRef>) -> Self {
        let max_score = sources.first().map(|s| s.score).unwrap_or(0.0);
        Self {
            answer,
            sources,
            max_score,
        }
    }

    /// Response used when no record is relevant enough to answer from.
    pub fn no_information(query: &str) -> Self {
        Self {
            answer: format!(
                "I could not find information about \"{}\" in the available documents.",
                query
            ),
            sources: Vec::new(),
            max_score: 0.0,
        }
    }

    /// Whether the answer came from retrieved context.
    pub fn has_sources(&self) -> bool {
        !self.sources.is_empty()
    }
}

/// Retrieval and generation settings for one answer.
#[derive(Debug, Clone)]
pub struct RagSettings {
    /// Number of records to retrieve
    pub top_k: usize,

    /// Hits scoring below this are discarded
    pub min_score: f32,

    /// Completion model identifier
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,
}

impl RagSettings {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            top_k: 4,
            min_score: 0.0,
            model: model.into(),
            temperature: 0.1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(id: &str, score: f32) -> RagSourceRef {
        RagSourceRef {
            id: id.to_string(),
            source: "test.md".to_string(),
            score,
            snippet: "Test content".to_string(),
        }
    }

    #[test]
    fn test_max_score_from_first_source() {
        let response = RagResponse::new(
            "Test answer".to_string(),
            vec![source("a", 0.85), source("b", 0.4)],
        );

        assert_eq!(response.max_score, 0.85);
        assert!(response.has_sources());
    }

    #[test]
    fn test_no_information_response() {
        let response = RagResponse::no_information("test query");

        assert!(response.answer.contains("test query"));
        assert!(response.answer.contains("could not find"));
        assert!(!response.has_sources());
        assert_eq!(response.max_score, 0.0);
    }

    #[test]
    fn test_response_serialization() {
        let response = RagResponse::new("ok".to_string(), vec![source("a", 0.5)]);
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["answer"], "ok");
        assert_eq!(value["sources"][0]["id"], "a");
        assert_eq!(value["max_score"], 0.5);
    }
}
