//! Knowledge system type definitions.

use crate::embeddings::EmbeddingConfig;
use crate::filter::MetadataFilter;
use crate::record::{Metadata, MetadataValue};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for a knowledge base.
///
/// Stored at `.sift/knowledge/<base>/config.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeBaseConfig {
    /// Name of the knowledge base
    pub name: String,

    /// Chunk size in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Overlap between consecutive chunks, in characters
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Number of records retrieved per query when the caller sets none
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Embedding settings used to build and query this base
    #[serde(default)]
    pub embedding: EmbeddingConfig,
}

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    200
}

fn default_top_k() -> usize {
    4
}

impl KnowledgeBaseConfig {
    /// Default configuration for a named base.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

impl Default for KnowledgeBaseConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            top_k: default_top_k(),
            embedding: EmbeddingConfig::default(),
        }
    }
}

/// A loaded document before chunking.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Text content
    pub text: String,

    /// Scalar metadata; loaders always set `source`
    pub metadata: Metadata,
}

impl Document {
    /// Create a document tagged with its source.
    pub fn new(text: impl Into<String>, source: impl Into<String>) -> Self {
        let mut metadata = Metadata::new();
        metadata.insert("source".to_string(), MetadataValue::String(source.into()));
        Self {
            text: text.into(),
            metadata,
        }
    }

    /// The `source` metadata value, or an empty string.
    pub fn source(&self) -> &str {
        self.metadata
            .get("source")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
    }
}

/// A chunk of a document, ready to embed.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    /// Source the chunk was cut from
    pub source: String,

    /// Entry index for sources holding several documents (JSON arrays)
    pub entry: Option<usize>,

    /// Zero-based position within the document
    pub position: usize,

    /// Chunk text
    pub text: String,

    /// Document metadata plus `chunk`, `start` and `end`
    pub metadata: Metadata,
}

impl Chunk {
    /// Record id for this chunk: `<source>#<position>`, or
    /// `<source>#<entry>:<position>` for an entry of a multi-document source.
    pub fn record_id(&self) -> String {
        match self.entry {
            Some(entry) => format!("{}#{}:{}", self.source, entry, self.position),
            None => format!("{}#{}", self.source, self.position),
        }
    }
}

/// Options for the learn operation.
#[derive(Debug, Clone, Default)]
pub struct LearnOptions {
    /// Knowledge base name
    pub base_name: String,

    /// Local files or directories to learn from
    pub paths: Vec<PathBuf>,

    /// Include patterns (substring match on the path)
    pub include: Vec<String>,

    /// Exclude patterns (substring match on the path)
    pub exclude: Vec<String>,

    /// Reset the base before learning
    pub reset: bool,

    /// Embedding settings for a new (or reset) base; an existing base keeps
    /// the settings in its config
    pub embedding: Option<EmbeddingConfig>,
}

/// Statistics from a learn operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearnStats {
    /// Number of documents processed
    pub sources_count: usize,

    /// Number of chunks embedded
    pub chunks_count: usize,

    /// Records in the index after learning
    pub records_count: usize,

    /// Total bytes of text processed
    pub bytes_processed: u64,

    /// Duration in seconds
    pub duration_secs: f64,

    /// When the learn operation finished
    pub learned_at: DateTime<Utc>,
}

/// Options for the ask operation.
#[derive(Debug, Clone, Default)]
pub struct AskOptions {
    /// Knowledge base name
    pub base_name: String,

    /// Question text
    pub query: String,

    /// Number of records to retrieve (base default when `None`)
    pub top_k: Option<usize>,

    /// Metadata filter applied before scoring
    pub filter: MetadataFilter,

    /// Hits scoring below this are not used as context
    pub min_score: f32,
}

/// Options for the search operation.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Knowledge base name
    pub base_name: String,

    /// Query text
    pub query: String,

    /// Number of records to return (base default when `None`)
    pub top_k: Option<usize>,

    /// Metadata filter applied before scoring
    pub filter: MetadataFilter,
}

/// A search result detached from the index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredRecord {
    pub id: String,
    pub score: f32,
    pub text: String,
    pub metadata: Metadata,
}

/// Statistics for a knowledge base.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseStats {
    /// Base name
    pub base_name: String,

    /// Number of records in the index
    pub records_count: usize,

    /// Number of distinct `source` values
    pub sources_count: usize,

    /// Embedding dimensionality, if any record exists
    pub dimensions: Option<usize>,

    /// Size of the vector file in bytes
    pub index_size_bytes: u64,

    /// Embedding provider recorded in the base config
    pub embedding_provider: String,

    /// Last learn timestamp
    pub last_learn_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults_from_partial_yaml() {
        let config: KnowledgeBaseConfig =
            serde_yaml::from_str("name: docs\nchunk_size: 500\n").unwrap();

        assert_eq!(config.name, "docs");
        assert_eq!(config.chunk_size, 500);
        assert_eq!(config.chunk_overlap, 200);
        assert_eq!(config.top_k, 4);
        assert_eq!(config.embedding.provider, "trigram");
    }

    #[test]
    fn test_chunk_record_id() {
        let chunk = Chunk {
            source: "docs/guide.md".to_string(),
            entry: None,
            position: 3,
            text: "text".to_string(),
            metadata: Metadata::new(),
        };
        assert_eq!(chunk.record_id(), "docs/guide.md#3");

        let entry = Chunk {
            source: "docs/export.json".to_string(),
            entry: Some(7),
            ..chunk
        };
        assert_eq!(entry.record_id(), "docs/export.json#7:3");
    }

    #[test]
    fn test_document_source() {
        let doc = Document::new("hello", "notes.txt");
        assert_eq!(doc.source(), "notes.txt");
    }
}
