//! Text chunking with configurable size and overlap.

use crate::record::MetadataValue;
use crate::types::{Chunk, Document};
use text_splitter::{ChunkConfig, TextSplitter};

/// Split a document into overlapping chunks.
///
/// Chunks hold at most `chunk_size` characters and break at the largest
/// separator that fits (paragraphs, then sentences, then words) before
/// falling back to characters. Consecutive chunks share up to `overlap`
/// characters; an overlap that is not smaller than the chunk size is
/// ignored. Each chunk carries the document metadata plus `chunk`
/// (position), `start` and `end` (character offsets of the trimmed chunk
/// text in the document).
pub fn chunk_document(document: &Document, chunk_size: usize, overlap: usize) -> Vec<Chunk> {
    let chunk_size = chunk_size.max(1);
    let config = ChunkConfig::new(chunk_size)
        .with_overlap(overlap)
        .unwrap_or_else(|_| ChunkConfig::new(chunk_size));
    let splitter = TextSplitter::new(config);

    let source = document.source().to_string();
    let entry = match document.metadata.get("entry") {
        Some(MetadataValue::Integer(i)) => usize::try_from(*i).ok(),
        _ => None,
    };

    let mut chunks = Vec::new();
    // Chunk starts never move backwards, so char offsets advance with them.
    let mut cursor_byte = 0;
    let mut cursor_char = 0;

    for (byte_offset, text) in splitter.chunk_indices(&document.text) {
        if text.trim().is_empty() {
            continue;
        }

        cursor_char += document.text[cursor_byte..byte_offset].chars().count();
        cursor_byte = byte_offset;

        let start = cursor_char;
        let end = start + text.chars().count();
        let position = chunks.len();

        let mut metadata = document.metadata.clone();
        metadata.insert("chunk".to_string(), MetadataValue::from(position));
        metadata.insert("start".to_string(), MetadataValue::from(start));
        metadata.insert("end".to_string(), MetadataValue::from(end));

        chunks.push(Chunk {
            source: source.clone(),
            entry,
            position,
            text: text.to_string(),
            metadata,
        });
    }

    tracing::debug!(
        "Chunked '{}' into {} chunks (size: {}, overlap: {})",
        source,
        chunks.len(),
        chunk_size,
        overlap
    );

    chunks
}
