//! JSON persistence for vector indexes.
//!
//! File format: a JSON array of entries
//!
//! ```json
//! [
//!   { "id": "guide.md#0", "text": "...", "embedding": [0.1, 0.2], "metadata": { "section": "intro" } }
//! ]
//! ```
//!
//! `text` and `embedding` are required. `metadata` defaults to empty and must
//! be flat (scalar values only). A missing `id` is derived from the entry's
//! zero-based position as `#<position>`; derived ids only hold for one load
//! and follow the usual overwrite-on-duplicate policy.

use crate::index::VectorIndex;
use crate::record::{metadata_from_json, Metadata, Record};
use serde::{Deserialize, Serialize};
use sift_core::{AppError, AppResult};
use std::fs;
use std::path::Path;

/// An entry as read from disk, before validation.
#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(default)]
    id: Option<String>,
    text: Option<String>,
    embedding: Option<Vec<f32>>,
    #[serde(default)]
    metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

/// An entry as written to disk.
#[derive(Debug, Serialize)]
struct StoredEntry<'a> {
    id: &'a str,
    text: &'a str,
    embedding: &'a [f32],
    metadata: &'a Metadata,
}

/// Id assigned to an entry that has none.
pub fn derived_id(position: usize) -> String {
    format!("#{}", position)
}

/// Read and validate a persisted index.
///
/// Any problem aborts the load with `AppError::Load`; no partial index is
/// returned.
pub fn load_index(path: &Path) -> AppResult<VectorIndex> {
    let content = fs::read_to_string(path)
        .map_err(|e| AppError::Load(format!("Failed to read {:?}: {}", path, e)))?;

    let index = parse_index(&content)
        .map_err(|e| AppError::Load(format!("{:?}: {}", path, e)))?;

    tracing::debug!(
        "Loaded {} records ({:?} dimensions) from {:?}",
        index.len(),
        index.dimensions(),
        path
    );

    Ok(index)
}

/// Parse the JSON text of a persisted index.
///
/// Errors carry a plain description; [`load_index`] wraps them with the path.
pub fn parse_index(content: &str) -> Result<VectorIndex, String> {
    let entries: Vec<RawEntry> =
        serde_json::from_str(content).map_err(|e| format!("malformed JSON: {}", e))?;

    let mut index = VectorIndex::new();
    for (position, entry) in entries.into_iter().enumerate() {
        let record = into_record(position, entry)?;
        index
            .insert(record)
            .map_err(|e| format!("entry {}: {}", position, e))?;
    }

    Ok(index)
}

fn into_record(position: usize, entry: RawEntry) -> Result<Record, String> {
    let text = entry
        .text
        .ok_or_else(|| format!("entry {}: missing required field 'text'", position))?;
    let embedding = entry
        .embedding
        .ok_or_else(|| format!("entry {}: missing required field 'embedding'", position))?;
    let metadata = match entry.metadata {
        Some(object) => {
            metadata_from_json(object).map_err(|e| format!("entry {}: {}", position, e))?
        }
        None => Metadata::new(),
    };

    Ok(Record {
        id: entry.id.unwrap_or_else(|| derived_id(position)),
        text,
        embedding,
        metadata,
    })
}

/// Write every record of `index` to `path`, replacing the file.
pub fn save_index(index: &VectorIndex, path: &Path) -> AppResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let entries: Vec<StoredEntry<'_>> = index
        .records()
        .map(|record| StoredEntry {
            id: &record.id,
            text: &record.text,
            embedding: &record.embedding,
            metadata: &record.metadata,
        })
        .collect();

    let json = serde_json::to_string_pretty(&entries)?;
    fs::write(path, json)?;

    tracing::debug!("Saved {} records to {:?}", entries.len(), path);
    Ok(())
}
