//! Flat in-memory vector index with exact cosine-similarity search.
//!
//! Records live in a `Vec` in insertion order, with an id → position map for
//! the overwrite-on-duplicate-id policy. A query scores every surviving
//! record (O(n·D)), stable-sorts by descending score and returns the top k.
//! There is no approximate structure; the corpora this serves are small.

use crate::filter::MetadataFilter;
use crate::record::{Metadata, Record};
use sift_core::{AppError, AppResult};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::Path;

/// A search result: the matching record and its cosine similarity.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit<'a> {
    pub record: &'a Record,
    /// Cosine similarity in `[-1.0, 1.0]`
    pub score: f32,
}

impl SearchHit<'_> {
    /// Detach the hit from the index.
    pub fn to_owned_pair(&self) -> (Record, f32) {
        (self.record.clone(), self.score)
    }
}

/// Flat vector index.
///
/// Duplicate ids overwrite the existing record in place: the new record takes
/// the old one's position, so tie-breaking follows the id's first insertion.
#[derive(Debug, Clone, Default)]
pub struct VectorIndex {
    records: Vec<Record>,
    positions: HashMap<String, usize>,
    dimensions: Option<usize>,
}

impl VectorIndex {
    /// Empty index; the first insert establishes the dimensionality.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty index with a fixed dimensionality (typically the embedder's).
    pub fn with_dimensions(dimensions: usize) -> Self {
        Self {
            dimensions: Some(dimensions),
            ..Self::default()
        }
    }

    /// Build an index from a batch of records.
    ///
    /// Fails with `DimensionMismatch` if the records disagree on length.
    pub fn from_records(records: impl IntoIterator<Item = Record>) -> AppResult<Self> {
        let mut index = Self::new();
        for record in records {
            index.insert(record)?;
        }
        Ok(index)
    }

    /// Load an index from a persisted JSON file (see [`crate::persist`]).
    pub fn load(path: &Path) -> AppResult<Self> {
        crate::persist::load_index(path)
    }

    /// Write every record to `path`, replacing the file.
    pub fn save(&self, path: &Path) -> AppResult<()> {
        crate::persist::save_index(self, path)
    }

    /// Insert a record, overwriting any record with the same id.
    pub fn insert(&mut self, record: Record) -> AppResult<()> {
        validate_embedding(&record.embedding)?;

        match self.dimensions {
            Some(expected) if expected != record.embedding.len() => {
                return Err(AppError::dimension_mismatch(expected, record.embedding.len()));
            }
            Some(_) => {}
            None => self.dimensions = Some(record.embedding.len()),
        }

        match self.positions.get(&record.id) {
            Some(&position) => {
                tracing::trace!("Overwriting record '{}' at position {}", record.id, position);
                self.records[position] = record;
            }
            None => {
                self.positions.insert(record.id.clone(), self.records.len());
                self.records.push(record);
            }
        }

        Ok(())
    }

    /// Top-k records by cosine similarity.
    pub fn search(&self, query: &[f32], k: usize) -> AppResult<Vec<SearchHit<'_>>> {
        self.rank(query, k, |_| true)
    }

    /// Top-k records among those matching `filter`.
    pub fn search_filtered(
        &self,
        query: &[f32],
        k: usize,
        filter: &MetadataFilter,
    ) -> AppResult<Vec<SearchHit<'_>>> {
        self.rank(query, k, |metadata| filter.matches(metadata))
    }

    /// Top-k records among those whose metadata satisfies `predicate`.
    pub fn search_where<F>(
        &self,
        query: &[f32],
        k: usize,
        predicate: F,
    ) -> AppResult<Vec<SearchHit<'_>>>
    where
        F: Fn(&Metadata) -> bool,
    {
        self.rank(query, k, predicate)
    }

    fn rank<F>(&self, query: &[f32], k: usize, predicate: F) -> AppResult<Vec<SearchHit<'_>>>
    where
        F: Fn(&Metadata) -> bool,
    {
        if k == 0 {
            return Err(AppError::InvalidArgument(
                "k must be at least 1".to_string(),
            ));
        }

        let Some(expected) = self.dimensions else {
            return Ok(Vec::new());
        };
        if query.len() != expected {
            return Err(AppError::dimension_mismatch(expected, query.len()));
        }
        validate_embedding(query)?;

        let query_norm = norm(query);
        let mut hits: Vec<SearchHit<'_>> = self
            .records
            .iter()
            .filter(|record| predicate(&record.metadata))
            .map(|record| SearchHit {
                record,
                score: cosine_with_norm(query, query_norm, &record.embedding),
            })
            .collect();

        // Stable: equal scores keep insertion order.
        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        hits.truncate(k);

        tracing::debug!(
            "Ranked {} of {} records (requested top-{})",
            hits.len(),
            self.records.len(),
            k
        );

        Ok(hits)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the index holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Established dimensionality, if any.
    pub fn dimensions(&self) -> Option<usize> {
        self.dimensions
    }

    /// Look up a record by id.
    pub fn get(&self, id: &str) -> Option<&Record> {
        self.positions.get(id).map(|&position| &self.records[position])
    }

    /// Records in insertion order.
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    /// Remove every record. The established dimensionality is kept.
    pub fn clear(&mut self) {
        self.records.clear();
        self.positions.clear();
    }
}

fn validate_embedding(embedding: &[f32]) -> AppResult<()> {
    if embedding.is_empty() {
        return Err(AppError::InvalidArgument(
            "embedding must not be empty".to_string(),
        ));
    }
    if let Some(position) = embedding.iter().position(|v| !v.is_finite()) {
        return Err(AppError::InvalidArgument(format!(
            "embedding component {} is not finite",
            position
        )));
    }
    Ok(())
}

// Accumulated in f64: squares of finite f32 components neither overflow
// nor underflow there.
fn norm(v: &[f32]) -> f64 {
    v.iter()
        .map(|&x| f64::from(x) * f64::from(x))
        .sum::<f64>()
        .sqrt()
}

fn cosine_with_norm(a: &[f32], norm_a: f64, b: &[f32]) -> f32 {
    let norm_b = norm(b);
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let dot: f64 = a
        .iter()
        .zip(b)
        .map(|(&x, &y)| f64::from(x) * f64::from(y))
        .sum();
    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0) as f32
}

/// Cosine similarity of two equal-length vectors.
///
/// A zero-norm operand yields `0.0` instead of dividing by zero; the result
/// is clamped to `[-1, 1]` to absorb rounding.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> AppResult<f32> {
    if a.len() != b.len() {
        return Err(AppError::dimension_mismatch(a.len(), b.len()));
    }
    Ok(cosine_with_norm(a, norm(a), b))
}
