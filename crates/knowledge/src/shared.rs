//! A vector index shared between threads.

use crate::filter::MetadataFilter;
use crate::index::VectorIndex;
use crate::record::Record;
use sift_core::{AppError, AppResult};
use std::path::Path;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Cloneable handle to a [`VectorIndex`] behind a read/write lock.
///
/// Inserts take the write lock; searches and `save` share the read lock.
/// Search results are returned as owned `(Record, score)` pairs because
/// the lock is released before the call returns.
#[derive(Debug, Clone, Default)]
pub struct SharedIndex {
    inner: Arc<RwLock<VectorIndex>>,
}

impl SharedIndex {
    pub fn new(index: VectorIndex) -> Self {
        Self {
            inner: Arc::new(RwLock::new(index)),
        }
    }

    fn read(&self) -> AppResult<RwLockReadGuard<'_, VectorIndex>> {
        self.inner
            .read()
            .map_err(|_| AppError::Other("Vector index lock poisoned".to_string()))
    }

    fn write(&self) -> AppResult<RwLockWriteGuard<'_, VectorIndex>> {
        self.inner
            .write()
            .map_err(|_| AppError::Other("Vector index lock poisoned".to_string()))
    }

    pub fn insert(&self, record: Record) -> AppResult<()> {
        self.write()?.insert(record)
    }

    pub fn search(&self, query: &[f32], k: usize) -> AppResult<Vec<(Record, f32)>> {
        let index = self.read()?;
        let hits = index.search(query, k)?;
        Ok(hits.iter().map(|hit| hit.to_owned_pair()).collect())
    }

    pub fn search_filtered(
        &self,
        query: &[f32],
        k: usize,
        filter: &MetadataFilter,
    ) -> AppResult<Vec<(Record, f32)>> {
        let index = self.read()?;
        let hits = index.search_filtered(query, k, filter)?;
        Ok(hits.iter().map(|hit| hit.to_owned_pair()).collect())
    }

    pub fn len(&self) -> AppResult<usize> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> AppResult<bool> {
        Ok(self.read()?.is_empty())
    }

    pub fn dimensions(&self) -> AppResult<Option<usize>> {
        Ok(self.read()?.dimensions())
    }

    pub fn save(&self, path: &Path) -> AppResult<()> {
        self.read()?.save(path)
    }

    /// Take the index back out, if this is the last handle.
    pub fn into_inner(self) -> AppResult<VectorIndex> {
        Arc::try_unwrap(self.inner)
            .map_err(|_| AppError::Other("Vector index is still shared".to_string()))?
            .into_inner()
            .map_err(|_| AppError::Other("Vector index lock poisoned".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_search_through_handle() {
        let shared = SharedIndex::new(VectorIndex::new());
        shared.insert(Record::new("a", "alpha", vec![1.0, 0.0])).unwrap();
        shared.insert(Record::new("b", "beta", vec![0.0, 1.0])).unwrap();

        let hits = shared.search(&[1.0, 0.0], 1).unwrap();
        assert_eq!(hits[0].0.id, "a");
        assert_eq!(shared.len().unwrap(), 2);
        assert_eq!(shared.dimensions().unwrap(), Some(2));
    }

    #[test]
    fn test_into_inner_requires_last_handle() {
        let shared = SharedIndex::default();
        let other = shared.clone();
        assert!(shared.into_inner().is_err());
        assert!(other.into_inner().unwrap().is_empty());
    }

    #[test]
    fn test_poisoned_lock_is_reported() {
        let shared = SharedIndex::default();
        let clone = shared.clone();

        let _ = std::thread::spawn(move || {
            let _guard = clone.inner.write().unwrap();
            panic!("poison the lock");
        })
        .join();

        assert!(matches!(shared.len(), Err(AppError::Other(_))));
    }
}
