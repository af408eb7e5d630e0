//! Result cache keyed on grid content and query parameters.
//!
//! Analyses are pure functions of an immutable grid snapshot, so a
//! result can be reused whenever the same query arrives for a grid with
//! the same content. The grid is fingerprinted by its content hash plus
//! dimensions; the parameters by their serialized form. Entries are
//! evicted oldest-inserted first once `capacity` is reached.

use std::sync::Arc;

use cavern_core::LevelGrid;
use indexmap::IndexMap;

use crate::request::AnalysisResult;

/// Fingerprint of a `(grid, query)` pair.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct CacheKey {
    grid: GridFingerprint,
    kind: &'static str,
    params: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct GridFingerprint {
    content_hash: u64,
    width: u32,
    height: u32,
    cell_count: usize,
}

impl CacheKey {
    pub(crate) fn new(grid: &LevelGrid, kind: &'static str, params: String) -> Self {
        Self {
            grid: GridFingerprint {
                content_hash: grid.content_hash(),
                width: grid.width(),
                height: grid.height(),
                cell_count: grid.cells().len(),
            },
            kind,
            params,
        }
    }
}

/// Bounded insertion-ordered result cache.
#[derive(Debug)]
pub(crate) struct ResultCache {
    capacity: usize,
    entries: IndexMap<CacheKey, Arc<AnalysisResult>>,
}

impl ResultCache {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: IndexMap::with_capacity(capacity),
        }
    }

    pub(crate) fn get(&self, key: &CacheKey) -> Option<Arc<AnalysisResult>> {
        self.entries.get(key).cloned()
    }

    pub(crate) fn insert(&mut self, key: CacheKey, value: Arc<AnalysisResult>) {
        if self.capacity == 0 {
            return;
        }
        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            self.entries.shift_remove_index(0);
        }
        self.entries.insert(key, value);
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}
