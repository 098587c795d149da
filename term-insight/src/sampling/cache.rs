//! Time-bounded cache of analysis results.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::analyzers::AnalysisResult;
use crate::core::DataSet;

/// How long a cached analysis stays valid.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
struct CacheEntry {
    result: AnalysisResult,
    timestamp: Instant,
}

/// Analysis results keyed by [`DataSet::fingerprint`].
///
/// The cache is owned by its caller and only grows through [`AnalysisCache::set`];
/// expired entries stay until [`AnalysisCache::remove_expired`] or
/// [`AnalysisCache::clear`] runs. Share it behind a lock if several threads need it.
#[derive(Debug)]
pub struct AnalysisCache {
    entries: HashMap<String, CacheEntry>,
    ttl: Duration,
}

impl AnalysisCache {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_CACHE_TTL)
    }

    /// Creates a cache with a custom time-to-live.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns a live result for the dataset, if any.
    pub fn get(&self, dataset: &DataSet) -> Option<&AnalysisResult> {
        self.get_by_key(&dataset.fingerprint())
    }

    pub fn get_by_key(&self, key: &str) -> Option<&AnalysisResult> {
        self.entries
            .get(key)
            .filter(|entry| entry.timestamp.elapsed() < self.ttl)
            .map(|entry| &entry.result)
    }

    /// Stores a result under the dataset's fingerprint, replacing any previous entry.
    pub fn set(&mut self, dataset: &DataSet, result: AnalysisResult) {
        let key = dataset.fingerprint();
        debug!(dataset = %dataset.name, key = %key, "Caching analysis result");
        self.entries.insert(
            key,
            CacheEntry {
                result,
                timestamp: Instant::now(),
            },
        );
    }

    /// Returns the cached result or computes, stores and returns a new one.
    pub fn get_or_compute<F>(&mut self, dataset: &DataSet, compute: F) -> AnalysisResult
    where
        F: FnOnce(&DataSet) -> AnalysisResult,
    {
        let key = dataset.fingerprint();
        if let Some(hit) = self.get_by_key(&key) {
            debug!(dataset = %dataset.name, "Analysis cache hit");
            return hit.clone();
        }
        let result = compute(dataset);
        self.entries.insert(
            key,
            CacheEntry {
                result: result.clone(),
                timestamp: Instant::now(),
            },
        );
        result
    }

    /// Removes a single dataset's entry.
    pub fn remove(&mut self, dataset: &DataSet) -> Option<AnalysisResult> {
        self.entries
            .remove(&dataset.fingerprint())
            .map(|entry| entry.result)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Drops every entry older than the TTL.
    pub fn remove_expired(&mut self) {
        let now = Instant::now();
        let ttl = self.ttl;
        self.entries
            .retain(|_, entry| now.duration_since(entry.timestamp) < ttl);
    }

    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        let total_entries = self.entries.len();
        let expired_entries = self
            .entries
            .values()
            .filter(|entry| entry.timestamp.elapsed() >= self.ttl)
            .count();

        CacheStats {
            total_entries,
            expired_entries,
            active_entries: total_entries - expired_entries,
        }
    }
}

impl Default for AnalysisCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Entry counts of an [`AnalysisCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub total_entries: usize,
    pub expired_entries: usize,
    pub active_entries: usize,
}
