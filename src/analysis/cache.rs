//! Analysis Cache
//!
//! Bounded LRU store mapping scene paths to their last analysis, validated
//! by [`FileSignature`] so a stale result is never served after the file
//! changes on disk.
//!
//! ## Lifecycle
//!
//! - Inserted when a scene is analyzed; recency refreshed on every hit.
//! - Replaced (never served) when the caller's current signature differs
//!   from the stored one.
//! - Evicted synchronously on insert when the entry count exceeds capacity;
//!   the least-recently-used entry goes first.
//!
//! The cache can persist to a JSON file between runs. The file records a
//! fingerprint of the analyzer options; a mismatch on load discards the
//! persisted state, since cached metrics are only valid for the options
//! that produced them.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::analysis::signature::FileSignature;
use crate::types::{Result, SceneMetrics};

/// Bump when the persisted layout changes; older files are discarded.
const CACHE_FORMAT_VERSION: u32 = 1;

/// Default maximum number of cached analyses.
pub const DEFAULT_CACHE_SIZE: usize = 1000;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    signature: FileSignature,
    metrics: SceneMetrics,
    /// Logical access time; larger means more recently used.
    stamp: u64,
}

/// Hit/miss/eviction counters for build summaries and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

/// Capacity-bounded LRU cache of scene analyses.
pub struct AnalysisCache {
    capacity: usize,
    entries: HashMap<PathBuf, CacheEntry>,
    /// Monotonic logical clock backing LRU recency.
    clock: u64,
    stats: CacheStats,
}

impl AnalysisCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::new(),
            clock: 0,
            stats: CacheStats::default(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Return the cached metrics for `path` if still valid, otherwise run
    /// `compute` and store its result under the fresh signature.
    ///
    /// `use_cache = false` skips the lookup but still stores the result,
    /// warming the cache for the next invocation. A stored entry whose
    /// signature differs from `signature` is treated as a miss and replaced.
    pub fn get_or_compute<F>(
        &mut self,
        path: &Path,
        signature: FileSignature,
        use_cache: bool,
        compute: F,
    ) -> Result<SceneMetrics>
    where
        F: FnOnce() -> Result<SceneMetrics>,
    {
        if use_cache
            && let Some(entry) = self.entries.get_mut(path)
            && entry.signature == signature
        {
            self.clock += 1;
            entry.stamp = self.clock;
            self.stats.hits += 1;
            debug!(path = %path.display(), "cache hit");
            return Ok(entry.metrics.clone());
        }

        self.stats.misses += 1;
        let metrics = compute()?;
        self.insert(path.to_path_buf(), signature, metrics.clone());
        Ok(metrics)
    }

    fn insert(&mut self, path: PathBuf, signature: FileSignature, metrics: SceneMetrics) {
        if self.capacity == 0 {
            return;
        }

        self.clock += 1;
        self.entries.insert(
            path,
            CacheEntry {
                signature,
                metrics,
                stamp: self.clock,
            },
        );

        while self.entries.len() > self.capacity {
            self.evict_lru();
        }
    }

    fn evict_lru(&mut self) {
        let victim = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.stamp)
            .map(|(path, _)| path.clone());

        if let Some(path) = victim {
            debug!(path = %path.display(), "evicting least-recently-used entry");
            self.entries.remove(&path);
            self.stats.evictions += 1;
        }
    }

    /// Drop the entry for `path`, if any. Returns whether one existed.
    pub fn invalidate(&mut self, path: &Path) -> bool {
        self.entries.remove(path).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Load a cache from `file`, or start empty when the file is absent,
    /// corrupt, or was written with different analyzer options.
    ///
    /// Corruption is deliberately non-fatal: the cache is an optimization
    /// and a fresh build repopulates it.
    pub fn load(file: &Path, capacity: usize, fingerprint: &str) -> Self {
        let content = match fs::read_to_string(file) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Self::new(capacity);
            }
            Err(e) => {
                warn!(file = %file.display(), error = %e, "cache unreadable, starting empty");
                return Self::new(capacity);
            }
        };

        let persisted: PersistedCache = match serde_json::from_str(&content) {
            Ok(persisted) => persisted,
            Err(e) => {
                warn!(file = %file.display(), error = %e, "cache corrupt, starting empty");
                return Self::new(capacity);
            }
        };

        if persisted.version != CACHE_FORMAT_VERSION {
            info!(file = %file.display(), "cache format changed, starting empty");
            return Self::new(capacity);
        }
        if persisted.fingerprint != fingerprint {
            info!(file = %file.display(), "analyzer options changed, starting empty");
            return Self::new(capacity);
        }

        let mut cache = Self::new(capacity);
        // Oldest first so capacity trimming keeps the most recent entries.
        let mut records = persisted.entries;
        records.sort_by_key(|r| r.stamp);
        for record in records {
            cache.insert(record.path, record.signature, record.metrics);
        }
        info!(file = %file.display(), entries = cache.len(), "cache loaded");
        cache
    }

    /// Persist every entry to `file` as versioned JSON, exact round-trip.
    pub fn save(&self, file: &Path, fingerprint: &str) -> Result<()> {
        if let Some(parent) = file.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let mut records: Vec<PersistedRecord> = self
            .entries
            .iter()
            .map(|(path, entry)| PersistedRecord {
                path: path.clone(),
                signature: entry.signature,
                metrics: entry.metrics.clone(),
                stamp: entry.stamp,
            })
            .collect();
        records.sort_by_key(|r| r.stamp);

        let persisted = PersistedCache {
            version: CACHE_FORMAT_VERSION,
            fingerprint: fingerprint.to_string(),
            entries: records,
        };

        fs::write(file, serde_json::to_string_pretty(&persisted)?)?;
        debug!(file = %file.display(), entries = self.len(), "cache saved");
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
struct PersistedCache {
    version: u32,
    fingerprint: String,
    entries: Vec<PersistedRecord>,
}

#[derive(Serialize, Deserialize)]
struct PersistedRecord {
    path: PathBuf,
    signature: FileSignature,
    metrics: SceneMetrics,
    stamp: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn sig(len: u64) -> FileSignature {
        FileSignature::new(len, Utc.timestamp_opt(1_700_000_000, 0).unwrap())
    }

    fn metrics(words: usize) -> SceneMetrics {
        SceneMetrics {
            word_count: words,
            top_words: vec!["storm".to_string()],
            todos: vec![],
        }
    }

    #[test]
    fn test_hit_skips_recompute() {
        let mut cache = AnalysisCache::new(10);
        let path = Path::new("Book1/Act1/Scene01.md");
        let mut computes = 0;

        for _ in 0..3 {
            let result = cache
                .get_or_compute(path, sig(5), true, || {
                    computes += 1;
                    Ok(metrics(5))
                })
                .unwrap();
            assert_eq!(result.word_count, 5);
        }

        assert_eq!(computes, 1);
        assert_eq!(cache.stats().hits, 2);
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_signature_change_forces_recompute() {
        let mut cache = AnalysisCache::new(10);
        let path = Path::new("scene.md");

        cache
            .get_or_compute(path, sig(5), true, || Ok(metrics(5)))
            .unwrap();
        let result = cache
            .get_or_compute(path, sig(9), true, || Ok(metrics(9)))
            .unwrap();

        assert_eq!(result.word_count, 9);
        assert_eq!(cache.stats().misses, 2);
        assert_eq!(cache.len(), 1); // replaced, not duplicated

        // The replacement is now what a hit returns.
        let again = cache
            .get_or_compute(path, sig(9), true, || unreachable!())
            .unwrap();
        assert_eq!(again.word_count, 9);
    }

    #[test]
    fn test_use_cache_false_recomputes_but_warms() {
        let mut cache = AnalysisCache::new(10);
        let path = Path::new("scene.md");

        cache
            .get_or_compute(path, sig(5), false, || Ok(metrics(1)))
            .unwrap();
        cache
            .get_or_compute(path, sig(5), false, || Ok(metrics(2)))
            .unwrap();
        assert_eq!(cache.stats().misses, 2);

        // Warm entry serves the next cached call without recompute.
        let result = cache
            .get_or_compute(path, sig(5), true, || unreachable!())
            .unwrap();
        assert_eq!(result.word_count, 2);
    }

    #[test]
    fn test_eviction_removes_exactly_the_lru_entry() {
        let mut cache = AnalysisCache::new(3);

        for i in 0..3u64 {
            let path = PathBuf::from(format!("scene{i}.md"));
            cache
                .get_or_compute(&path, sig(i), true, || Ok(metrics(i as usize)))
                .unwrap();
        }

        // Touch scene0 so scene1 becomes the LRU.
        cache
            .get_or_compute(Path::new("scene0.md"), sig(0), true, || unreachable!())
            .unwrap();

        cache
            .get_or_compute(Path::new("scene3.md"), sig(3), true, || Ok(metrics(3)))
            .unwrap();

        assert_eq!(cache.stats().evictions, 1);
        assert_eq!(cache.len(), 3);
        assert!(cache.invalidate(Path::new("scene0.md")));
        assert!(!cache.invalidate(Path::new("scene1.md"))); // evicted
        assert!(cache.invalidate(Path::new("scene3.md")));
    }

    #[test]
    fn test_zero_capacity_stores_nothing() {
        let mut cache = AnalysisCache::new(0);
        cache
            .get_or_compute(Path::new("scene.md"), sig(1), true, || Ok(metrics(1)))
            .unwrap();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_compute_failure_is_not_cached() {
        let mut cache = AnalysisCache::new(10);
        let path = Path::new("scene.md");

        let err = cache.get_or_compute(path, sig(1), true, || {
            Err(crate::types::BookError::file_read(path, "denied"))
        });
        assert!(err.is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clear_and_invalidate() {
        let mut cache = AnalysisCache::new(10);
        cache
            .get_or_compute(Path::new("a.md"), sig(1), true, || Ok(metrics(1)))
            .unwrap();
        cache
            .get_or_compute(Path::new("b.md"), sig(2), true, || Ok(metrics(2)))
            .unwrap();

        assert!(cache.invalidate(Path::new("a.md")));
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_persistence_round_trip() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("cache.json");

        let mut cache = AnalysisCache::new(10);
        cache
            .get_or_compute(Path::new("a.md"), sig(1), true, || Ok(metrics(11)))
            .unwrap();
        cache
            .get_or_compute(Path::new("b.md"), sig(2), true, || Ok(metrics(22)))
            .unwrap();
        cache.save(&file, "fp-1").unwrap();

        let mut loaded = AnalysisCache::load(&file, 10, "fp-1");
        assert_eq!(loaded.len(), 2);

        // Loaded entries serve hits without recompute.
        let result = loaded
            .get_or_compute(Path::new("a.md"), sig(1), true, || unreachable!())
            .unwrap();
        assert_eq!(result, metrics(11));
    }

    #[test]
    fn test_fingerprint_mismatch_discards_persisted_state() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("cache.json");

        let mut cache = AnalysisCache::new(10);
        cache
            .get_or_compute(Path::new("a.md"), sig(1), true, || Ok(metrics(1)))
            .unwrap();
        cache.save(&file, "old-options").unwrap();

        let loaded = AnalysisCache::load(&file, 10, "new-options");
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_missing_or_corrupt_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let missing = AnalysisCache::load(&dir.path().join("absent.json"), 10, "fp");
        assert!(missing.is_empty());

        let file = dir.path().join("garbage.json");
        fs::write(&file, "not json {").unwrap();
        let corrupt = AnalysisCache::load(&file, 10, "fp");
        assert!(corrupt.is_empty());
    }

    #[test]
    fn test_load_trims_to_capacity_keeping_most_recent() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("cache.json");

        let mut cache = AnalysisCache::new(10);
        for i in 0..5u64 {
            let path = PathBuf::from(format!("scene{i}.md"));
            cache
                .get_or_compute(&path, sig(i), true, || Ok(metrics(i as usize)))
                .unwrap();
        }
        cache.save(&file, "fp").unwrap();

        let mut loaded = AnalysisCache::load(&file, 2, "fp");
        assert_eq!(loaded.len(), 2);
        assert!(loaded.invalidate(Path::new("scene3.md")));
        assert!(loaded.invalidate(Path::new("scene4.md")));
    }
}
