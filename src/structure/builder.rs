//! Outline Structure Builder
//!
//! Orchestrates the scanner, the analysis cache, and the analyzer into the
//! nested book → act → scene outline consumed by the renderer and the
//! compiler.
//!
//! ## Failure Semantics
//!
//! A single bad scene (unreadable, undecodable, over-size) is recorded and
//! skipped; the build keeps going and returns the partial outline together
//! with the failure list. Only a missing drafts root (or cancellation)
//! aborts the whole build.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{info, warn};

use crate::analysis::{Analyzer, AnalysisCache, FileSignature};
use crate::structure::scanner::DraftScanner;
use crate::types::{
    BookError, OutlineStructure, Result, SceneFailure, SceneMetrics, SceneRecord,
};

/// Cache behavior for one build.
#[derive(Debug, Clone, Copy)]
pub struct BuildOptions {
    /// Consult the cache before analyzing. When false every scene is
    /// reanalyzed, but results still warm the cache.
    pub use_cache: bool,
    /// Bypass the cache entirely: no lookups, no insertions.
    pub force: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            use_cache: true,
            force: false,
        }
    }
}

/// Per-build counters for the CLI summary and the idempotence tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Scenes discovered by the scanner.
    pub scanned: usize,
    /// Scenes whose content was read and analyzed this build.
    pub analyzed: usize,
    /// Scenes served from the cache without a content read.
    pub cache_hits: usize,
}

/// Result of one build: the (possibly partial) outline plus everything that
/// was skipped and why.
#[derive(Debug)]
pub struct BuildReport {
    pub outline: OutlineStructure,
    pub failures: Vec<SceneFailure>,
    pub stats: BuildStats,
}

pub struct StructureBuilder<'a> {
    scanner: DraftScanner,
    analyzer: &'a Analyzer,
    cancel: Option<Arc<AtomicBool>>,
}

impl<'a> StructureBuilder<'a> {
    pub fn new(scanner: DraftScanner, analyzer: &'a Analyzer) -> Self {
        Self {
            scanner,
            analyzer,
            cancel: None,
        }
    }

    /// Install a cooperative cancellation flag, checked between files.
    ///
    /// A cancelled build returns [`BookError::Cancelled`] without writing a
    /// partial result for the in-flight scene, so the cache stays coherent.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Scan, analyze, and assemble the outline.
    pub fn build(&self, cache: &mut AnalysisCache, options: BuildOptions) -> Result<BuildReport> {
        let outcome = self.scanner.scan()?;

        let mut outline = OutlineStructure::new();
        let mut failures = outcome.failures;
        let mut stats = BuildStats {
            scanned: outcome.scenes.len(),
            ..Default::default()
        };

        for location in outcome.scenes {
            if self.cancelled() {
                return Err(BookError::Cancelled);
            }

            match self.analyze_scene(cache, &location.path, options) {
                Ok(SceneOutcome { metrics, from_cache }) => {
                    if from_cache {
                        stats.cache_hits += 1;
                    } else {
                        stats.analyzed += 1;
                    }
                    outline.push(SceneRecord::new(location, metrics));
                }
                Err(err) if err.is_scene_scoped() => {
                    warn!(path = %location.path.display(), error = %err, "scene skipped");
                    failures.push(SceneFailure::from_error(&location.path, &err));
                }
                Err(err) => return Err(err),
            }
        }

        info!(
            scenes = outline.scene_count(),
            analyzed = stats.analyzed,
            cache_hits = stats.cache_hits,
            failures = failures.len(),
            "structure build complete"
        );

        Ok(BuildReport {
            outline,
            failures,
            stats,
        })
    }

    fn analyze_scene(
        &self,
        cache: &mut AnalysisCache,
        path: &Path,
        options: BuildOptions,
    ) -> Result<SceneOutcome> {
        let signature = FileSignature::from_path(path)?;

        // Cheap pre-check from metadata so over-size files are rejected
        // without reading their content.
        if signature.len > self.analyzer.max_file_size() {
            return Err(BookError::FileTooLarge {
                path: path.to_path_buf(),
                size: signature.len,
                limit: self.analyzer.max_file_size(),
            });
        }

        let compute = || {
            let bytes = fs::read(path).map_err(|e| BookError::file_read(path, e.to_string()))?;
            let text = String::from_utf8(bytes)
                .map_err(|_| BookError::file_read(path, "invalid UTF-8"))?;
            self.analyzer.analyze(path, &text)
        };

        if options.force {
            return Ok(SceneOutcome {
                metrics: compute()?,
                from_cache: false,
            });
        }

        let hits_before = cache.stats().hits;
        let metrics = cache.get_or_compute(path, signature, options.use_cache, compute)?;
        Ok(SceneOutcome {
            metrics,
            from_cache: cache.stats().hits > hits_before,
        })
    }
}

struct SceneOutcome {
    metrics: SceneMetrics,
    from_cache: bool,
}
