//! Scene and Outline Data Model
//!
//! Typed records for the discovered book → act → scene hierarchy.
//!
//! ## Invariants
//!
//! - A [`SceneRecord`] is immutable once produced; when the underlying file
//!   changes it is superseded by a fresh analysis, never mutated in place.
//! - [`OutlineStructure`] keeps books and acts in ascending numeric order and
//!   scenes in scan order; acts with zero discovered scenes are omitted
//!   entirely rather than kept as empty lists.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Analysis output for a single scene's text.
///
/// Produced by [`crate::analysis::Analyzer::analyze`] and stored verbatim in
/// the analysis cache; equality is byte-exact, which is what makes cached
/// results safe to reuse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneMetrics {
    /// Total word tokens in the scene.
    pub word_count: usize,
    /// Most frequent qualifying terms, most frequent first.
    pub top_words: Vec<String>,
    /// Outstanding TODO notes in document order, marker stripped.
    pub todos: Vec<String>,
}

impl SceneMetrics {
    pub fn empty() -> Self {
        Self {
            word_count: 0,
            top_words: Vec::new(),
            todos: Vec::new(),
        }
    }
}

/// A scene file located by the directory scanner, before analysis.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ScenePath {
    pub book: u32,
    pub act: u32,
    pub scene: u32,
    pub path: PathBuf,
}

/// One manuscript scene with its analysis results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneRecord {
    pub book: u32,
    pub act: u32,
    pub scene: u32,
    pub path: PathBuf,
    pub metrics: SceneMetrics,
}

impl SceneRecord {
    pub fn new(location: ScenePath, metrics: SceneMetrics) -> Self {
        Self {
            book: location.book,
            act: location.act,
            scene: location.scene,
            path: location.path,
            metrics,
        }
    }

    /// File stem used as the scene heading in rendered output.
    pub fn title(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

// =============================================================================
// Outline Structure
// =============================================================================

/// Nested book → act → ordered scenes mapping produced by the builder.
///
/// `BTreeMap` keys give deterministic ascending iteration over book and act
/// numbers; scene vectors keep the scanner's order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutlineStructure {
    books: BTreeMap<u32, BTreeMap<u32, Vec<SceneRecord>>>,
}

impl OutlineStructure {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record under its book/act, creating the levels on demand.
    ///
    /// Callers insert in scan order, which is what keeps scene vectors sorted
    /// without a separate sort pass.
    pub fn push(&mut self, record: SceneRecord) {
        self.books
            .entry(record.book)
            .or_default()
            .entry(record.act)
            .or_default()
            .push(record);
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Books in ascending order with their act maps.
    pub fn books(&self) -> impl Iterator<Item = (u32, &BTreeMap<u32, Vec<SceneRecord>>)> {
        self.books.iter().map(|(num, acts)| (*num, acts))
    }

    /// All scenes in (book, act, scene) order.
    pub fn scenes(&self) -> impl Iterator<Item = &SceneRecord> {
        self.books
            .values()
            .flat_map(|acts| acts.values())
            .flatten()
    }

    pub fn scene_count(&self) -> usize {
        self.scenes().count()
    }

    pub fn total_words(&self) -> usize {
        self.scenes().map(|s| s.metrics.word_count).sum()
    }

    pub fn total_todos(&self) -> usize {
        self.scenes().map(|s| s.metrics.todos.len()).sum()
    }
}
