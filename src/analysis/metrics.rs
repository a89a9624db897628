//! Scene Text Analysis
//!
//! Pure text metrics for a single scene: word count, stopword-filtered term
//! frequency, and outstanding TODO notes. No I/O, no shared state; identical
//! input and options always produce byte-identical output.
//!
//! ## Ranking Rules
//!
//! Terms are lowercased word tokens, minus stopwords (matched
//! case-insensitively) and tokens shorter than the configured minimum length.
//! Lines that are TODO annotations are excluded from the frequency pass;
//! they are authoring notes, not prose, and would otherwise dominate short
//! scenes. Ranking is by descending count, ties broken by first appearance
//! in the text.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use regex::Regex;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::types::{BookError, Result, SceneMetrics};

/// Default minimum term length for the frequency ranking.
///
/// Length 2 keeps short content words ("go", "ox") while dropping
/// single-letter noise.
pub const DEFAULT_MIN_TERM_LEN: usize = 2;

/// Default size ceiling for analyzed scenes (10 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Configured scene analyzer.
///
/// Construction compiles the token patterns and lowercases the stopword set
/// once; [`Analyzer::analyze`] is then allocation-light and reusable across
/// every scene in a build.
pub struct Analyzer {
    stopwords: HashSet<String>,
    top_words: usize,
    min_term_len: usize,
    max_file_size: u64,
    word_re: Regex,
    todo_re: Regex,
}

impl Analyzer {
    pub fn new(
        stopwords: &[String],
        top_words: usize,
        min_term_len: usize,
        max_file_size: u64,
    ) -> Self {
        let stopwords = stopwords.iter().map(|w| w.to_lowercase()).collect();

        Self {
            stopwords,
            top_words,
            min_term_len,
            max_file_size,
            // Same word boundary rule as splitting on whitespace/punctuation.
            word_re: Regex::new(r"\w+").expect("static word pattern"),
            todo_re: Regex::new(r"(?i)\btodo\b[:\-\s]*(.+)").expect("static todo pattern"),
        }
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// Fingerprint of the options that shape analysis output.
    ///
    /// Cached metrics are only valid for the options that produced them, so
    /// the persisted cache stores this value and discards itself on mismatch.
    /// `max_file_size` is deliberately excluded: it gates which files get
    /// analyzed, not what the analysis of an accepted file contains.
    pub fn fingerprint(&self) -> String {
        let mut sorted: Vec<&str> = self.stopwords.iter().map(String::as_str).collect();
        sorted.sort_unstable();

        let mut hasher = Sha256::new();
        hasher.update(self.top_words.to_le_bytes());
        hasher.update(self.min_term_len.to_le_bytes());
        for word in sorted {
            hasher.update(word.as_bytes());
            hasher.update([0]);
        }
        format!("{:x}", hasher.finalize())
    }

    /// Analyze scene text. `path` is error context only.
    ///
    /// Rejects input larger than the configured ceiling before tokenization;
    /// empty input yields zeroed metrics, never an error.
    pub fn analyze(&self, path: &Path, text: &str) -> Result<SceneMetrics> {
        let size = text.len() as u64;
        if size > self.max_file_size {
            return Err(BookError::FileTooLarge {
                path: path.to_path_buf(),
                size,
                limit: self.max_file_size,
            });
        }

        let word_count = self.word_re.find_iter(text).count();
        let todos = self.extract_todos(text);
        let top_words = self.top_terms(text);

        debug!(
            path = %path.display(),
            word_count,
            todos = todos.len(),
            "scene analyzed"
        );

        Ok(SceneMetrics {
            word_count,
            top_words,
            todos,
        })
    }

    /// TODO notes in document order, marker and surrounding whitespace
    /// stripped. Lines whose note text is empty are skipped.
    fn extract_todos(&self, text: &str) -> Vec<String> {
        text.lines()
            .filter_map(|line| self.todo_re.captures(line))
            .filter_map(|caps| {
                let task = caps[1].trim();
                (!task.is_empty()).then(|| task.to_string())
            })
            .collect()
    }

    /// Top-N frequent terms with deterministic first-appearance tie-breaking.
    fn top_terms(&self, text: &str) -> Vec<String> {
        // (term, count) in first-appearance order; the map only indexes into it.
        let mut terms: Vec<(String, usize)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for line in text.lines() {
            if self.todo_re.is_match(line) {
                continue;
            }
            for token in self.word_re.find_iter(line) {
                let term = token.as_str().to_lowercase();
                if term.chars().count() < self.min_term_len || self.stopwords.contains(&term) {
                    continue;
                }
                match index.get(&term) {
                    Some(&i) => terms[i].1 += 1,
                    None => {
                        index.insert(term.clone(), terms.len());
                        terms.push((term, 1));
                    }
                }
            }
        }

        // Stable sort preserves first-appearance order among equal counts.
        terms.sort_by(|a, b| b.1.cmp(&a.1));
        terms
            .into_iter()
            .take(self.top_words)
            .map(|(term, _)| term)
            .collect()
    }
}
