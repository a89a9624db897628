//! Configuration Types
//!
//! The full project configuration with defaults matching a fresh `init`.
//! Every field can be overridden from `config.yaml` or `BOOKLOOM_*`
//! environment variables.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::analysis::{Analyzer, DEFAULT_CACHE_SIZE, DEFAULT_MAX_FILE_SIZE, DEFAULT_MIN_TERM_LEN};
use crate::compile::{FormatJob, OutputFormat};
use crate::types::{BookError, Result};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Words excluded from frequency ranking (matched case-insensitively).
    pub stopwords: Vec<String>,

    /// How many frequent terms to report per scene.
    pub top_words_count: usize,

    /// Minimum character length for a ranked term.
    pub min_term_len: usize,

    /// Maximum number of cached scene analyses.
    pub cache_size: usize,

    /// Per-scene size ceiling in bytes; larger files are skipped.
    pub max_file_size: u64,

    /// Scene text encoding. Only UTF-8 is supported.
    pub encoding: String,

    /// Drafts root scanned for Book/Act/Scene files.
    pub drafts_dir: PathBuf,

    /// Where the rendered outline is written.
    pub outline_file: PathBuf,

    /// Where compiled manuscripts land.
    pub compiled_dir: PathBuf,

    /// Persisted analysis cache location.
    pub cache_file: PathBuf,

    /// Scene file extension, without the dot.
    pub scene_extension: String,

    /// Pandoc settings.
    pub compilation: CompilationConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stopwords: DEFAULT_STOPWORDS.iter().map(|w| w.to_string()).collect(),
            top_words_count: 5,
            min_term_len: DEFAULT_MIN_TERM_LEN,
            cache_size: DEFAULT_CACHE_SIZE,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            encoding: "utf-8".to_string(),
            drafts_dir: PathBuf::from("4_Scenes_and_Chapters/Drafts"),
            outline_file: PathBuf::from("3_Plot_and_Outline/outline.md"),
            compiled_dir: PathBuf::from("Compiled"),
            cache_file: PathBuf::from(".bookloom/cache.json"),
            scene_extension: "md".to_string(),
            compilation: CompilationConfig::default(),
        }
    }
}

/// Common English function words; prose-specific by design, not code tokens.
const DEFAULT_STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "from", "had", "has", "have",
    "he", "her", "his", "i", "in", "is", "it", "its", "my", "not", "of", "on", "or", "she", "so",
    "that", "the", "their", "they", "this", "to", "was", "we", "were", "with", "you",
];

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<()> {
        if self.top_words_count == 0 {
            return Err(BookError::Config(
                "top_words_count must be greater than 0".to_string(),
            ));
        }
        if self.min_term_len == 0 {
            return Err(BookError::Config(
                "min_term_len must be greater than 0".to_string(),
            ));
        }
        if self.max_file_size == 0 {
            return Err(BookError::Config(
                "max_file_size must be greater than 0".to_string(),
            ));
        }
        if !matches!(self.encoding.to_lowercase().as_str(), "utf-8" | "utf8") {
            return Err(BookError::Config(format!(
                "unsupported encoding '{}': only utf-8 is supported",
                self.encoding
            )));
        }
        if self.scene_extension.is_empty() || self.scene_extension.starts_with('.') {
            return Err(BookError::Config(format!(
                "scene_extension must be a bare extension like 'md', got '{}'",
                self.scene_extension
            )));
        }
        if self.compilation.timeout_secs == 0 {
            return Err(BookError::Config(
                "compilation.timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Build the analyzer these settings describe.
    pub fn analyzer(&self) -> Analyzer {
        Analyzer::new(
            &self.stopwords,
            self.top_words_count,
            self.min_term_len,
            self.max_file_size,
        )
    }

    /// Conversion jobs to run.
    ///
    /// With `requested` set, those formats run regardless of their `enabled`
    /// flags (still picking up their `extra_args`); otherwise every enabled
    /// format runs.
    pub fn format_jobs(&self, requested: Option<&[OutputFormat]>) -> Vec<FormatJob> {
        OutputFormat::ALL
            .into_iter()
            .filter(|format| match requested {
                Some(list) => list.contains(format),
                None => self.compilation.format(*format).enabled,
            })
            .map(|format| FormatJob {
                format,
                extra_args: self.compilation.format(format).extra_args.clone(),
            })
            .collect()
    }
}

// =============================================================================
// Compilation Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilationConfig {
    /// Wall-clock limit per pandoc run.
    pub timeout_secs: u64,

    /// Retries per format after the first failed attempt.
    pub retries: u32,

    pub formats: FormatsConfig,
}

impl Default for CompilationConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 120,
            retries: 2,
            formats: FormatsConfig::default(),
        }
    }
}

impl CompilationConfig {
    pub fn format(&self, format: OutputFormat) -> &FormatConfig {
        match format {
            OutputFormat::Docx => &self.formats.docx,
            OutputFormat::Epub => &self.formats.epub,
            OutputFormat::Pdf => &self.formats.pdf,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatsConfig {
    pub docx: FormatConfig,
    pub epub: FormatConfig,
    pub pdf: FormatConfig,
}

impl Default for FormatsConfig {
    fn default() -> Self {
        Self {
            docx: FormatConfig {
                enabled: true,
                extra_args: vec![],
            },
            epub: FormatConfig {
                enabled: true,
                extra_args: vec!["--epub-chapter-level=2".to_string()],
            },
            // PDF needs a LaTeX engine installed, so it is opt-in.
            pdf: FormatConfig {
                enabled: false,
                extra_args: vec!["--pdf-engine=xelatex".to_string()],
            },
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    pub enabled: bool,
    pub extra_args: Vec<String>,
}
