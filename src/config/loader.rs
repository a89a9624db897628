//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Project config file (config.yaml)
//! 3. Environment variables (BOOKLOOM_* prefix)

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Yaml},
};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::Config;
use crate::types::{BookError, Result};

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with the full resolution chain:
    /// defaults → config file → env vars.
    ///
    /// A missing config file is fine (defaults plus env apply); a present but
    /// malformed one is a [`BookError::Config`].
    pub fn load(path: &Path) -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if path.exists() {
            debug!("Loading config from: {}", path.display());
            figment = figment.merge(Yaml::file(path));
        } else {
            debug!("No config file at {}, using defaults", path.display());
        }

        // Nested keys use a double underscore:
        // BOOKLOOM_COMPILATION__TIMEOUT_SECS -> compilation.timeout_secs
        figment = figment.merge(Env::prefixed("BOOKLOOM_").split("__").lowercase(true));

        let config: Config = figment
            .extract()
            .map_err(|e| BookError::Config(format!("Configuration error: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Initialize a project skeleton under `root`.
    ///
    /// Creates the standard directory layout and a commented `config.yaml`.
    /// An existing config file is left alone unless `force` is set.
    pub fn init_project(root: &Path, force: bool) -> Result<PathBuf> {
        let defaults = Config::default();

        fs::create_dir_all(root.join(&defaults.drafts_dir).join("Book1/Act1"))?;
        if let Some(outline_dir) = defaults.outline_file.parent() {
            fs::create_dir_all(root.join(outline_dir))?;
        }
        fs::create_dir_all(root.join(&defaults.compiled_dir))?;
        if let Some(cache_dir) = defaults.cache_file.parent() {
            fs::create_dir_all(root.join(cache_dir))?;
        }

        let config_path = root.join("config.yaml");
        if !config_path.exists() || force {
            fs::write(&config_path, Self::default_config_yaml())?;
            info!("Created config: {}", config_path.display());
        } else {
            info!("Config exists: {}", config_path.display());
        }

        Ok(config_path)
    }

    /// Default `config.yaml` content, with every setting spelled out.
    fn default_config_yaml() -> String {
        r#"# Bookloom project configuration.
# Every value here matches the built-in default; delete any line to keep it.
# Environment variables override this file: BOOKLOOM_TOP_WORDS_COUNT=10,
# BOOKLOOM_COMPILATION__TIMEOUT_SECS=60, and so on.

# Words excluded from per-scene frequency ranking (case-insensitive).
stopwords:
  ["a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "from",
   "had", "has", "have", "he", "her", "his", "i", "in", "is", "it", "its",
   "my", "not", "of", "on", "or", "she", "so", "that", "the", "their",
   "they", "this", "to", "was", "we", "were", "with", "you"]

# Frequent terms reported per scene.
top_words_count: 5

# Shortest term (in characters) that can appear in the ranking.
min_term_len: 2

# Scene analyses kept in the cache.
cache_size: 1000

# Scenes larger than this many bytes are skipped (10 MiB).
max_file_size: 10485760

# Scene text encoding. Only utf-8 is supported.
encoding: utf-8

# Project layout.
drafts_dir: 4_Scenes_and_Chapters/Drafts
outline_file: 3_Plot_and_Outline/outline.md
compiled_dir: Compiled
cache_file: .bookloom/cache.json
scene_extension: md

compilation:
  timeout_secs: 120
  retries: 2
  formats:
    docx:
      enabled: true
      extra_args: []
    epub:
      enabled: true
      extra_args: ["--epub-chapter-level=2"]
    pdf:
      # Requires a LaTeX engine on PATH.
      enabled: false
      extra_args: ["--pdf-engine=xelatex"]
"#
        .to_string()
    }
}
