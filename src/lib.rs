//! Bookloom - Book Project Manager for Scene-Based Manuscripts
//!
//! Scans a drafts directory laid out as `BookN/ActM/Scene*.md`, analyzes each
//! scene's text, and produces a Markdown outline and compiled manuscripts.
//!
//! ## Core Features
//!
//! - **Structure Discovery**: Book/Act/Scene hierarchy from naming conventions
//! - **Scene Analysis**: word counts, frequent terms, outstanding TODO notes
//! - **Incremental Builds**: persistent LRU cache keyed on file metadata, so
//!   unchanged scenes are never re-read
//! - **Compilation**: pandoc-driven docx/epub/pdf output
//!
//! ## Quick Start
//!
//! ```ignore
//! use bookloom::analysis::AnalysisCache;
//! use bookloom::config::ConfigLoader;
//! use bookloom::structure::{BuildOptions, DraftScanner, StructureBuilder};
//!
//! let config = ConfigLoader::load(Path::new("config.yaml"))?;
//! let analyzer = config.analyzer();
//! let mut cache = AnalysisCache::load(&config.cache_file, config.cache_size, &analyzer.fingerprint());
//!
//! let scanner = DraftScanner::with_extension(&config.drafts_dir, &config.scene_extension);
//! let report = StructureBuilder::new(scanner, &analyzer)
//!     .build(&mut cache, BuildOptions::default())?;
//! bookloom::outline::save(&report, &config.outline_file)?;
//! ```
//!
//! ## Modules
//!
//! - [`structure`]: directory scanning and outline assembly
//! - [`analysis`]: text metrics, file signatures, the LRU cache
//! - [`outline`]: Markdown outline rendering
//! - [`compile`]: manuscript assembly and pandoc invocation
//! - [`config`]: layered defaults / file / environment configuration

pub mod analysis;
pub mod cli;
pub mod compile;
pub mod config;
pub mod outline;
pub mod structure;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader};

// Error Types
pub use types::{BookError, Result};

// Pipeline
pub use analysis::{AnalysisCache, Analyzer, FileSignature};
pub use compile::{Compiler, OutputFormat};
pub use structure::{BuildOptions, BuildReport, DraftScanner, StructureBuilder};
pub use types::{OutlineStructure, SceneMetrics, SceneRecord};
