//! Project Structure Discovery
//!
//! Scans the drafts tree and assembles the analyzed outline.

pub mod builder;
pub mod scanner;

pub use builder::{BuildOptions, BuildReport, BuildStats, StructureBuilder};
pub use scanner::{DraftScanner, ScanOutcome, DEFAULT_SCENE_EXTENSION};
