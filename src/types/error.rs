//! Unified Error Type System
//!
//! Centralized error types for the entire application.
//!
//! ## Propagation Policy
//!
//! - Structural failures (missing drafts root, broken config) abort the build
//!   and surface to the caller.
//! - Per-scene failures (unreadable file, over-size file) are converted to
//!   [`SceneFailure`] records and returned alongside the partial outline, so a
//!   single bad file never loses the already-successful analyses.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BookError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    // -------------------------------------------------------------------------
    // Structural Errors (fatal for the whole build)
    // -------------------------------------------------------------------------
    #[error("drafts directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("config error: {0}")]
    Config(String),

    #[error("build cancelled")]
    Cancelled,

    // -------------------------------------------------------------------------
    // Per-Scene Errors (recorded as failures, build continues)
    // -------------------------------------------------------------------------
    #[error("file too large: {path} ({size} bytes, limit {limit})")]
    FileTooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error("failed to read {path}: {message}")]
    FileRead { path: PathBuf, message: String },

    // -------------------------------------------------------------------------
    // Compilation Errors
    // -------------------------------------------------------------------------
    #[error("compilation failed for {format}: {message}")]
    Compilation { format: String, message: String },
}

impl BookError {
    pub fn file_read(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::FileRead {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn compilation(format: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Compilation {
            format: format.into(),
            message: message.into(),
        }
    }

    /// Whether this error is scoped to a single scene file.
    ///
    /// Scene-scoped errors become [`SceneFailure`] records; everything else
    /// aborts the build.
    pub fn is_scene_scoped(&self) -> bool {
        matches!(self, Self::FileTooLarge { .. } | Self::FileRead { .. })
    }
}

pub type Result<T> = std::result::Result<T, BookError>;

// =============================================================================
// Per-Scene Failures
// =============================================================================

/// Why a single scene was excluded from the outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureReason {
    /// File exceeds the configured size ceiling.
    TooLarge { size: u64, limit: u64 },
    /// Permission, IO, or text-decoding error.
    Unreadable { message: String },
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooLarge { size, limit } => {
                write!(f, "file too large ({size} bytes, limit {limit})")
            }
            Self::Unreadable { message } => write!(f, "unreadable: {message}"),
        }
    }
}

/// A non-fatal, per-scene failure recorded during a build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneFailure {
    pub path: PathBuf,
    pub reason: FailureReason,
}

impl SceneFailure {
    pub fn too_large(path: impl Into<PathBuf>, size: u64, limit: u64) -> Self {
        Self {
            path: path.into(),
            reason: FailureReason::TooLarge { size, limit },
        }
    }

    pub fn unreadable(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: FailureReason::Unreadable {
                message: message.into(),
            },
        }
    }

    /// Convert a scene-scoped error into a failure record for `path`.
    pub fn from_error(path: &Path, err: &BookError) -> Self {
        match err {
            BookError::FileTooLarge { size, limit, .. } => Self::too_large(path, *size, *limit),
            other => Self::unreadable(path, other.to_string()),
        }
    }
}

impl std::fmt::Display for SceneFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_scoped_classification() {
        assert!(
            BookError::FileTooLarge {
                path: PathBuf::from("a.md"),
                size: 11,
                limit: 10,
            }
            .is_scene_scoped()
        );
        assert!(BookError::file_read("a.md", "denied").is_scene_scoped());
        assert!(
            !BookError::DirectoryNotFound {
                path: PathBuf::from("Drafts"),
            }
            .is_scene_scoped()
        );
        assert!(!BookError::Config("bad".into()).is_scene_scoped());
    }

    #[test]
    fn test_failure_from_error() {
        let err = BookError::FileTooLarge {
            path: PathBuf::from("big.md"),
            size: 20,
            limit: 10,
        };
        let failure = SceneFailure::from_error(Path::new("big.md"), &err);
        assert_eq!(
            failure.reason,
            FailureReason::TooLarge { size: 20, limit: 10 }
        );

        let err = BookError::file_read("locked.md", "permission denied");
        let failure = SceneFailure::from_error(Path::new("locked.md"), &err);
        assert!(matches!(failure.reason, FailureReason::Unreadable { .. }));
    }

    #[test]
    fn test_failure_display_names_path_and_reason() {
        let failure = SceneFailure::too_large("Book1/Act1/Scene01.md", 20, 10);
        let rendered = failure.to_string();
        assert!(rendered.contains("Scene01.md"));
        assert!(rendered.contains("limit 10"));
    }

    #[test]
    fn test_failure_round_trips_through_json() {
        let failure = SceneFailure::unreadable("a.md", "boom");
        let json = serde_json::to_string(&failure).unwrap();
        let back: SceneFailure = serde_json::from_str(&json).unwrap();
        assert_eq!(failure, back);
    }
}
