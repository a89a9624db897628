//! File Signatures for Cache Invalidation
//!
//! A signature captures a file's identity state (byte size + modification
//! time) from metadata alone, so validity checks on unchanged files never
//! touch file content. Signatures for genuinely different content must
//! differ; equal signatures guarantee the cached analysis is still accurate.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{BookError, Result};

/// Content-identity value for a scene file.
///
/// Built from `fs::metadata` only. A content edit bumps the modification
/// time (and usually the length), which is what invalidates stale cache
/// entries without rereading files that have not changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSignature {
    /// File length in bytes.
    pub len: u64,
    /// Last modification time.
    pub mtime: DateTime<Utc>,
}

impl FileSignature {
    pub fn new(len: u64, mtime: DateTime<Utc>) -> Self {
        Self { len, mtime }
    }

    /// Read the signature for `path` from filesystem metadata.
    ///
    /// Metadata errors (missing file, permission denied) surface as
    /// [`BookError::FileRead`], which the builder records as a per-scene
    /// failure.
    pub fn from_path(path: &Path) -> Result<Self> {
        let metadata =
            fs::metadata(path).map_err(|e| BookError::file_read(path, e.to_string()))?;
        let mtime = metadata
            .modified()
            .map_err(|e| BookError::file_read(path, e.to_string()))?;

        Ok(Self {
            len: metadata.len(),
            mtime: mtime.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_signature_from_metadata() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scene.md");
        fs::write(&path, "hello world").unwrap();

        let sig = FileSignature::from_path(&path).unwrap();
        assert_eq!(sig.len, 11);
    }

    #[test]
    fn test_signature_changes_with_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scene.md");
        fs::write(&path, "draft one").unwrap();
        let before = FileSignature::from_path(&path).unwrap();

        // Appending changes the length even when mtime granularity is coarse.
        let mut file = fs::OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, " with more words").unwrap();
        drop(file);

        let after = FileSignature::from_path(&path).unwrap();
        assert_ne!(before, after);
    }

    #[test]
    fn test_missing_file_is_a_read_error() {
        let dir = TempDir::new().unwrap();
        let err = FileSignature::from_path(&dir.path().join("absent.md")).unwrap_err();
        assert!(matches!(err, BookError::FileRead { .. }));
    }

    #[test]
    fn test_signature_round_trips_through_json() {
        let sig = FileSignature::new(42, Utc::now());
        let json = serde_json::to_string(&sig).unwrap();
        let back: FileSignature = serde_json::from_str(&json).unwrap();
        assert_eq!(sig, back);
    }
}
