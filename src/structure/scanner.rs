//! Draft Tree Scanner
//!
//! Discovers the Book/Act/Scene hierarchy from directory and file naming
//! conventions under the configured drafts root.
//!
//! ## Naming Convention
//!
//! - Ancestor directories `BookN` and `ActM` (case-insensitive) carry the
//!   book and act numbers; when nested repeats occur the innermost wins.
//! - The scene number is the first digit run in the file stem
//!   (`Scene01.md` → 1). Files with no digits, the wrong extension, or no
//!   enclosing Book/Act pair are skipped, not errored.
//! - Symlinks and non-regular files are skipped.
//!
//! Only a missing root is fatal; everything else degrades to a skip or a
//! recorded per-file failure.

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use regex::Regex;
use tracing::{debug, warn};

use crate::types::{BookError, Result, SceneFailure, ScenePath};

/// Default scene file extension.
pub const DEFAULT_SCENE_EXTENSION: &str = "md";

/// Everything a scan produced: orderable scene descriptors plus walk-level
/// failures that would otherwise be silently dropped.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// Scenes sorted by (book, act, scene, path) ascending.
    pub scenes: Vec<ScenePath>,
    /// Entries the walker could not traverse.
    pub failures: Vec<SceneFailure>,
}

pub struct DraftScanner {
    root: PathBuf,
    extension: String,
    book_re: Regex,
    act_re: Regex,
    digits_re: Regex,
}

impl DraftScanner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_extension(root, DEFAULT_SCENE_EXTENSION)
    }

    pub fn with_extension(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
            book_re: Regex::new(r"(?i)^book(\d+)$").expect("static book pattern"),
            act_re: Regex::new(r"(?i)^act(\d+)$").expect("static act pattern"),
            digits_re: Regex::new(r"\d+").expect("static digits pattern"),
        }
    }

    /// Walk the drafts root and collect every scene matching the convention.
    ///
    /// Errors with [`BookError::DirectoryNotFound`] when the root itself is
    /// absent; individual unreadable entries are recorded in the outcome
    /// instead of aborting the scan.
    pub fn scan(&self) -> Result<ScanOutcome> {
        if !self.root.is_dir() {
            return Err(BookError::DirectoryNotFound {
                path: self.root.clone(),
            });
        }

        let mut outcome = ScanOutcome::default();

        let walker = WalkBuilder::new(&self.root)
            .hidden(false)
            .standard_filters(false)
            .follow_links(false)
            .build();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "skipping unreadable entry");
                    outcome
                        .failures
                        .push(SceneFailure::unreadable(self.root.clone(), e.to_string()));
                    continue;
                }
            };

            // file_type is None only for stdin; symlinks are not regular files
            // because the walker does not follow links.
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }

            if let Some(scene) = self.parse_scene(entry.path()) {
                outcome.scenes.push(scene);
            }
        }

        outcome.scenes.sort();
        debug!(
            root = %self.root.display(),
            scenes = outcome.scenes.len(),
            "scan complete"
        );
        Ok(outcome)
    }

    /// Parse one file path against the naming convention.
    ///
    /// Returns `None` (skip) for anything that does not encode a full
    /// (book, act, scene) triple.
    fn parse_scene(&self, path: &Path) -> Option<ScenePath> {
        let extension = path.extension()?.to_str()?;
        if !extension.eq_ignore_ascii_case(&self.extension) {
            return None;
        }

        let relative = path.strip_prefix(&self.root).ok()?;

        let mut book = None;
        let mut act = None;
        for part in relative.parent()?.components() {
            let name = part.as_os_str().to_str()?;
            if let Some(caps) = self.book_re.captures(name) {
                book = caps[1].parse::<u32>().ok();
            } else if let Some(caps) = self.act_re.captures(name) {
                act = caps[1].parse::<u32>().ok();
            }
        }

        let stem = path.file_stem()?.to_str()?;
        let scene = self
            .digits_re
            .find(stem)
            .and_then(|m| m.as_str().parse::<u32>().ok());

        match (book, act, scene) {
            (Some(book), Some(act), Some(scene)) => Some(ScenePath {
                book,
                act,
                scene,
                path: path.to_path_buf(),
            }),
            _ => {
                debug!(path = %path.display(), "skipping file outside naming convention");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_scene(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "content").unwrap();
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let dir = TempDir::new().unwrap();
        let scanner = DraftScanner::new(dir.path().join("absent"));
        assert!(matches!(
            scanner.scan().unwrap_err(),
            BookError::DirectoryNotFound { .. }
        ));
    }

    #[test]
    fn test_ordering_across_books_and_acts() {
        let dir = TempDir::new().unwrap();
        write_scene(dir.path(), "Book2/Act1/Scene02.md");
        write_scene(dir.path(), "Book1/Act1/Scene01.md");
        write_scene(dir.path(), "Book1/Act2/Scene01.md");
        write_scene(dir.path(), "Book1/Act1/Scene03.md");

        let outcome = DraftScanner::new(dir.path()).scan().unwrap();
        let order: Vec<(u32, u32, u32)> = outcome
            .scenes
            .iter()
            .map(|s| (s.book, s.act, s.scene))
            .collect();
        assert_eq!(order, vec![(1, 1, 1), (1, 1, 3), (1, 2, 1), (2, 1, 2)]);
        assert!(outcome.failures.is_empty());
    }

    #[test]
    fn test_nonconforming_entries_are_skipped() {
        let dir = TempDir::new().unwrap();
        write_scene(dir.path(), "Book1/Act1/Scene01.md");
        write_scene(dir.path(), "Book1/Act1/notes.txt"); // wrong extension
        write_scene(dir.path(), "Book1/Act1/fragment.md"); // no digits in stem
        write_scene(dir.path(), "Chapter1/Scene01.md"); // no Book/Act ancestry
        write_scene(dir.path(), "Book1/Scene02.md"); // book without act
        write_scene(dir.path(), "Act1/Scene03.md"); // act without book

        let outcome = DraftScanner::new(dir.path()).scan().unwrap();
        assert_eq!(outcome.scenes.len(), 1);
        assert!(outcome.scenes[0].path.ends_with("Book1/Act1/Scene01.md"));
    }

    #[test]
    fn test_naming_is_case_insensitive() {
        let dir = TempDir::new().unwrap();
        write_scene(dir.path(), "book3/ACT2/scene07.MD");

        let outcome = DraftScanner::new(dir.path()).scan().unwrap();
        assert_eq!(outcome.scenes.len(), 1);
        let scene = &outcome.scenes[0];
        assert_eq!((scene.book, scene.act, scene.scene), (3, 2, 7));
    }

    #[test]
    fn test_scene_number_is_first_digit_run() {
        let dir = TempDir::new().unwrap();
        write_scene(dir.path(), "Book1/Act1/05_the_storm_v2.md");

        let outcome = DraftScanner::new(dir.path()).scan().unwrap();
        assert_eq!(outcome.scenes[0].scene, 5);
    }

    #[test]
    fn test_intermediate_directories_are_allowed() {
        let dir = TempDir::new().unwrap();
        write_scene(dir.path(), "Book1/Act1/revised/Scene04.md");

        let outcome = DraftScanner::new(dir.path()).scan().unwrap();
        assert_eq!(outcome.scenes.len(), 1);
        assert_eq!(outcome.scenes[0].scene, 4);
    }

    #[test]
    fn test_symlinks_are_skipped() {
        let dir = TempDir::new().unwrap();
        write_scene(dir.path(), "Book1/Act1/Scene01.md");
        #[cfg(unix)]
        std::os::unix::fs::symlink(
            dir.path().join("Book1/Act1/Scene01.md"),
            dir.path().join("Book1/Act1/Scene02.md"),
        )
        .unwrap();

        let outcome = DraftScanner::new(dir.path()).scan().unwrap();
        assert_eq!(outcome.scenes.len(), 1);
        assert_eq!(outcome.scenes[0].scene, 1);
    }

    #[test]
    fn test_custom_extension() {
        let dir = TempDir::new().unwrap();
        write_scene(dir.path(), "Book1/Act1/Scene01.txt");
        write_scene(dir.path(), "Book1/Act1/Scene02.md");

        let outcome = DraftScanner::with_extension(dir.path(), "txt")
            .scan()
            .unwrap();
        assert_eq!(outcome.scenes.len(), 1);
        assert_eq!(outcome.scenes[0].scene, 1);
    }
}
