//! Manuscript Compilation
//!
//! Combines scenes in outline order into a single Markdown manuscript and
//! shells out to `pandoc` for each enabled output format.
//!
//! ## Process Discipline
//!
//! Pandoc runs are bounded by a wall-clock timeout (the child is killed on
//! expiry) and retried with exponential backoff, so one wedged conversion
//! cannot hang a build and transient failures do not fail it.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::str::FromStr;
use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::types::{BookError, OutlineStructure, Result};

/// Poll interval while waiting on a pandoc child.
const WAIT_POLL: Duration = Duration::from_millis(50);
/// First retry delay; doubles per attempt.
const RETRY_BASE: Duration = Duration::from_millis(500);

/// Supported pandoc output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Docx,
    Epub,
    Pdf,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 3] = [OutputFormat::Docx, OutputFormat::Epub, OutputFormat::Pdf];

    /// Output file extension, which doubles as the format name.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Docx => "docx",
            OutputFormat::Epub => "epub",
            OutputFormat::Pdf => "pdf",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = BookError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "docx" => Ok(OutputFormat::Docx),
            "epub" => Ok(OutputFormat::Epub),
            "pdf" => Ok(OutputFormat::Pdf),
            other => Err(BookError::Config(format!(
                "unknown output format '{other}' (expected docx, epub, or pdf)"
            ))),
        }
    }
}

/// One conversion to run: a format plus its extra pandoc arguments.
#[derive(Debug, Clone)]
pub struct FormatJob {
    pub format: OutputFormat,
    pub extra_args: Vec<String>,
}

pub struct Compiler {
    output_dir: PathBuf,
    timeout: Duration,
    retries: u32,
}

impl Compiler {
    pub fn new(output_dir: impl Into<PathBuf>, timeout: Duration, retries: u32) -> Self {
        Self {
            output_dir: output_dir.into(),
            timeout,
            retries,
        }
    }

    /// Compile the manuscript into every requested format.
    ///
    /// Writes the combined Markdown to `manuscript.md` in the output
    /// directory, then converts it once per job. One failing format does not
    /// stop the others; the run errors only when every job failed. Returns
    /// the paths of the produced documents.
    pub fn compile(&self, outline: &OutlineStructure, jobs: &[FormatJob]) -> Result<Vec<PathBuf>> {
        if outline.is_empty() {
            return Err(BookError::compilation("manuscript", "no scenes to compile"));
        }

        fs::create_dir_all(&self.output_dir)?;
        let manuscript = self.output_dir.join("manuscript.md");
        fs::write(&manuscript, combine_scenes(outline)?)?;
        debug!(path = %manuscript.display(), "manuscript assembled");

        let mut produced = Vec::with_capacity(jobs.len());
        let mut first_failure = None;
        for job in jobs {
            let output = self
                .output_dir
                .join(format!("manuscript.{}", job.format.extension()));
            match self.convert(&manuscript, &output, job) {
                Ok(()) => {
                    info!(format = %job.format, path = %output.display(), "compiled");
                    produced.push(output);
                }
                Err(err) => {
                    warn!(format = %job.format, error = %err, "format failed");
                    first_failure.get_or_insert(err);
                }
            }
        }

        match first_failure {
            Some(err) if produced.is_empty() => Err(err),
            _ => Ok(produced),
        }
    }

    fn convert(&self, input: &Path, output: &Path, job: &FormatJob) -> Result<()> {
        let mut attempt = 0;
        loop {
            match self.run_pandoc(input, output, job) {
                Ok(()) => return Ok(()),
                Err(err) if attempt < self.retries => {
                    let delay = RETRY_BASE * 2u32.pow(attempt);
                    warn!(
                        format = %job.format,
                        attempt = attempt + 1,
                        error = %err,
                        "pandoc failed, retrying"
                    );
                    thread::sleep(delay);
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn run_pandoc(&self, input: &Path, output: &Path, job: &FormatJob) -> Result<()> {
        let compilation_err = |message: String| BookError::compilation(job.format.to_string(), message);

        let mut child = Command::new("pandoc")
            .args(pandoc_args(input, output, &job.extra_args))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| compilation_err(format!("failed to launch pandoc: {e}")))?;

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) if Instant::now() >= deadline => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(compilation_err(format!(
                        "timed out after {}s",
                        self.timeout.as_secs()
                    )));
                }
                Ok(None) => thread::sleep(WAIT_POLL),
                Err(e) => return Err(compilation_err(format!("wait failed: {e}"))),
            }
        };

        if status.success() {
            Ok(())
        } else {
            let mut stderr = String::new();
            if let Some(mut pipe) = child.stderr.take() {
                use std::io::Read;
                let _ = pipe.read_to_string(&mut stderr);
            }
            Err(compilation_err(format!(
                "pandoc exited with {status}: {}",
                stderr.trim()
            )))
        }
    }
}

/// Pandoc argv shared by every format; the format itself is inferred by
/// pandoc from the output extension.
fn pandoc_args(input: &Path, output: &Path, extra: &[String]) -> Vec<String> {
    let mut args = vec![
        input.display().to_string(),
        "--from".to_string(),
        "markdown".to_string(),
        "-o".to_string(),
        output.display().to_string(),
        "--standalone".to_string(),
    ];
    args.extend(extra.iter().cloned());
    args
}

/// Concatenate scene files in outline order with book/act headings.
///
/// Headings sit at levels one and two so chapter-splitting options like
/// `--epub-chapter-level=2` fall on act boundaries.
fn combine_scenes(outline: &OutlineStructure) -> Result<String> {
    let mut doc = String::new();

    for (book, acts) in outline.books() {
        doc.push_str(&format!("# Book {book}\n"));
        for (act, scenes) in acts {
            doc.push_str(&format!("\n## Act {act}\n"));
            for scene in scenes {
                let text = fs::read_to_string(&scene.path)
                    .map_err(|e| BookError::file_read(&scene.path, e.to_string()))?;
                doc.push('\n');
                doc.push_str(text.trim_end());
                doc.push('\n');
            }
        }
        doc.push('\n');
    }

    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SceneMetrics, ScenePath, SceneRecord};
    use tempfile::TempDir;

    fn outline_with(dir: &Path, scenes: &[(u32, u32, u32, &str)]) -> OutlineStructure {
        let mut outline = OutlineStructure::new();
        for (book, act, scene, content) in scenes {
            let path = dir.join(format!("Book{book}/Act{act}/Scene{scene:02}.md"));
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, content).unwrap();
            outline.push(SceneRecord::new(
                ScenePath {
                    book: *book,
                    act: *act,
                    scene: *scene,
                    path,
                },
                SceneMetrics::empty(),
            ));
        }
        outline
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("docx".parse::<OutputFormat>().unwrap(), OutputFormat::Docx);
        assert_eq!("EPUB".parse::<OutputFormat>().unwrap(), OutputFormat::Epub);
        assert_eq!("Pdf".parse::<OutputFormat>().unwrap(), OutputFormat::Pdf);
        assert!("mobi".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_format_display_round_trip() {
        for format in OutputFormat::ALL {
            assert_eq!(format.to_string().parse::<OutputFormat>().unwrap(), format);
        }
    }

    #[test]
    fn test_pandoc_args_order_and_extras() {
        let args = pandoc_args(
            Path::new("in.md"),
            Path::new("out.epub"),
            &["--epub-chapter-level=2".to_string()],
        );
        assert_eq!(
            args,
            vec![
                "in.md",
                "--from",
                "markdown",
                "-o",
                "out.epub",
                "--standalone",
                "--epub-chapter-level=2",
            ]
        );
    }

    #[test]
    fn test_combine_scenes_in_outline_order() {
        let dir = TempDir::new().unwrap();
        let outline = outline_with(
            dir.path(),
            &[
                (2, 1, 1, "Closing movement."),
                (1, 1, 1, "Opening scene."),
                (1, 1, 2, "Second scene.\n"),
                (1, 2, 1, "Act two begins."),
            ],
        );

        let doc = combine_scenes(&outline).unwrap();
        let opening = doc.find("Opening scene.").unwrap();
        let second = doc.find("Second scene.").unwrap();
        let act_two = doc.find("Act two begins.").unwrap();
        let closing = doc.find("Closing movement.").unwrap();
        assert!(opening < second && second < act_two && act_two < closing);

        assert!(doc.contains("# Book 1\n"));
        assert!(doc.contains("## Act 2\n"));
        // Trailing newlines in scene files do not stack up.
        assert!(!doc.contains("\n\n\n"));
    }

    #[test]
    fn test_combine_fails_on_missing_scene_file() {
        let dir = TempDir::new().unwrap();
        let mut outline = outline_with(dir.path(), &[(1, 1, 1, "text")]);
        outline.push(SceneRecord::new(
            ScenePath {
                book: 1,
                act: 1,
                scene: 2,
                path: dir.path().join("Book1/Act1/missing.md"),
            },
            SceneMetrics::empty(),
        ));

        assert!(matches!(
            combine_scenes(&outline).unwrap_err(),
            BookError::FileRead { .. }
        ));
    }

    #[test]
    fn test_compile_rejects_empty_outline() {
        let dir = TempDir::new().unwrap();
        let compiler = Compiler::new(dir.path(), Duration::from_secs(5), 0);
        let err = compiler
            .compile(&OutlineStructure::new(), &[])
            .unwrap_err();
        assert!(matches!(err, BookError::Compilation { .. }));
    }

    #[test]
    fn test_compile_with_no_jobs_writes_manuscript_only() {
        let dir = TempDir::new().unwrap();
        let outline = outline_with(dir.path(), &[(1, 1, 1, "Just one scene.")]);
        let out_dir = dir.path().join("Compiled");

        let compiler = Compiler::new(&out_dir, Duration::from_secs(5), 0);
        let produced = compiler.compile(&outline, &[]).unwrap();
        assert!(produced.is_empty());
        assert!(out_dir.join("manuscript.md").is_file());
    }
}
