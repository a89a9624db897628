//! Outline Rendering
//!
//! Turns a build report into the Markdown outline document: per-scene word
//! counts, frequent terms, and TODO checklists, with per-act, per-book, and
//! project-wide totals.
//!
//! Rendering is pure string assembly; [`save`] is the only function that
//! touches the filesystem.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::Utc;
use tracing::info;

use crate::structure::BuildReport;
use crate::types::{Result, SceneRecord};

/// Render the full outline document.
///
/// Section order follows the outline's own ordering, so identical reports
/// render to identical documents apart from the generation timestamp.
pub fn render(report: &BuildReport) -> String {
    let mut doc = String::new();

    doc.push_str("# Story Outline\n\n");
    doc.push_str(&format!(
        "_Generated: {}_\n",
        Utc::now().format("%Y-%m-%d %H:%M UTC")
    ));

    for (book, acts) in report.outline.books() {
        doc.push_str(&format!("\n## Book {book}\n"));
        render_book(&mut doc, book, acts);
    }

    render_statistics(&mut doc, report);
    render_failures(&mut doc, report);

    doc
}

fn render_book(doc: &mut String, book: u32, acts: &BTreeMap<u32, Vec<SceneRecord>>) {
    let mut book_words = 0;
    let mut book_scenes = 0;

    for (act, scenes) in acts {
        doc.push_str(&format!("\n### Act {act}\n"));

        let act_words: usize = scenes.iter().map(|s| s.metrics.word_count).sum();
        for scene in scenes {
            render_scene(doc, scene);
        }

        doc.push_str(&format!(
            "\n_Act {act} total: {} words across {} scene(s)_\n",
            group_digits(act_words),
            scenes.len()
        ));
        book_words += act_words;
        book_scenes += scenes.len();
    }

    doc.push_str(&format!(
        "\n_Book {book} total: {} words across {} scene(s)_\n",
        group_digits(book_words),
        book_scenes
    ));
}

fn render_scene(doc: &mut String, scene: &SceneRecord) {
    doc.push_str(&format!("\n#### {}\n\n", scene.title()));
    doc.push_str(&format!(
        "- Words: {}\n",
        group_digits(scene.metrics.word_count)
    ));

    if !scene.metrics.top_words.is_empty() {
        doc.push_str(&format!(
            "- Frequent terms: {}\n",
            scene.metrics.top_words.join(", ")
        ));
    }

    if !scene.metrics.todos.is_empty() {
        doc.push_str("- TODO:\n");
        for todo in &scene.metrics.todos {
            doc.push_str(&format!("  - [ ] {todo}\n"));
        }
    }
}

fn render_statistics(doc: &mut String, report: &BuildReport) {
    let outline = &report.outline;
    doc.push_str("\n## Project Statistics\n\n");
    doc.push_str(&format!("- Books: {}\n", outline.books().count()));
    doc.push_str(&format!("- Scenes: {}\n", outline.scene_count()));
    doc.push_str(&format!(
        "- Total words: {}\n",
        group_digits(outline.total_words())
    ));
    doc.push_str(&format!(
        "- Outstanding TODOs: {}\n",
        outline.total_todos()
    ));
}

fn render_failures(doc: &mut String, report: &BuildReport) {
    if report.failures.is_empty() {
        return;
    }
    doc.push_str("\n## Skipped Files\n\n");
    for failure in &report.failures {
        doc.push_str(&format!("- {failure}\n"));
    }
}

/// Write the rendered outline, creating parent directories as needed.
pub fn save(report: &BuildReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, render(report))?;
    info!(path = %path.display(), "outline written");
    Ok(())
}

/// Thousands separators for word counts: 1234567 → "1,234,567".
fn group_digits(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
