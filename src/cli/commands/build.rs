//! `build` command: scan, analyze, render the outline, compile.

use std::path::Path;
use std::time::Duration;

use crate::analysis::AnalysisCache;
use crate::cli::ui::Output;
use crate::compile::{Compiler, OutputFormat};
use crate::config::ConfigLoader;
use crate::outline;
use crate::structure::{BuildOptions, BuildReport, DraftScanner, StructureBuilder};
use crate::types::Result;

#[derive(Debug, Default)]
pub struct BuildFlags {
    /// Skip pandoc; still write the outline.
    pub no_compile: bool,
    /// Print the outline to stdout without writing any file.
    pub report_only: bool,
    /// Ignore the cache entirely and leave it untouched on disk.
    pub force: bool,
    /// Reanalyze everything but still refresh the cache.
    pub no_cache: bool,
    /// Formats to compile, overriding the config's enabled flags.
    pub formats: Option<Vec<OutputFormat>>,
}

pub fn run(config_path: &Path, flags: BuildFlags) -> Result<()> {
    let output = Output::new();
    let config = ConfigLoader::load(config_path)?;
    let analyzer = config.analyzer();
    let fingerprint = analyzer.fingerprint();

    let mut cache = if flags.force {
        AnalysisCache::new(config.cache_size)
    } else {
        AnalysisCache::load(&config.cache_file, config.cache_size, &fingerprint)
    };

    let scanner = DraftScanner::with_extension(&config.drafts_dir, &config.scene_extension);
    let builder = StructureBuilder::new(scanner, &analyzer);
    let report = builder.build(
        &mut cache,
        BuildOptions {
            use_cache: !flags.no_cache,
            force: flags.force,
        },
    )?;

    if !flags.force {
        cache.save(&config.cache_file, &fingerprint)?;
    }

    print_summary(&output, &report);

    if flags.report_only {
        println!("{}", outline::render(&report));
        return Ok(());
    }

    outline::save(&report, &config.outline_file)?;
    output.success(&format!("Outline written: {}", config.outline_file.display()));

    if flags.no_compile {
        return Ok(());
    }
    if report.outline.is_empty() {
        output.warning("No scenes found, skipping compilation");
        return Ok(());
    }

    let jobs = config.format_jobs(flags.formats.as_deref());
    if jobs.is_empty() {
        output.info("No output formats enabled, skipping compilation");
        return Ok(());
    }

    let compiler = Compiler::new(
        &config.compiled_dir,
        Duration::from_secs(config.compilation.timeout_secs),
        config.compilation.retries,
    );
    for path in compiler.compile(&report.outline, &jobs)? {
        output.success(&format!("Compiled: {}", path.display()));
    }

    Ok(())
}

fn print_summary(output: &Output, report: &BuildReport) {
    output.section("Build Summary");
    output.item("Scenes", &report.outline.scene_count().to_string());
    output.item("Total words", &report.outline.total_words().to_string());
    output.item("Open TODOs", &report.outline.total_todos().to_string());
    output.item("Analyzed", &report.stats.analyzed.to_string());
    output.item("From cache", &report.stats.cache_hits.to_string());

    for failure in &report.failures {
        output.warning(&format!("Skipped: {failure}"));
    }
}
