//! `clean` command: remove generated artifacts.

use std::fs;
use std::path::Path;

use crate::cli::ui::Output;
use crate::config::ConfigLoader;
use crate::types::Result;

/// Remove build artifacts; with `cache_only`, just the analysis cache.
pub fn run(config_path: &Path, cache_only: bool) -> Result<()> {
    let output = Output::new();
    let config = ConfigLoader::load(config_path)?;

    let mut removed = 0;
    removed += remove_file(&output, &config.cache_file)?;

    if !cache_only {
        removed += remove_file(&output, &config.outline_file)?;
        if config.compiled_dir.exists() {
            fs::remove_dir_all(&config.compiled_dir)?;
            output.info(&format!("Removed {}", config.compiled_dir.display()));
            removed += 1;
        }
    }

    if removed == 0 {
        output.info("Nothing to clean");
    } else {
        output.success("Clean complete");
    }
    Ok(())
}

fn remove_file(output: &Output, path: &Path) -> Result<usize> {
    if path.exists() {
        fs::remove_file(path)?;
        output.info(&format!("Removed {}", path.display()));
        Ok(1)
    } else {
        Ok(0)
    }
}
