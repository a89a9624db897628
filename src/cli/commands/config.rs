//! `config` command: inspect the effective configuration.

use std::path::Path;

use crate::cli::ui::Output;
use crate::config::ConfigLoader;
use crate::types::{BookError, Result};

/// Show the merged configuration (defaults + file + environment).
pub fn show(config_path: &Path, as_json: bool) -> Result<()> {
    let config = ConfigLoader::load(config_path)?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&config)?);
    } else {
        print!(
            "{}",
            serde_yaml::to_string(&config).map_err(|e| BookError::Config(e.to_string()))?
        );
    }
    Ok(())
}

/// Show which config file is in effect, if any.
pub fn path(config_path: &Path) -> Result<()> {
    let output = Output::new();
    if config_path.exists() {
        output.success(&format!("Config file: {}", config_path.display()));
    } else {
        output.info(&format!(
            "No config file at {} (using defaults + environment)",
            config_path.display()
        ));
    }
    Ok(())
}
