//! `init` command: create the project skeleton and default config.

use std::path::Path;

use crate::cli::ui::Output;
use crate::config::ConfigLoader;
use crate::types::Result;

pub fn run(force: bool) -> Result<()> {
    let output = Output::new();

    let config_path = ConfigLoader::init_project(Path::new("."), force)?;

    output.success(&format!("Project initialized ({})", config_path.display()));
    output.info("Put scene files under 4_Scenes_and_Chapters/Drafts/Book1/Act1/");
    output.info("Then run: bookloom build");
    Ok(())
}
