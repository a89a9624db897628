//! Configuration
//!
//! Layered settings: built-in defaults, `config.yaml`, then `BOOKLOOM_*`
//! environment variables.

pub mod loader;
pub mod types;

pub use loader::ConfigLoader;
pub use types::{CompilationConfig, Config, FormatConfig, FormatsConfig};
