//! Command-Line Interface
//!
//! Subcommand implementations and console output helpers. Argument parsing
//! lives in `main.rs`; each command here takes plain values.

pub mod commands;
pub mod ui;
