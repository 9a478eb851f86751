//! CLI command implementations for json-exporter.
//!
//! This module provides implementations for all CLI subcommands:
//! - `probe`: Run a single probe from the command line
//! - `config`: Configuration file generation

pub mod config;
pub mod probe;

// Re-export command functions
pub use config::command_config;
pub use probe::command_probe;
