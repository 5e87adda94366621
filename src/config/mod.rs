//! Configuration module for Novel-Loom
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file, plus the `NOVEL_DB_PATH` environment override for the
//! database location.

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlSettings, DatabaseConfig, FetchSettings};

// Re-export parser functions
pub use parser::{load_config, load_config_or_default};
