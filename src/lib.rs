//! Novel-Loom: a sequential novel chapter harvester
//!
//! This crate ingests serialized fiction from supported source sites: it
//! resolves a novel's metadata from its homepage, then walks the chapter
//! sequence one page at a time, extracting clean prose and persisting each
//! chapter to a local database.

pub mod config;
pub mod engine;
pub mod extract;
pub mod fetch;
pub mod ingest;
pub mod store;

use thiserror::Error;

/// Main error type for Novel-Loom operations
#[derive(Debug, Error)]
pub enum LoomError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Could not fetch novel homepage for '{slug}': {reason}")]
    HomepageUnavailable { slug: String, reason: String },

    #[error("No usable metadata on novel homepage for '{slug}'")]
    MetadataUnavailable { slug: String },

    #[error("Unknown source site: {0}")]
    UnknownSite(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Store error: {0}")]
    Store(#[from] store::StoreError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for Novel-Loom operations
pub type Result<T> = std::result::Result<T, LoomError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use engine::{CrawlSummary, HaltReason};
pub use extract::{strategy_for, ExtractionStrategy, SourceSite};
pub use fetch::{FetchOutcome, PageFetcher};
pub use ingest::{IngestOptions, IngestReport, NovelIngestor};
pub use store::{ChapterStore, SqliteStore};
