//! WebGrep: a bounded keyword crawler
//!
//! This crate walks a bounded slice of a site breadth-first from a seed URL,
//! extracts searchable text from every page it visits and counts keyword
//! occurrences under exact, default (case- and accent-insensitive) or fuzzy
//! matching.

pub mod config;
pub mod crawler;
pub mod matcher;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for WebGrep operations
///
/// Per-page failures never surface here; they are classified into
/// [`output::ErrorKind`] counters on the crawl result.
#[derive(Debug, Error)]
pub enum WebgrepError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Seed URL cannot be resolved: {url}")]
    InvalidSeed { url: String },

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

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

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for WebGrep operations
pub type Result<T> = std::result::Result<T, WebgrepError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::{Config, MatchMode, OutputFormat};
pub use crawler::Crawler;
pub use matcher::{count_matches, Matcher};
pub use output::{CrawlResult, ErrorKind};
pub use state::PageState;
pub use url::{extract_host, normalize_url, LinkFilter};
