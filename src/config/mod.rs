//! Configuration module for WebGrep
//!
//! This module holds the immutable crawl configuration, loads optional TOML
//! configuration files and validates the merged result.
//!
//! # Example
//!
//! ```no_run
//! use webgrep::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("webgrep.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, FilterConfig, HttpConfig, MatchMode, OutputConfig, OutputFormat,
    DEFAULT_MAX_BYTES,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
