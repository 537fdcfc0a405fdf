//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching under a byte budget
//! - HTML parsing and link extraction
//! - Content-type dispatch and document text extraction
//! - Frontier scheduling and per-host politeness
//! - Overall crawl coordination

mod content;
mod coordinator;
mod fetcher;
mod parser;
mod scheduler;

pub use content::{
    decode_html, extract_text, html_text, BuiltinExtractor, ContentKind, DocumentExtractor,
    ExtractError, Extracted,
};
pub use coordinator::{Crawler, PageReport};
pub use fetcher::{build_http_client, fetch_url, FetchResult};
pub use parser::{extract_links, HtmlPage};
pub use scheduler::{NextUrl, QueuedUrl, Scheduler};

use crate::config::Config;
use crate::output::CrawlResult;
use crate::Result;

/// Runs a complete crawl operation
///
/// This is the main entry point for a one-shot crawl. It will:
/// 1. Normalize the seed and build the HTTP client
/// 2. Crawl breadth-first within the configured budgets
/// 3. Return the accumulated result
///
/// # Arguments
///
/// * `config` - The crawl configuration
///
/// # Returns
///
/// * `Ok(CrawlResult)` - Crawl finished
/// * `Err(WebgrepError)` - The seed was unusable or the client failed to build
///
/// # Example
///
/// ```no_run
/// use webgrep::config::Config;
/// use webgrep::crawler::crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut config = Config::default();
/// config.crawler.url = "https://example.com".to_string();
/// config.crawler.keyword = "example".to_string();
///
/// let result = crawl(config).await?;
/// println!("{} matches", result.total_matches());
/// # Ok(())
/// # }
/// ```
pub async fn crawl(config: Config) -> Result<CrawlResult> {
    let crawler = Crawler::new(config)?;
    Ok(crawler.run().await)
}
