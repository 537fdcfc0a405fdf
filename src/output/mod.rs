//! Output module for collecting and reporting crawl results
//!
//! This module handles:
//! - Accumulating per-page outcomes into a [`CrawlResult`]
//! - Rendering the result as a text or JSON report

mod json;
mod result;
mod text;

pub use json::render_json;
pub use result::{CrawlResult, ErrorKind};
pub use text::render_text;

use crate::config::{CrawlerConfig, OutputFormat};
use crate::Result;

/// Renders a crawl result in the requested format
///
/// # Arguments
///
/// * `result` - The finished (or interrupted) crawl result
/// * `query` - The crawl parameters echoed in the report header
/// * `format` - Text or JSON
///
/// # Returns
///
/// * `Ok(String)` - The rendered report
/// * `Err(WebgrepError)` - JSON serialization failed
pub fn render_report(
    result: &CrawlResult,
    query: &CrawlerConfig,
    format: OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(result, query)),
        OutputFormat::Json => Ok(render_json(result, query)?),
    }
}
