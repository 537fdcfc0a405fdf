//! Plain-text report rendering

use crate::config::CrawlerConfig;
use crate::output::result::{CrawlResult, ErrorKind};

/// Formats a crawl result as a human-readable report
///
/// Matches are listed by count (highest first), then by URL.
pub fn render_text(result: &CrawlResult, query: &CrawlerConfig) -> String {
    let mut out = String::new();

    out.push_str("--- WebGrep Results ---\n");
    out.push_str(&format!("Query: \"{}\" ({} mode)\n", query.keyword, query.mode));
    out.push_str(&format!("Seed: {} (depth {})\n", query.url, query.depth));
    out.push_str(&format!("Total matches found: {}\n", result.total_matches()));
    out.push_str(&format!("Pages visited: {}\n", result.visited_count));
    out.push_str(&format!("Pages successfully parsed: {}\n", result.parsed_count));
    if let Some(duration) = result.duration_ms() {
        out.push_str(&format!(
            "Duration: {:.2} seconds\n",
            duration as f64 / 1000.0
        ));
    }

    out.push_str("\nDetailed Stats:\n");
    for kind in ErrorKind::all() {
        out.push_str(&format!("  {}: {}\n", kind, result.error_count(*kind)));
    }

    let matches = result.sorted_matches();
    if !matches.is_empty() {
        out.push_str("\nFound in:\n");
        for (url, count) in matches {
            out.push_str(&format!("{} ({})\n", url, count));
        }
    }

    if !result.blocked.is_empty() {
        out.push_str("\nNotice: Some URLs were blocked or could not be fully processed:\n");
        for (url, reason) in &result.blocked {
            out.push_str(&format!(
                "Couldn't retrieve all links from the URL, blocked because of {}: {}\n",
                reason, url
            ));
        }
    }

    if result.interrupted {
        out.push_str("\nCrawl interrupted before the frontier was exhausted; results are partial.\n");
    }

    out
}
