//! JSON report rendering

use crate::config::{CrawlerConfig, MatchMode};
use crate::output::result::{CrawlResult, ErrorKind};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    query: QuerySection<'a>,
    stats: StatsSection,
    results: Vec<MatchEntry<'a>>,
    blocked: Vec<BlockedEntry<'a>>,
}

#[derive(Debug, Serialize)]
struct QuerySection<'a> {
    url: &'a str,
    keyword: &'a str,
    depth: u32,
    mode: MatchMode,
}

#[derive(Debug, Serialize)]
struct StatsSection {
    total_matches: usize,
    pages_visited: usize,
    pages_parsed: usize,
    pages_blocked: usize,
    errors: ErrorSection,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
    duration_ms: Option<i64>,
    interrupted: bool,
}

#[derive(Debug, Serialize)]
struct ErrorSection {
    network_error: usize,
    blocked: usize,
    parse_error: usize,
    skipped_size: usize,
    skipped_type: usize,
}

#[derive(Debug, Serialize)]
struct MatchEntry<'a> {
    url: &'a str,
    count: usize,
}

#[derive(Debug, Serialize)]
struct BlockedEntry<'a> {
    url: &'a str,
    reason: &'a str,
}

/// Formats a crawl result as a pretty-printed JSON document
///
/// # Errors
///
/// Returns the serializer error if the report cannot be encoded.
pub fn render_json(
    result: &CrawlResult,
    query: &CrawlerConfig,
) -> Result<String, serde_json::Error> {
    let report = JsonReport {
        query: QuerySection {
            url: &query.url,
            keyword: &query.keyword,
            depth: query.depth,
            mode: query.mode,
        },
        stats: StatsSection {
            total_matches: result.total_matches(),
            pages_visited: result.visited_count,
            pages_parsed: result.parsed_count,
            pages_blocked: result.blocked.len(),
            errors: ErrorSection {
                network_error: result.error_count(ErrorKind::NetworkError),
                blocked: result.error_count(ErrorKind::Blocked),
                parse_error: result.error_count(ErrorKind::ParseError),
                skipped_size: result.error_count(ErrorKind::SkippedSize),
                skipped_type: result.error_count(ErrorKind::SkippedType),
            },
            started_at: result.started_at,
            finished_at: result.finished_at,
            duration_ms: result.duration_ms(),
            interrupted: result.interrupted,
        },
        results: result
            .sorted_matches()
            .into_iter()
            .map(|(url, count)| MatchEntry { url, count })
            .collect(),
        blocked: result
            .blocked
            .iter()
            .map(|(url, reason)| BlockedEntry { url, reason })
            .collect(),
    };

    serde_json::to_string_pretty(&report)
}
