//! Accumulated crawl output

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;

/// Closed set of per-page failure classifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ErrorKind {
    /// Transport, connection, timeout or non-403/429 HTTP failure
    NetworkError,
    /// HTTP 403/429 or a bot-protection challenge page
    Blocked,
    /// Structured extraction failed but fallback text was produced
    ParseError,
    /// Declared or downloaded body exceeded the byte budget
    SkippedSize,
    /// Content type intentionally not processed
    SkippedType,
}

impl ErrorKind {
    /// Returns every kind in reporting order
    pub fn all() -> &'static [ErrorKind] {
        &[
            Self::NetworkError,
            Self::Blocked,
            Self::ParseError,
            Self::SkippedSize,
            Self::SkippedType,
        ]
    }

    /// Snake-case key used in JSON reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NetworkError => "network_error",
            Self::Blocked => "blocked",
            Self::ParseError => "parse_error",
            Self::SkippedSize => "skipped_size",
            Self::SkippedType => "skipped_type",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_uppercase())
    }
}

/// Everything a crawl run produced
///
/// Created empty when the crawl starts, mutated only by the crawler's
/// coordinator while pages complete, and handed out read-only once the run
/// ends. Maps are ordered by key so reports do not depend on the order in
/// which concurrent fetches finished.
#[derive(Debug, Clone)]
pub struct CrawlResult {
    /// URL -> keyword count, only for counts above zero
    pub matches: BTreeMap<String, usize>,

    /// URL -> human-readable reason it was blocked
    pub blocked: BTreeMap<String, String>,

    /// Every [`ErrorKind`] with its count (zero included)
    pub error_counts: BTreeMap<ErrorKind, usize>,

    /// Frontier items dequeued and attempted
    pub visited_count: usize,

    /// Pages whose text extraction ran
    pub parsed_count: usize,

    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,

    /// True if the run was cancelled before the frontier drained
    pub interrupted: bool,
}

impl CrawlResult {
    pub fn new() -> Self {
        Self {
            matches: BTreeMap::new(),
            blocked: BTreeMap::new(),
            error_counts: ErrorKind::all().iter().map(|kind| (*kind, 0)).collect(),
            visited_count: 0,
            parsed_count: 0,
            started_at: Utc::now(),
            finished_at: None,
            interrupted: false,
        }
    }

    /// Records a keyword count for a page; zero counts are ignored
    pub fn add_match(&mut self, url: &str, count: usize) {
        if count > 0 {
            self.matches.insert(url.to_string(), count);
        }
    }

    /// Records a blocked page and bumps the `Blocked` counter once per URL
    pub fn add_blocked(&mut self, url: &str, reason: &str) {
        if self
            .blocked
            .insert(url.to_string(), reason.to_string())
            .is_none()
        {
            self.increment_error(ErrorKind::Blocked);
        }
    }

    pub fn increment_error(&mut self, kind: ErrorKind) {
        *self.error_counts.entry(kind).or_insert(0) += 1;
    }

    pub fn error_count(&self, kind: ErrorKind) -> usize {
        self.error_counts.get(&kind).copied().unwrap_or(0)
    }

    /// Sum of keyword counts over every matched page
    pub fn total_matches(&self) -> usize {
        self.matches.values().sum()
    }

    /// Matches ordered by count (descending), then URL (ascending)
    pub fn sorted_matches(&self) -> Vec<(&str, usize)> {
        let mut entries: Vec<(&str, usize)> = self
            .matches
            .iter()
            .map(|(url, count)| (url.as_str(), *count))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries
    }

    /// Stamps the end of the run
    pub fn finish(&mut self, interrupted: bool) {
        self.finished_at = Some(Utc::now());
        self.interrupted = interrupted;
    }

    /// Wall-clock duration in milliseconds, once the run has finished
    pub fn duration_ms(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_milliseconds())
    }
}

impl Default for CrawlResult {
    fn default() -> Self {
        Self::new()
    }
}
