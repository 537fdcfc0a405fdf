//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop that coordinates all aspects of
//! the crawling process, including:
//! - Seeding and draining the frontier breadth-first
//! - Dispatching fetches to a bounded pool of workers
//! - Classifying each page and counting keyword matches
//! - Admitting discovered links within scope and budget
//! - Handling cancellation

use crate::config::Config;
use crate::crawler::content::{
    decode_html, extract_text, BuiltinExtractor, ContentKind, DocumentExtractor,
};
use crate::crawler::fetcher::{build_http_client, fetch_url, FetchResult};
use crate::crawler::parser::{extract_links, HtmlPage};
use crate::crawler::scheduler::{NextUrl, QueuedUrl, Scheduler};
use crate::matcher::Matcher;
use crate::output::{CrawlResult, ErrorKind};
use crate::state::PageState;
use crate::url::{extract_host, is_same_host, normalize_url, LinkFilter};
use crate::{Result, WebgrepError};
use reqwest::Client;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;

/// Title fragment shown by bot-protection interstitials
const CHALLENGE_TITLE: &str = "Just a moment...";

/// Body fragment shown by bot-protection interstitials
const CHALLENGE_TEXT: &str = "Enable JavaScript and cookies to continue";

const CHALLENGE_REASON: &str = "Cloudflare/Bot protection challenge";

/// Pages between progress log lines
const PROGRESS_INTERVAL: usize = 10;

/// Outcome of processing one frontier item
///
/// Produced by a worker and consumed by the coordinator, which alone applies
/// it to the crawl result and the frontier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageReport {
    /// The normalized URL that was dequeued
    pub url: String,

    /// Depth of that URL
    pub depth: u32,

    /// Terminal state of the item
    pub state: PageState,

    /// Set when the page was blocked (HTTP 403/429 or a challenge page)
    pub blocked_reason: Option<String>,

    /// Keyword occurrences in the extracted text
    pub match_count: usize,

    /// Normalized, filtered links discovered on the page
    pub links: Vec<String>,

    /// True if text extraction ran
    pub parsed: bool,
}

impl PageReport {
    fn terminal(url: String, depth: u32, state: PageState) -> Self {
        Self {
            url,
            depth,
            state,
            blocked_reason: None,
            match_count: 0,
            links: Vec::new(),
            parsed: false,
        }
    }
}

/// Read-only state shared by every worker
struct PageContext {
    client: Client,
    matcher: Matcher,
    filter: LinkFilter,
    extractor: Arc<dyn DocumentExtractor>,
    max_bytes: u64,
    max_depth: u32,
    max_links: usize,
}

impl PageContext {
    /// Fetches and analyses one frontier item
    async fn process(self: Arc<Self>, queued: QueuedUrl) -> PageReport {
        let fetched = fetch_url(&self.client, &queued.url, self.max_bytes).await;

        let url = queued.url.clone();
        let depth = queued.depth;
        let context = Arc::clone(&self);

        // Parsing and document extraction are CPU-bound and `Html` is !Send
        match tokio::task::spawn_blocking(move || context.analyse(queued, fetched)).await {
            Ok(report) => report,
            Err(e) => {
                tracing::error!("Analysis of {} failed: {}", url, e);
                PageReport::terminal(url, depth, PageState::NetworkError)
            }
        }
    }

    /// Classifies a fetch outcome into a page report
    fn analyse(&self, queued: QueuedUrl, fetched: FetchResult) -> PageReport {
        let QueuedUrl { url, depth, .. } = queued;

        match fetched {
            FetchResult::Success {
                final_url,
                content_type,
                body,
                ..
            } => self.analyse_body(url, depth, &final_url, content_type.as_deref(), &body),
            FetchResult::TooLarge { declared, limit } => {
                tracing::debug!(
                    "Skipping {}: body exceeds {} bytes (declared: {:?})",
                    url,
                    limit,
                    declared
                );
                PageReport::terminal(url, depth, PageState::SkippedSize)
            }
            FetchResult::HttpError { status_code } if status_code == 403 || status_code == 429 => {
                let mut report = PageReport::terminal(url, depth, PageState::Blocked);
                report.blocked_reason = Some(format!(
                    "HTTP {} (Access Denied/Rate Limited)",
                    status_code
                ));
                report
            }
            FetchResult::HttpError { status_code } => {
                tracing::debug!("HTTP {} for {}", status_code, url);
                PageReport::terminal(url, depth, PageState::NetworkError)
            }
            FetchResult::NetworkError { error } => {
                tracing::debug!("Network error for {}: {}", url, error);
                PageReport::terminal(url, depth, PageState::NetworkError)
            }
        }
    }

    fn analyse_body(
        &self,
        url: String,
        depth: u32,
        final_url: &str,
        content_type: Option<&str>,
        body: &[u8],
    ) -> PageReport {
        let kind = ContentKind::from_content_type(content_type);

        let (text, degraded, links, challenge) = match kind {
            ContentKind::Unsupported => {
                tracing::debug!("Skipping {}: content type {:?}", url, content_type);
                return PageReport::terminal(url, depth, PageState::SkippedType);
            }
            ContentKind::Html => {
                let (html, invalid_utf8) = decode_html(body);
                if invalid_utf8 {
                    tracing::warn!("{} is not valid UTF-8; decoding lossily", url);
                }
                let page = HtmlPage::parse(&html);

                let challenge = is_challenge(&page);
                let extracted = extract_text(
                    body,
                    kind,
                    content_type,
                    &url,
                    Some(&page),
                    self.extractor.as_ref(),
                );
                let links = if depth < self.max_depth {
                    extract_links(&page, body, final_url, &self.filter, self.max_links)
                } else {
                    Vec::new()
                };
                (extracted.text, invalid_utf8, links, challenge)
            }
            ContentKind::Binary => {
                let extracted = extract_text(
                    body,
                    kind,
                    content_type,
                    &url,
                    None,
                    self.extractor.as_ref(),
                );
                (extracted.text, extracted.degraded, Vec::new(), false)
            }
        };

        let match_count = self.matcher.count(&text);
        let state = if challenge {
            PageState::Blocked
        } else if degraded {
            PageState::ParseError
        } else if match_count > 0 {
            PageState::Matched
        } else {
            PageState::Unmatched
        };

        PageReport {
            url,
            depth,
            state,
            blocked_reason: challenge.then(|| CHALLENGE_REASON.to_string()),
            match_count,
            links,
            parsed: true,
        }
    }
}

/// Returns true if the page is a bot-protection interstitial
fn is_challenge(page: &HtmlPage) -> bool {
    page.title()
        .is_some_and(|title| title.contains(CHALLENGE_TITLE))
        || page.full_text().contains(CHALLENGE_TEXT)
}

/// Bounded breadth-first keyword crawler
///
/// Built once from an immutable [`Config`]; each call to [`Crawler::run`]
/// performs an independent crawl from the seed.
pub struct Crawler {
    config: Config,
    seed_url: String,
    seed_host: String,
    context: Arc<PageContext>,
}

impl Crawler {
    /// Creates a crawler using the built-in document extractor
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Ready to run
    /// * `Err(WebgrepError::InvalidSeed)` - The seed has no usable host
    /// * `Err(WebgrepError::Client)` - The HTTP client could not be built
    pub fn new(config: Config) -> Result<Self> {
        Self::with_extractor(config, Arc::new(BuiltinExtractor))
    }

    /// Creates a crawler with a custom extractor for non-HTML documents
    pub fn with_extractor(
        config: Config,
        extractor: Arc<dyn DocumentExtractor>,
    ) -> Result<Self> {
        let seed_url = normalize_url(&config.crawler.url, None);
        let seed_host = extract_host(&seed_url).ok_or_else(|| WebgrepError::InvalidSeed {
            url: config.crawler.url.clone(),
        })?;

        let client = build_http_client(&config.http, config.crawler.timeout_ms)?;

        let context = Arc::new(PageContext {
            client,
            matcher: Matcher::new(&config.crawler.keyword, config.crawler.mode),
            filter: LinkFilter::new(&config.filter),
            extractor,
            max_bytes: config.crawler.max_bytes,
            max_depth: config.crawler.depth,
            max_links: config.crawler.max_links_per_page,
        });

        Ok(Self {
            config,
            seed_url,
            seed_host,
            context,
        })
    }

    /// The normalized seed URL
    pub fn seed_url(&self) -> &str {
        &self.seed_url
    }

    /// The host that bounds the crawl when external links are not allowed
    pub fn seed_host(&self) -> &str {
        &self.seed_host
    }

    /// Crawls until the frontier drains or the page budget is spent
    pub async fn run(&self) -> CrawlResult {
        self.run_until(std::future::pending::<()>()).await
    }

    /// Crawls until done or until `shutdown` resolves
    ///
    /// # Crawl Flow
    ///
    /// 1. Seed the frontier with the normalized seed at depth 0
    /// 2. While the page budget allows, hand ready URLs to idle workers
    /// 3. As each worker finishes, record its report and admit its links
    ///    (same host only, unless external links are allowed)
    /// 4. Stop when no work remains; on shutdown abort in-flight workers and
    ///    return the partial result flagged as interrupted
    pub async fn run_until<F>(&self, shutdown: F) -> CrawlResult
    where
        F: Future<Output = ()>,
    {
        let crawler_config = &self.config.crawler;
        let max_pages = crawler_config.max_pages;
        let concurrency = crawler_config.concurrency.max(1);

        tracing::info!(
            "Starting crawl of {} for \"{}\" ({} mode, depth {}, max {} pages)",
            self.seed_url,
            crawler_config.keyword,
            crawler_config.mode,
            crawler_config.depth,
            max_pages
        );

        let mut scheduler = Scheduler::new(crawler_config.clone());
        scheduler.seed(&self.seed_url, &self.seed_host);

        let mut result = CrawlResult::new();
        let mut workers: JoinSet<PageReport> = JoinSet::new();
        let mut completed = 0usize;
        let mut interrupted = false;
        let start_time = Instant::now();

        tokio::pin!(shutdown);

        loop {
            let mut wait = None;
            while workers.len() < concurrency && result.visited_count < max_pages {
                match scheduler.next_ready(Instant::now()) {
                    NextUrl::Ready(queued) => {
                        result.visited_count += 1;
                        tracing::debug!("Fetching {} (depth {})", queued.url, queued.depth);
                        let context = Arc::clone(&self.context);
                        workers.spawn(context.process(queued));
                    }
                    NextUrl::Wait(duration) => {
                        wait = Some(duration);
                        break;
                    }
                    NextUrl::Empty => break,
                }
            }

            if workers.is_empty() {
                let Some(duration) = wait.filter(|_| result.visited_count < max_pages) else {
                    break;
                };
                tokio::select! {
                    biased;
                    _ = &mut shutdown => {
                        interrupted = true;
                        break;
                    }
                    _ = tokio::time::sleep(duration) => continue,
                }
            }

            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    interrupted = true;
                    break;
                }
                joined = workers.join_next() => match joined {
                    Some(Ok(report)) => {
                        self.record(report, &mut scheduler, &mut result);
                        completed += 1;
                        if completed % PROGRESS_INTERVAL == 0 {
                            tracing::info!(
                                "Progress: {} pages done, {} in frontier, {} matches, {:.2} pages/sec",
                                completed,
                                scheduler.frontier_size(),
                                result.total_matches(),
                                completed as f64 / start_time.elapsed().as_secs_f64()
                            );
                        }
                    }
                    Some(Err(e)) => {
                        tracing::error!("Crawl worker failed: {}", e);
                        result.increment_error(ErrorKind::NetworkError);
                        completed += 1;
                    }
                    None => {}
                },
                _ = tokio::time::sleep(wait.unwrap_or_default()), if wait.is_some() => {}
            }
        }

        if interrupted {
            tracing::warn!(
                "Crawl interrupted with {} pages unfinished ({} in flight)",
                scheduler.active_count(),
                workers.len()
            );
            workers.shutdown().await;
        }

        for (host, requests) in scheduler.host_request_counts() {
            tracing::debug!("{} requests to {}", requests, host);
        }

        result.finish(interrupted);

        tracing::info!(
            "Crawl finished: {} pages visited of {} discovered, {} parsed, {} matches in {:?}",
            result.visited_count,
            scheduler.visited_size(),
            result.parsed_count,
            result.total_matches(),
            start_time.elapsed()
        );

        result
    }

    /// Applies a worker's report to the crawl result and the frontier
    fn record(&self, report: PageReport, scheduler: &mut Scheduler, result: &mut CrawlResult) {
        tracing::debug!(
            "{} -> {} ({} matches, {} links)",
            report.url,
            report.state,
            report.match_count,
            report.links.len()
        );

        scheduler.complete(&report.url, report.state);

        if report.parsed {
            result.parsed_count += 1;
        }

        if let Some(reason) = &report.blocked_reason {
            tracing::warn!("Blocked: {} ({})", report.url, reason);
            result.add_blocked(&report.url, reason);
        } else if let Some(kind) = report.state.error_kind() {
            result.increment_error(kind);
        }

        result.add_match(&report.url, report.match_count);

        if report.depth >= self.config.crawler.depth {
            return;
        }

        let allow_external = self.config.crawler.allow_external;
        let mut admitted = 0;
        for link in &report.links {
            if !allow_external && !is_same_host(link, &self.seed_host) {
                continue;
            }
            if scheduler.admit(link, report.depth + 1) {
                admitted += 1;
            }
        }
        tracing::trace!("Admitted {} links from {}", admitted, report.url);
    }
}
