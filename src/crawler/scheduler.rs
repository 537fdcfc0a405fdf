//! Scheduler for managing the crawl frontier and politeness
//!
//! This module handles:
//! - Breadth-first FIFO queue of URLs to crawl
//! - The visited set used for deduplication, with each URL's `PageState`
//! - The `max_pages` admission budget
//! - Per-host minimum spacing between request starts

use crate::config::CrawlerConfig;
use crate::state::{DomainState, PageState};
use crate::url::extract_host;
use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

/// A URL queued for fetching
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedUrl {
    /// The normalized URL to fetch
    pub url: String,

    /// Lowercase host of this URL
    pub host: String,

    /// Link distance from the seed (seed = 0)
    pub depth: u32,
}

/// What the frontier can hand out right now
#[derive(Debug, PartialEq, Eq)]
pub enum NextUrl {
    /// A URL whose host may be requested now; the request is already recorded
    Ready(QueuedUrl),

    /// Every queued host is cooling down; retry after this long
    Wait(Duration),

    /// Nothing left to crawl
    Empty,
}

/// Scheduler manages the frontier queue and politeness
///
/// The scheduler is owned by the crawl coordinator alone, so the
/// visited-set check-and-insert and the page budget never race.
pub struct Scheduler {
    /// Per-host politeness state
    domain_states: HashMap<String, DomainState>,

    /// FIFO queue of URLs to fetch
    frontier: VecDeque<QueuedUrl>,

    /// Every URL ever enqueued, including the seed, and where it stands
    pages: HashMap<String, PageState>,

    /// Crawler configuration
    config: CrawlerConfig,
}

impl Scheduler {
    /// Creates an empty scheduler
    pub fn new(config: CrawlerConfig) -> Self {
        Self {
            domain_states: HashMap::new(),
            frontier: VecDeque::new(),
            pages: HashMap::new(),
            config,
        }
    }

    /// Enqueues the seed at depth 0 and marks it visited
    pub fn seed(&mut self, url: &str, host: &str) {
        self.pages.insert(url.to_string(), PageState::Pending);
        self.frontier.push_back(QueuedUrl {
            url: url.to_string(),
            host: host.to_string(),
            depth: 0,
        });
    }

    /// Admits a discovered link at `depth`
    ///
    /// The link is enqueued only if it has a host, has never been seen and
    /// the visited set is still below `max_pages`.
    ///
    /// # Returns
    ///
    /// `true` if the link was enqueued
    pub fn admit(&mut self, url: &str, depth: u32) -> bool {
        if self.pages.contains_key(url) || self.pages.len() >= self.config.max_pages {
            return false;
        }
        let Some(host) = extract_host(url) else {
            return false;
        };

        self.pages.insert(url.to_string(), PageState::Pending);
        self.frontier.push_back(QueuedUrl {
            url: url.to_string(),
            host,
            depth,
        });
        true
    }

    /// Takes the oldest queued URL whose host is ready at `now`
    ///
    /// The request is recorded against the host and the URL is marked
    /// `Fetching` before returning, so the next call already sees the host as
    /// busy.
    pub fn next_ready(&mut self, now: Instant) -> NextUrl {
        if self.frontier.is_empty() {
            return NextUrl::Empty;
        }

        let position = self.frontier.iter().position(|queued| {
            self.domain_states
                .get(&queued.host)
                .map_or(true, |state| state.can_request(&self.config, now))
        });

        match position.and_then(|index| self.frontier.remove(index)) {
            Some(queued) => {
                self.record_request(&queued.host, now);
                self.pages.insert(queued.url.clone(), PageState::Fetching);
                tracing::trace!("Dequeued {} (depth {})", queued.url, queued.depth);
                NextUrl::Ready(queued)
            }
            None => NextUrl::Wait(self.calculate_minimum_wait_time(now)),
        }
    }

    /// Shortest cool-down among the hosts still in the frontier
    fn calculate_minimum_wait_time(&self, now: Instant) -> Duration {
        self.frontier
            .iter()
            .filter_map(|queued| self.domain_states.get(&queued.host))
            .filter_map(|state| state.time_until_next_request(&self.config, now))
            .min()
            .unwrap_or(Duration::ZERO)
    }

    /// Records that a request was started against a host
    fn record_request(&mut self, host: &str, now: Instant) {
        self.domain_states
            .entry(host.to_string())
            .or_insert_with(DomainState::new)
            .record_request(now);
    }

    /// Records the terminal classification of a fetched URL
    pub fn complete(&mut self, url: &str, state: PageState) {
        debug_assert!(state.is_terminal(), "{} is not a terminal state", state);
        if let Some(current) = self.pages.get_mut(url) {
            *current = state;
        }
    }

    /// Number of enqueued URLs not yet classified (queued or in flight)
    pub fn active_count(&self) -> usize {
        self.pages.values().filter(|state| state.is_active()).count()
    }

    /// Returns the number of URLs in the frontier
    pub fn frontier_size(&self) -> usize {
        self.frontier.len()
    }

    /// Returns the number of URLs ever enqueued
    pub fn visited_size(&self) -> usize {
        self.pages.len()
    }

    /// Returns true if the URL was already enqueued
    pub fn is_visited(&self, url: &str) -> bool {
        self.pages.contains_key(url)
    }

    /// Requests started per host, sorted by host
    pub fn host_request_counts(&self) -> Vec<(&str, u32)> {
        let mut counts: Vec<(&str, u32)> = self
            .domain_states
            .iter()
            .map(|(host, state)| (host.as_str(), state.request_count))
            .collect();
        counts.sort_unstable();
        counts
    }
}
