//! Keyword matching engine
//!
//! Counts keyword occurrences in extracted page text under one of three
//! [`MatchMode`]s:
//!
//! - `exact`: case-sensitive literal substring count
//! - `default`: case-insensitive literal count, falling back to a folded
//!   (accent- and punctuation-insensitive) count when nothing matched
//! - `fuzzy`: folded count, falling back to counting words within a small
//!   edit distance of the folded keyword
//!
//! All counts are non-overlapping and scan left to right.

mod fold;
mod levenshtein;

pub use fold::{count_occurrences, simplify, simplify_with_spaces};
pub use levenshtein::levenshtein;

use crate::config::MatchMode;
use regex::{Regex, RegexBuilder};

/// Folded keywords up to this many characters tolerate one edit; longer
/// keywords tolerate two
const SHORT_KEYWORD_LEN: usize = 4;

/// A keyword prepared for repeated counting under one mode
///
/// The folded keyword and the case-insensitive pattern are built once, so a
/// crawl can share one `Matcher` across every page it visits.
#[derive(Debug, Clone)]
pub struct Matcher {
    keyword: String,
    mode: MatchMode,
    folded_keyword: String,
    insensitive: Option<Regex>,
}

impl Matcher {
    pub fn new(keyword: &str, mode: MatchMode) -> Self {
        let insensitive = match mode {
            MatchMode::Default if !keyword.is_empty() => {
                RegexBuilder::new(&regex::escape(keyword))
                    .case_insensitive(true)
                    .unicode(true)
                    .build()
                    .map_err(|e| {
                        tracing::warn!("Falling back to lowercase matching for keyword: {}", e)
                    })
                    .ok()
            }
            _ => None,
        };

        Self {
            keyword: keyword.to_string(),
            mode,
            folded_keyword: simplify(keyword),
            insensitive,
        }
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    /// Counts keyword occurrences in `text`; 0 if either is empty
    pub fn count(&self, text: &str) -> usize {
        if text.is_empty() || self.keyword.is_empty() {
            return 0;
        }

        match self.mode {
            MatchMode::Exact => count_occurrences(text, &self.keyword),
            MatchMode::Default => match self.count_case_insensitive(text) {
                0 => self.count_folded(text),
                n => n,
            },
            MatchMode::Fuzzy => match self.count_folded(text) {
                0 => self.count_similar_words(text),
                n => n,
            },
        }
    }

    fn count_case_insensitive(&self, text: &str) -> usize {
        let text = text.replace('\u{a0}', " ");
        match &self.insensitive {
            Some(pattern) => pattern.find_iter(&text).count(),
            None => count_occurrences(&text.to_lowercase(), &self.keyword.to_lowercase()),
        }
    }

    fn count_folded(&self, text: &str) -> usize {
        if self.folded_keyword.is_empty() {
            return 0;
        }
        count_occurrences(&simplify(text), &self.folded_keyword)
    }

    fn count_similar_words(&self, text: &str) -> usize {
        if self.folded_keyword.is_empty() {
            return 0;
        }

        let threshold = if self.folded_keyword.chars().count() <= SHORT_KEYWORD_LEN {
            1
        } else {
            2
        };

        simplify_with_spaces(text)
            .split_whitespace()
            .filter(|word| levenshtein(word, &self.folded_keyword) <= threshold)
            .count()
    }
}

/// Counts keyword occurrences in `text` under `mode`
///
/// # Examples
///
/// ```
/// use webgrep::config::MatchMode;
/// use webgrep::matcher::count_matches;
///
/// assert_eq!(count_matches("Hello world, hello!", "hello", MatchMode::Default), 2);
/// assert_eq!(count_matches("Hello world, hello!", "hello", MatchMode::Exact), 1);
/// assert_eq!(count_matches("Café", "cafe", MatchMode::Fuzzy), 1);
/// ```
pub fn count_matches(text: &str, keyword: &str, mode: MatchMode) -> usize {
    Matcher::new(keyword, mode).count(text)
}
