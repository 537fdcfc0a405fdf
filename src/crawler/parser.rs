//! HTML parser for extracting links and searchable text
//!
//! This module handles parsing HTML content to extract:
//! - Visible text (title, body, description and keywords meta tags)
//! - Links to follow (from `<a>` tags, plus a raw-markup fallback scan)
//! - The document base URI (`<base href>`)

use crate::url::{normalize_url, LinkFilter};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Elements whose contents are never rendered as text
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "template", "noscript"];

/// Elements that never hold readable text, even when scripting is off
const NON_TEXT_ELEMENTS: &[&str] = &["script", "style", "template"];

/// Elements that separate words when rendered
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header",
    "hr", "li", "main", "nav", "ol", "option", "p", "pre", "section", "table", "td", "th",
    "title", "tr", "ul",
];

/// Double-quoted `href` attributes anywhere in raw markup
static RAW_HREF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)href\s*=\s*"([^"]+)""#).expect("href pattern is valid")
});

/// A parsed HTML document
///
/// Wraps `scraper::Html`, which is not `Send`: build and drop it within one
/// synchronous section, never across an `.await`.
pub struct HtmlPage {
    document: Html,
}

impl HtmlPage {
    /// Parses a full HTML document; malformed markup is repaired, never rejected
    pub fn parse(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
        }
    }

    /// The page title, whitespace-collapsed
    pub fn title(&self) -> Option<String> {
        let selector = Selector::parse("title").ok()?;

        self.document
            .select(&selector)
            .next()
            .map(|element| collapse_whitespace(&element.text().collect::<String>()))
            .filter(|s| !s.is_empty())
    }

    /// Visible text of `<body>`, or None if the document has no body element
    pub fn body_text(&self) -> Option<String> {
        let selector = Selector::parse("body").ok()?;
        self.document.select(&selector).next().map(visible_text)
    }

    /// Visible text of the whole document
    pub fn document_text(&self) -> String {
        visible_text(self.document.root_element())
    }

    /// Text of the whole document including `<noscript>` fallbacks
    ///
    /// Interstitials put their instructions in `<noscript>`, so this is the
    /// text to inspect when classifying a page rather than matching it.
    pub fn full_text(&self) -> String {
        text_without(self.document.root_element(), NON_TEXT_ELEMENTS)
    }

    /// `content` of the first `<meta name=...>` with a matching name
    pub fn meta_content(&self, name: &str) -> Option<String> {
        let selector = Selector::parse("meta[name][content]").ok()?;

        self.document
            .select(&selector)
            .find(|element| {
                element
                    .value()
                    .attr("name")
                    .is_some_and(|n| n.eq_ignore_ascii_case(name))
            })
            .and_then(|element| element.value().attr("content"))
            .map(|content| content.trim().to_string())
    }

    /// `href` of the first `<base>` element
    pub fn base_href(&self) -> Option<String> {
        let selector = Selector::parse("base[href]").ok()?;

        self.document
            .select(&selector)
            .next()
            .and_then(|element| element.value().attr("href"))
            .map(|href| href.trim().to_string())
            .filter(|href| !href.is_empty())
    }

    /// Raw `href` values of every `<a href>` in document order
    pub fn anchor_hrefs(&self) -> Vec<String> {
        let Ok(selector) = Selector::parse("a[href]") else {
            return Vec::new();
        };

        self.document
            .select(&selector)
            .filter_map(|element| element.value().attr("href"))
            .map(|href| href.trim().to_string())
            .collect()
    }
}

/// Extracts the links worth following from a parsed page
///
/// # Link Extraction Rules
///
/// 1. Every `<a href>` is resolved against the document base URI (the
///    `<base href>` resolved against `base_url`, else `base_url` itself)
/// 2. If fewer than `max_links` were found, the raw body is scanned for
///    double-quoted `href="..."` attributes that the parser did not surface
///
/// Each candidate is normalized; it is kept only if it is non-empty,
/// http(s), not ignored by `filter` and not already collected. Order is
/// discovery order and the result never exceeds `max_links` entries.
///
/// # Arguments
///
/// * `page` - The parsed page
/// * `raw_body` - The undecoded response body
/// * `base_url` - The URL the page was fetched from (after redirects)
/// * `filter` - Denylist for assets, trackers and taxonomy pages
/// * `max_links` - Per-page cap
pub fn extract_links(
    page: &HtmlPage,
    raw_body: &[u8],
    base_url: &str,
    filter: &LinkFilter,
    max_links: usize,
) -> Vec<String> {
    let page_url = Url::parse(base_url).ok();
    let document_base = match (&page_url, page.base_href()) {
        (Some(url), Some(href)) => url.join(&href).ok().or_else(|| page_url.clone()),
        (Some(_), None) => page_url.clone(),
        (None, _) => None,
    };

    let mut collector = LinkCollector::new(filter, max_links);

    for href in page.anchor_hrefs() {
        if collector.is_full() {
            break;
        }
        let absolute = document_base
            .as_ref()
            .and_then(|base| base.join(&href).ok())
            .map(String::from)
            .unwrap_or(href);
        collector.offer(&normalize_url(&absolute, Some(base_url)));
    }

    if !collector.is_full() {
        let resolve_base = document_base
            .as_ref()
            .map(|base| base.as_str())
            .unwrap_or(base_url);
        let raw = String::from_utf8_lossy(raw_body);
        for capture in RAW_HREF.captures_iter(&raw) {
            if collector.is_full() {
                break;
            }
            collector.offer(&normalize_url(&capture[1], Some(resolve_base)));
        }
    }

    collector.links
}

struct LinkCollector<'a> {
    filter: &'a LinkFilter,
    max_links: usize,
    seen: HashSet<String>,
    links: Vec<String>,
}

impl<'a> LinkCollector<'a> {
    fn new(filter: &'a LinkFilter, max_links: usize) -> Self {
        Self {
            filter,
            max_links,
            seen: HashSet::new(),
            links: Vec::new(),
        }
    }

    fn is_full(&self) -> bool {
        self.links.len() >= self.max_links
    }

    fn offer(&mut self, normalized: &str) {
        if normalized.is_empty() {
            return;
        }
        if !(normalized.starts_with("http://") || normalized.starts_with("https://")) {
            return;
        }
        if self.filter.is_ignored(normalized) {
            return;
        }
        if self.seen.insert(normalized.to_string()) {
            self.links.push(normalized.to_string());
        }
    }
}

/// Rendered text of an element, skipping hidden subtrees
fn visible_text(root: ElementRef<'_>) -> String {
    text_without(root, HIDDEN_ELEMENTS)
}

fn text_without(root: ElementRef<'_>, skipped: &[&str]) -> String {
    let mut raw = String::new();
    collect_text(root, skipped, &mut raw);
    collapse_whitespace(&raw)
}

fn collect_text(element: ElementRef<'_>, skipped: &[&str], out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child_element) = ElementRef::wrap(child) {
            let name = child_element.value().name();
            if skipped.contains(&name) {
                continue;
            }
            let block = BLOCK_ELEMENTS.contains(&name);
            if block {
                out.push(' ');
            }
            collect_text(child_element, skipped, out);
            if block {
                out.push(' ');
            }
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
