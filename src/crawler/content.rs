//! Content-type dispatch and text extraction
//!
//! Every fetched body is classified once into a [`ContentKind`]. HTML goes
//! through the DOM ([`HtmlPage`]); everything else is handed to a
//! [`DocumentExtractor`]. Extraction never aborts a page: when a structured
//! extractor fails, the raw bytes are decoded leniently and the result is
//! flagged as degraded.

use crate::crawler::parser::HtmlPage;
use std::borrow::Cow;
use thiserror::Error;

/// How a response body will be processed, decided from its `Content-Type`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// `text/html` or `application/xhtml+xml`: parsed, links followed
    Html,
    /// Anything else, including a missing header: sent to the extractor
    Binary,
    /// Image, audio, video and font media: never processed
    Unsupported,
}

impl ContentKind {
    /// Classifies a `Content-Type` header value (parameters are ignored)
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        let Some(value) = content_type else {
            return Self::Binary;
        };
        let mime = essence(value);

        if mime == "text/html" || mime == "application/xhtml+xml" {
            Self::Html
        } else if ["image/", "audio/", "video/", "font/"]
            .iter()
            .any(|prefix| mime.starts_with(prefix))
        {
            Self::Unsupported
        } else {
            Self::Binary
        }
    }
}

/// Errors raised by document extractors
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unsupported document type: {0}")]
    Unsupported(String),

    #[error("PDF extraction failed: {0}")]
    Pdf(String),
}

/// Turns a non-HTML document into plain text
///
/// `content_type` is a hint; `resource_name` (usually the URL) helps
/// detection when the hint is missing or generic.
pub trait DocumentExtractor: Send + Sync {
    fn extract(
        &self,
        body: &[u8],
        content_type: Option<&str>,
        resource_name: &str,
    ) -> Result<String, ExtractError>;
}

/// Extractor for PDF and plain-text documents
///
/// # Detection
///
/// | Signal | Treated as |
/// |--------|------------|
/// | `application/pdf`, `%PDF-` magic, `.pdf` name | PDF |
/// | `text/*`, `application/json`, `application/xml`, `*+xml`, `.txt` name | text |
/// | valid UTF-8 without NUL bytes | text |
/// | anything else | [`ExtractError::Unsupported`] |
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinExtractor;

impl DocumentExtractor for BuiltinExtractor {
    fn extract(
        &self,
        body: &[u8],
        content_type: Option<&str>,
        resource_name: &str,
    ) -> Result<String, ExtractError> {
        let mime = content_type.map(essence).unwrap_or_default();
        let name = resource_name.to_lowercase();
        let name = name.split(['?', '#']).next().unwrap_or_default();

        if mime == "application/pdf" || body.starts_with(b"%PDF-") || name.ends_with(".pdf") {
            return extract_pdf(body);
        }

        let textual_mime = mime.starts_with("text/")
            || mime == "application/json"
            || mime == "application/xml"
            || mime.ends_with("+xml");
        if textual_mime || name.ends_with(".txt") {
            return Ok(String::from_utf8_lossy(body).into_owned());
        }

        match std::str::from_utf8(body) {
            Ok(text) if !text.contains('\0') => Ok(text.to_string()),
            _ => Err(ExtractError::Unsupported(if mime.is_empty() {
                "unknown".to_string()
            } else {
                mime
            })),
        }
    }
}

fn extract_pdf(body: &[u8]) -> Result<String, ExtractError> {
    // pdf-extract panics on some malformed inputs
    match std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(body)) {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(ExtractError::Pdf(e.to_string())),
        Err(_) => Err(ExtractError::Pdf("extractor panicked".to_string())),
    }
}

/// Searchable text produced for one page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extracted {
    pub text: String,

    /// True when structured extraction failed and lenient decoding was used
    pub degraded: bool,
}

/// Decodes an HTML body, flagging it degraded if it is not valid UTF-8
pub fn decode_html(body: &[u8]) -> (Cow<'_, str>, bool) {
    match std::str::from_utf8(body) {
        Ok(text) => (Cow::Borrowed(text), false),
        Err(_) => (String::from_utf8_lossy(body), true),
    }
}

/// Searchable text of an HTML page
///
/// Title, visible body text (the whole document when there is no body),
/// then the description and keywords meta tags, joined by single spaces.
pub fn html_text(page: &HtmlPage) -> String {
    let body = page.body_text().unwrap_or_else(|| page.document_text());

    [
        page.title(),
        Some(body),
        page.meta_content("description"),
        page.meta_content("keywords"),
    ]
    .into_iter()
    .flatten()
    .filter(|part| !part.is_empty())
    .collect::<Vec<_>>()
    .join(" ")
}

/// Extracts searchable text according to the page's [`ContentKind`]
///
/// # Arguments
///
/// * `body` - Raw response body
/// * `kind` - Classification of the response
/// * `content_type` - Original `Content-Type` header, passed to the extractor
/// * `url` - Resource name for extractor detection
/// * `page` - The parsed page, for HTML responses
/// * `extractor` - Extractor for non-HTML documents
pub fn extract_text(
    body: &[u8],
    kind: ContentKind,
    content_type: Option<&str>,
    url: &str,
    page: Option<&HtmlPage>,
    extractor: &dyn DocumentExtractor,
) -> Extracted {
    match (kind, page) {
        (ContentKind::Html, Some(page)) => Extracted {
            text: html_text(page),
            degraded: false,
        },
        (ContentKind::Html, None) => {
            let (text, degraded) = decode_html(body);
            Extracted {
                text: text.into_owned(),
                degraded,
            }
        }
        (ContentKind::Binary, _) => extract_document(body, content_type, url, extractor),
        (ContentKind::Unsupported, _) => Extracted::default(),
    }
}

fn extract_document(
    body: &[u8],
    content_type: Option<&str>,
    url: &str,
    extractor: &dyn DocumentExtractor,
) -> Extracted {
    let attempt = extractor.extract(body, content_type, url).and_then(|text| {
        if text.trim().is_empty() && content_type.is_some() {
            extractor.extract(body, None, url)
        } else {
            Ok(text)
        }
    });

    match attempt {
        Ok(text) => Extracted {
            text,
            degraded: false,
        },
        Err(e) => {
            tracing::warn!("Falling back to raw text for {}: {}", url, e);
            Extracted {
                text: String::from_utf8_lossy(body).into_owned(),
                degraded: true,
            }
        }
    }
}

/// Lowercased MIME type without parameters
fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
}
