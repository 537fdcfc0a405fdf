use once_cell::sync::Lazy;
use regex::Regex;
use url::{ParseError, Url};

/// Matches an explicit `scheme://` prefix
static SCHEME_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]*://").expect("scheme pattern is valid"));

/// Matches runs of two or more slashes in a path
static SLASH_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"/{2,}").expect("slash pattern is valid"));

/// Normalizes a URL into WebGrep's canonical, deduplication-safe form
///
/// # Normalization Steps
///
/// 1. Protocol-relative input (`//host/...`) takes the base's scheme
///    (`https` if the base is https, `http` otherwise)
/// 2. Input without a `scheme://` prefix is resolved against `base`; when
///    there is no usable base it is prefixed with `http://`
/// 3. Host-less results normalize to the empty string
/// 4. Scheme and host are lowercased
/// 5. Empty path becomes `/`; runs of slashes collapse to one
/// 6. The fragment is dropped
/// 7. The port is kept only when it differs from the scheme default
/// 8. The query string is kept as-is
///
/// Never fails: the empty string means "unusable, discard". Input that still
/// cannot be parsed after the prefixing steps (for any reason other than a
/// missing host) is returned in its best-effort transformed form.
///
/// # Examples
///
/// ```
/// use webgrep::url::normalize_url;
///
/// assert_eq!(normalize_url("example.com", None), "http://example.com/");
/// assert_eq!(
///     normalize_url("/a/c", Some("http://example.com/a/b")),
///     "http://example.com/a/c"
/// );
/// assert_eq!(normalize_url("http://", None), "");
/// ```
pub fn normalize_url(raw: &str, base: Option<&str>) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }

    let base = base.map(str::trim).filter(|b| !b.is_empty());

    let mut candidate = if raw.starts_with("//") {
        let scheme = match base {
            Some(b) if b.starts_with("https") => "https:",
            _ => "http:",
        };
        format!("{}{}", scheme, raw)
    } else {
        raw.to_string()
    };

    if !SCHEME_PREFIX.is_match(&candidate) {
        candidate = match base.and_then(|b| resolve_against(b, &candidate)) {
            Some(resolved) => resolved,
            None => with_http_prefix(candidate),
        };
    }

    match Url::parse(&candidate) {
        Ok(url) => canonical_form(&url).unwrap_or_default(),
        Err(ParseError::EmptyHost) => String::new(),
        Err(e) => {
            tracing::trace!("Keeping unparseable URL {} as-is: {}", candidate, e);
            candidate
        }
    }
}

/// Resolves a relative reference against a base URL
fn resolve_against(base: &str, reference: &str) -> Option<String> {
    let base = Url::parse(base).ok()?;
    base.join(reference).ok().map(String::from)
}

fn with_http_prefix(candidate: String) -> String {
    let lower = candidate.to_ascii_lowercase();
    if lower.starts_with("http:") || lower.starts_with("https:") {
        candidate
    } else {
        format!("http://{}", candidate)
    }
}

/// Reassembles `scheme://host[:port]path[?query]` from a parsed URL
fn canonical_form(url: &Url) -> Option<String> {
    let host = url.host_str().filter(|h| !h.is_empty())?.to_lowercase();
    let scheme = url.scheme().to_lowercase();

    let mut normalized = format!("{}://{}", scheme, host);

    // `Url::port` is None when the port equals the scheme default
    if let Some(port) = url.port() {
        normalized.push_str(&format!(":{}", port));
    }

    let path = match url.path() {
        "" => "/",
        p => p,
    };
    normalized.push_str(&SLASH_RUN.replace_all(path, "/"));

    if let Some(query) = url.query() {
        normalized.push('?');
        normalized.push_str(query);
    }

    Some(normalized)
}
