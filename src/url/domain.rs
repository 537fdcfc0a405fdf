use url::Url;

/// Extracts the lowercase host from a URL string
///
/// Returns None if the string does not parse or has no host.
///
/// # Examples
///
/// ```
/// use webgrep::url::extract_host;
///
/// assert_eq!(extract_host("https://EXAMPLE.COM/path"), Some("example.com".to_string()));
/// assert_eq!(extract_host("https://sub.example.com:8080/"), Some("sub.example.com".to_string()));
/// assert_eq!(extract_host("not a url"), None);
/// ```
pub fn extract_host(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()?
        .host_str()
        .filter(|h| !h.is_empty())
        .map(|h| h.to_lowercase())
}

/// Returns true if `url` points at `host` (case-insensitive)
///
/// Ports are ignored, and subdomains count as different hosts.
pub fn is_same_host(url: &str, host: &str) -> bool {
    extract_host(url).is_some_and(|h| h.eq_ignore_ascii_case(host))
}
