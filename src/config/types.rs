use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default per-response byte budget (10 MiB)
pub const DEFAULT_MAX_BYTES: u64 = 10 * 1024 * 1024;

/// Main configuration structure for WebGrep
///
/// Built once (from defaults, an optional TOML file and CLI overrides) and
/// handed to the crawler by value; nothing mutates it afterwards.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub http: HttpConfig,
    pub filter: FilterConfig,
    pub output: OutputConfig,
}

/// How keyword occurrences are counted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Case-insensitive, falling back to accent/punctuation-insensitive
    #[default]
    Default,
    /// Case-sensitive literal substring
    Exact,
    /// Folded substring, falling back to per-word edit distance
    Fuzzy,
}

impl MatchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Exact => "exact",
            Self::Fuzzy => "fuzzy",
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "exact" => Ok(Self::Exact),
            "fuzzy" => Ok(Self::Fuzzy),
            other => Err(format!(
                "Invalid mode: {}. Use default, exact, or fuzzy.",
                other
            )),
        }
    }
}

/// Report rendering format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!(
                "Invalid output format: {}. Use text or json.",
                other
            )),
        }
    }
}

/// Crawl scope and budget configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Seed URL; bare hosts such as `example.com` are accepted
    pub url: String,

    /// Keyword to count on every visited page
    pub keyword: String,

    /// Maximum link depth followed from the seed (seed is depth 0)
    pub depth: u32,

    /// Matching policy
    pub mode: MatchMode,

    /// Maximum number of pages attempted in one run
    pub max_pages: usize,

    /// Maximum response body size in bytes
    pub max_bytes: u64,

    /// Per-request timeout in milliseconds (0 disables the timeout)
    pub timeout_ms: u64,

    /// Follow links to hosts other than the seed host
    pub allow_external: bool,

    /// Minimum spacing between requests to the same host (milliseconds)
    pub delay_ms: u64,

    /// Maximum number of pages fetched at the same time
    pub concurrency: usize,

    /// Maximum number of links kept from a single page
    pub max_links_per_page: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            keyword: String::new(),
            depth: 1,
            mode: MatchMode::Default,
            max_pages: 5000,
            max_bytes: DEFAULT_MAX_BYTES,
            timeout_ms: 20_000,
            allow_external: false,
            delay_ms: 100,
            concurrency: 1,
            max_links_per_page: 5000,
        }
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct HttpConfig {
    pub user_agent: String,
    pub accept: String,
    pub accept_language: String,

    /// Trust any TLS certificate (dangerous)
    pub insecure_tls: bool,

    /// Maximum number of redirects followed per request
    pub max_redirects: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36".to_string(),
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7".to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
            insecure_tls: false,
            max_redirects: 10,
        }
    }
}

/// Link denylist configuration
///
/// `ignored-extensions`, `kept-extensions` and `ignored-substrings` replace
/// the built-in lists; `extra-ignored-substrings` is appended to them.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FilterConfig {
    pub ignored_extensions: Vec<String>,
    pub kept_extensions: Vec<String>,
    pub ignored_substrings: Vec<String>,
    pub extra_ignored_substrings: Vec<String>,
}

const IGNORED_EXTENSIONS: &[&str] = &[
    ".css", ".js", ".png", ".jpg", ".jpeg", ".gif", ".svg", ".ico", ".woff", ".woff2", ".ttf",
    ".otf", ".mp3", ".mp4", ".wav", ".avi", ".mov", ".wmv", ".zip", ".rar", ".7z", ".tar.gz",
];

const KEPT_EXTENSIONS: &[&str] = &[".pdf", ".doc", ".docx", ".txt"];

const IGNORED_SUBSTRINGS: &[&str] = &[
    "googleads",
    "doubleclick",
    "facebook.com/sharer",
    "twitter.com/intent/tweet",
    "linkedin.com/share",
    "pinterest.com/pin",
    "/tag/",
    "/tags/",
    "/author/",
];

fn to_owned_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            ignored_extensions: to_owned_list(IGNORED_EXTENSIONS),
            kept_extensions: to_owned_list(KEPT_EXTENSIONS),
            ignored_substrings: to_owned_list(IGNORED_SUBSTRINGS),
            extra_ignored_substrings: Vec::new(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
}
