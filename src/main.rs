//! WebGrep main entry point
//!
//! This is the command-line interface for the WebGrep keyword crawler.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use webgrep::config::{load_config_with_hash, validate, Config, MatchMode, OutputFormat};
use webgrep::output::render_report;
use webgrep::{ConfigError, Crawler, WebgrepError};

/// WebGrep: a bounded keyword crawler
///
/// WebGrep crawls a site breadth-first from a seed URL, extracts the text of
/// every HTML page and document it reaches, and reports where a keyword
/// occurs. Matching is exact, case/accent-insensitive (default) or fuzzy.
#[derive(Parser, Debug)]
#[command(name = "webgrep")]
#[command(version = "1.0.0")]
#[command(about = "A bounded web crawler and keyword searcher", long_about = None)]
struct Cli {
    /// The starting URL
    #[arg(short, long)]
    url: Option<String>,

    /// The keyword to search for
    #[arg(short, long)]
    keyword: Option<String>,

    /// Maximum crawl depth [default: 1]
    #[arg(short, long)]
    depth: Option<u32>,

    /// Match mode: default, exact or fuzzy
    #[arg(short, long)]
    mode: Option<MatchMode>,

    /// Maximum number of pages to crawl [default: 5000]
    #[arg(short = 'p', long)]
    max_pages: Option<usize>,

    /// Maximum body size in bytes [default: 10 MiB]
    #[arg(short = 'b', long)]
    max_bytes: Option<u64>,

    /// Request timeout in milliseconds, 0 for none [default: 20000]
    #[arg(short, long)]
    timeout_ms: Option<u64>,

    /// Follow links to other hosts
    #[arg(short = 'e', long)]
    allow_external: bool,

    /// Trust all TLS certificates (dangerous)
    #[arg(short, long)]
    insecure: bool,

    /// Output format: text or json
    #[arg(short, long)]
    output: Option<OutputFormat>,

    /// Number of pages fetched concurrently [default: 1]
    #[arg(short, long)]
    concurrency: Option<usize>,

    /// Minimum delay between requests to the same host [default: 100]
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Maximum links followed per page [default: 5000]
    #[arg(long)]
    max_links_per_page: Option<usize>,

    /// Path to a TOML configuration file; flags override its values
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    /// Overrides configuration values with the flags that were given
    fn apply_to(&self, config: &mut Config) {
        let crawler = &mut config.crawler;
        if let Some(url) = &self.url {
            crawler.url = url.clone();
        }
        if let Some(keyword) = &self.keyword {
            crawler.keyword = keyword.clone();
        }
        if let Some(depth) = self.depth {
            crawler.depth = depth;
        }
        if let Some(mode) = self.mode {
            crawler.mode = mode;
        }
        if let Some(max_pages) = self.max_pages {
            crawler.max_pages = max_pages;
        }
        if let Some(max_bytes) = self.max_bytes {
            crawler.max_bytes = max_bytes;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            crawler.timeout_ms = timeout_ms;
        }
        if let Some(concurrency) = self.concurrency {
            crawler.concurrency = concurrency;
        }
        if let Some(delay_ms) = self.delay_ms {
            crawler.delay_ms = delay_ms;
        }
        if let Some(max_links) = self.max_links_per_page {
            crawler.max_links_per_page = max_links;
        }
        if self.allow_external {
            crawler.allow_external = true;
        }
        if self.insecure {
            config.http.insecure_tls = true;
        }
        if let Some(format) = self.output {
            config.output.format = format;
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let exit_code = match run(cli).await {
        Ok(()) => 0,
        Err(e) if is_config_error(&e) => {
            eprintln!("Configuration Error: {:#}", e);
            eprintln!("Use -h or --help for usage information.");
            1
        }
        Err(e) => {
            eprintln!("Fatal Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr so the report on stdout stays machine-readable.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("webgrep=warn"),
            1 => EnvFilter::new("webgrep=info,warn"),
            2 => EnvFilter::new("webgrep=debug,info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads configuration, crawls and prints the report
async fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("cannot load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    cli.apply_to(&mut config);
    validate(&config)?;

    let query = config.crawler.clone();
    let format = config.output.format;

    let crawler = Crawler::new(config)?;
    let result = crawler.run_until(shutdown_signal()).await;

    let report = render_report(&result, &query, format).context("cannot render report")?;
    println!("{}", report.trim_end());

    Ok(())
}

/// Resolves on Ctrl-C; never resolves if the handler cannot be installed
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::warn!("Received Ctrl-C; stopping crawl"),
        Err(e) => {
            tracing::error!("Cannot listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

/// Returns true for errors caused by the user's configuration or arguments
fn is_config_error(error: &anyhow::Error) -> bool {
    error.downcast_ref::<ConfigError>().is_some()
        || matches!(
            error.downcast_ref::<WebgrepError>(),
            Some(WebgrepError::Config(_)) | Some(WebgrepError::InvalidSeed { .. })
        )
}
