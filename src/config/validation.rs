use crate::config::types::{Config, CrawlerConfig, FilterConfig, HttpConfig};
use crate::url::{extract_host, normalize_url};
use crate::{ConfigError, ConfigResult};

/// Upper bound on simultaneous fetches
const MAX_CONCURRENCY: usize = 64;

/// Validates the entire configuration
///
/// Run this after CLI overrides have been merged into the loaded file.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_crawler_config(&config.crawler)?;
    validate_http_config(&config.http)?;
    validate_filter_config(&config.filter)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> ConfigResult<()> {
    if config.url.trim().is_empty() {
        return Err(ConfigError::Validation(
            "URL is required (-u, --url)".to_string(),
        ));
    }

    if config.keyword.is_empty() {
        return Err(ConfigError::Validation(
            "Keyword is required (-k, --keyword)".to_string(),
        ));
    }

    validate_seed_url(&config.url)?;

    // depth >= 0 and timeout_ms >= 0 always hold for unsigned fields

    if config.max_pages == 0 {
        return Err(ConfigError::Validation(
            "Max pages must be greater than zero".to_string(),
        ));
    }

    if config.max_bytes == 0 {
        return Err(ConfigError::Validation(
            "Max bytes must be greater than zero".to_string(),
        ));
    }

    if config.concurrency < 1 || config.concurrency > MAX_CONCURRENCY {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and {}, got {}",
            MAX_CONCURRENCY, config.concurrency
        )));
    }

    if config.max_links_per_page == 0 {
        return Err(ConfigError::Validation(
            "max_links_per_page must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

/// Checks that the seed normalizes to an http(s) URL with a host
fn validate_seed_url(raw: &str) -> ConfigResult<()> {
    let normalized = normalize_url(raw, None);
    if normalized.is_empty() {
        return Err(ConfigError::InvalidUrl(format!(
            "Seed URL '{}' has no host",
            raw
        )));
    }

    if !(normalized.starts_with("http://") || normalized.starts_with("https://")) {
        return Err(ConfigError::InvalidUrl(format!(
            "Seed URL '{}' must use http or https",
            raw
        )));
    }

    if extract_host(&normalized).is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "Seed URL '{}' cannot be parsed",
            raw
        )));
    }

    Ok(())
}

/// Validates HTTP client configuration
fn validate_http_config(config: &HttpConfig) -> ConfigResult<()> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates the link denylist
fn validate_filter_config(config: &FilterConfig) -> ConfigResult<()> {
    for ext in config
        .ignored_extensions
        .iter()
        .chain(config.kept_extensions.iter())
    {
        if !ext.starts_with('.') || ext.len() < 2 {
            return Err(ConfigError::Validation(format!(
                "Extension '{}' must start with '.' and name a suffix",
                ext
            )));
        }
    }

    if config
        .ignored_substrings
        .iter()
        .chain(config.extra_ignored_substrings.iter())
        .any(|s| s.is_empty())
    {
        return Err(ConfigError::Validation(
            "Ignored substrings cannot be empty".to_string(),
        ));
    }

    Ok(())
}
