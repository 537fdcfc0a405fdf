use crate::config::FilterConfig;

/// Denylist deciding which discovered links are not worth fetching
///
/// This is a maintained list, not a classifier: letting some junk through
/// is acceptable, dropping a content link is not. Document-bearing
/// extensions are therefore checked first and always kept.
#[derive(Debug, Clone)]
pub struct LinkFilter {
    ignored_extensions: Vec<String>,
    kept_extensions: Vec<String>,
    ignored_substrings: Vec<String>,
}

impl LinkFilter {
    /// Builds a filter from configuration, lowercasing every entry
    pub fn new(config: &FilterConfig) -> Self {
        let lower = |items: &[String]| -> Vec<String> {
            items.iter().map(|s| s.to_lowercase()).collect()
        };

        let mut ignored_substrings = lower(&config.ignored_substrings);
        ignored_substrings.extend(lower(&config.extra_ignored_substrings));

        Self {
            ignored_extensions: lower(&config.ignored_extensions),
            kept_extensions: lower(&config.kept_extensions),
            ignored_substrings,
        }
    }

    /// Returns true if the link should not be enqueued
    ///
    /// Fragment and query are stripped before matching.
    pub fn is_ignored(&self, url: &str) -> bool {
        let lower = url.to_lowercase();
        let without_fragment = lower.split('#').next().unwrap_or_default();
        let target = without_fragment.split('?').next().unwrap_or_default();

        if self.kept_extensions.iter().any(|ext| target.ends_with(ext)) {
            return false;
        }

        self.ignored_extensions
            .iter()
            .any(|ext| target.ends_with(ext))
            || self
                .ignored_substrings
                .iter()
                .any(|needle| target.contains(needle))
    }
}

impl Default for LinkFilter {
    fn default() -> Self {
        Self::new(&FilterConfig::default())
    }
}
