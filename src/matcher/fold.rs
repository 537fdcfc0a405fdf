//! Diacritic folding
//!
//! Both folds decompose to NFD, drop combining marks and lowercase before
//! filtering, so `Café`, `CAFE` and `cafe` all fold to `cafe`.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Folds text down to `[a-z0-9]` only
///
/// # Examples
///
/// ```
/// use webgrep::matcher::simplify;
///
/// assert_eq!(simplify("Café"), "cafe");
/// assert_eq!(simplify("Hello-World_123!"), "helloworld123");
/// ```
pub fn simplify(input: &str) -> String {
    strip_marks_lowercase(input)
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

/// Folds text like [`simplify`], but maps every other character to a space
/// so word boundaries survive
pub fn simplify_with_spaces(input: &str) -> String {
    strip_marks_lowercase(input)
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect()
}

fn strip_marks_lowercase(input: &str) -> impl Iterator<Item = char> + '_ {
    input
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
}

/// Counts non-overlapping occurrences of `needle` in `haystack`, scanning
/// left to right and resuming after each match
pub fn count_occurrences(haystack: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }
    haystack.matches(needle).count()
}
