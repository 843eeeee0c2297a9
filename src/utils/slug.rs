//! Slug normalization and format validation.

use regex::Regex;
use std::sync::LazyLock;

/// Lowercase alphanumeric start, then up to 63 of `[a-z0-9_-]`.
static SLUG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9][a-z0-9_-]{0,63}$").expect("slug pattern is a valid regex")
});

/// Trims and lowercases a raw slug from the URL path.
pub fn normalize_slug(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Returns true if an already-normalized slug has a valid format.
pub fn is_valid_slug(slug: &str) -> bool {
    SLUG_PATTERN.is_match(slug)
}

/// Normalizes and validates in one step.
///
/// Returns `None` when the slug can never match a record.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(parse_slug("  Docs ").as_deref(), Some("docs"));
/// assert_eq!(parse_slug("-docs"), None);
/// ```
pub fn parse_slug(raw: &str) -> Option<String> {
    let slug = normalize_slug(raw);
    is_valid_slug(&slug).then_some(slug)
}
