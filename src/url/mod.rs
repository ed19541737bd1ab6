//! URL handling module for Sitesweep
//!
//! This module provides dedup-key normalization and the scope check that
//! decides which discovered links are followed.

mod normalize;

pub use normalize::{normalize_url, NormalizeOptions};

/// Returns true if a discovered link belongs to the crawl
///
/// This is a raw string prefix test against the seed URL, not a host or
/// origin comparison: with seed `https://example.com/docs` the link
/// `https://example.com/docs-old/` is in scope while
/// `https://example.com/blog` is not.
///
/// # Examples
///
/// ```
/// use sitesweep::url::is_in_scope;
///
/// assert!(is_in_scope("http://x/a/b", "http://x/a"));
/// assert!(!is_in_scope("http://y/c", "http://x/a"));
/// ```
pub fn is_in_scope(link: &str, seed: &str) -> bool {
    link.starts_with(seed)
}
