use crate::config::CrawlParams;

/// Which URL components are masked out of a dedup key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeOptions {
    pub ignore_query_params: bool,
    pub ignore_hash: bool,
    pub ignore_trailing_slash: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            ignore_query_params: true,
            ignore_hash: true,
            ignore_trailing_slash: true,
        }
    }
}

impl From<&CrawlParams> for NormalizeOptions {
    fn from(params: &CrawlParams) -> Self {
        Self {
            ignore_query_params: params.ignore_query_params,
            ignore_hash: params.ignore_hash,
            ignore_trailing_slash: params.ignore_trailing_slash,
        }
    }
}

/// Derives the dedup key of a URL
///
/// # Normalization Steps
///
/// Applied in this order, each only when its option is set:
///
/// 1. Truncate at the first `?`
/// 2. Truncate at the first `#`
/// 3. Strip the trailing `/`
///
/// A run of trailing slashes is stripped as a whole so that normalizing a
/// key again yields the same key.
///
/// Nothing else is touched: no case folding, no scheme or port rewriting,
/// and the input does not have to parse as a URL.
///
/// # Examples
///
/// ```
/// use sitesweep::url::{normalize_url, NormalizeOptions};
///
/// let opts = NormalizeOptions::default();
/// assert_eq!(normalize_url("http://a/x/?y=1#top", &opts), "http://a/x");
/// ```
pub fn normalize_url(url: &str, opts: &NormalizeOptions) -> String {
    let mut key = url;

    if opts.ignore_query_params {
        key = truncate_at(key, '?');
    }

    if opts.ignore_hash {
        key = truncate_at(key, '#');
    }

    if opts.ignore_trailing_slash {
        key = key.trim_end_matches('/');
    }

    key.to_string()
}

fn truncate_at(s: &str, delimiter: char) -> &str {
    s.split_once(delimiter).map(|(head, _)| head).unwrap_or(s)
}
