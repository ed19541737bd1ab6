use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Sitesweep
///
/// The crawl parameters live at the top level of the TOML file, the fetch
/// capability settings under `[fetch]`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(flatten)]
    pub crawl: CrawlParams,

    #[serde(default)]
    pub fetch: FetchConfig,
}

/// Parameters of a single crawl invocation
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CrawlParams {
    /// Seed URL; also the prefix every followed link must start with
    #[serde(default)]
    pub url: String,

    /// Pause between a worker's successive fetches (milliseconds)
    #[serde(default = "default_interval")]
    pub interval: u64,

    /// Number of concurrent workers
    #[serde(default = "default_connections")]
    pub connections: u32,

    /// Fetch attempts per page before it is recorded as failed
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    #[serde(default = "default_true")]
    pub ignore_trailing_slash: bool,

    #[serde(default = "default_true")]
    pub ignore_query_params: bool,

    #[serde(default = "default_true")]
    pub ignore_hash: bool,

    /// Timeout of the first fetch attempt before backoff (milliseconds)
    #[serde(default = "default_base_timeout")]
    pub base_timeout: u64,

    /// Unit multiplied by 2^attempt and added to the base timeout (milliseconds)
    #[serde(default = "default_backoff_unit")]
    pub backoff_unit: u64,
}

/// Settings for the HTTP fetch capability
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FetchConfig {
    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// TCP connect timeout (milliseconds)
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,
}

fn default_interval() -> u64 {
    500
}

fn default_connections() -> u32 {
    1
}

fn default_retry_count() -> u32 {
    5
}

fn default_true() -> bool {
    true
}

fn default_base_timeout() -> u64 {
    5000
}

fn default_backoff_unit() -> u64 {
    1000
}

fn default_user_agent() -> String {
    format!("sitesweep/{}", env!("CARGO_PKG_VERSION"))
}

fn default_connect_timeout() -> u64 {
    10_000
}

impl CrawlParams {
    /// Creates parameters for `url` with every other field at its default
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval)
    }

    /// Number of fetch attempts a page gets; always at least one
    pub fn attempts(&self) -> u32 {
        self.retry_count.max(1)
    }

    /// Timeout allowed for the given attempt (0-based)
    ///
    /// `base_timeout + 2^attempt * backoff_unit`, saturating on overflow.
    pub fn attempt_timeout(&self, attempt: u32) -> Duration {
        let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
        let backoff = factor.saturating_mul(self.backoff_unit);
        Duration::from_millis(self.base_timeout.saturating_add(backoff))
    }
}

impl Default for CrawlParams {
    fn default() -> Self {
        Self {
            url: String::new(),
            interval: default_interval(),
            connections: default_connections(),
            retry_count: default_retry_count(),
            ignore_trailing_slash: true,
            ignore_query_params: true,
            ignore_hash: true,
            base_timeout: default_base_timeout(),
            backoff_unit: default_backoff_unit(),
        }
    }
}

impl FetchConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            connect_timeout: default_connect_timeout(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = CrawlParams::new("https://example.com/");
        assert_eq!(params.interval, 500);
        assert_eq!(params.connections, 1);
        assert_eq!(params.retry_count, 5);
        assert!(params.ignore_trailing_slash);
        assert!(params.ignore_query_params);
        assert!(params.ignore_hash);
    }

    #[test]
    fn test_attempt_timeout_grows() {
        let params = CrawlParams::new("https://example.com/");
        assert_eq!(params.attempt_timeout(0), Duration::from_millis(6000));
        assert_eq!(params.attempt_timeout(1), Duration::from_millis(7000));
        assert_eq!(params.attempt_timeout(2), Duration::from_millis(9000));
        assert_eq!(params.attempt_timeout(4), Duration::from_millis(21000));
    }

    #[test]
    fn test_attempt_timeout_saturates() {
        let params = CrawlParams::new("https://example.com/");
        assert_eq!(params.attempt_timeout(200), Duration::from_millis(u64::MAX));
    }

    #[test]
    fn test_zero_retry_count_still_attempts_once() {
        let mut params = CrawlParams::new("https://example.com/");
        params.retry_count = 0;
        assert_eq!(params.attempts(), 1);
        params.retry_count = 3;
        assert_eq!(params.attempts(), 3);
    }
}
