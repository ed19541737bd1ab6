//! Sitesweep: a concurrent breadth-first site crawler
//!
//! This crate crawls every page reachable below a seed URL, extracting each
//! page's title and meta description. Results and progress notifications are
//! streamed to the caller while a pool of workers drains a shared frontier.

pub mod config;
pub mod crawler;
pub mod fetch;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Sitesweep operations
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to start fetch session: {0}")]
    Session(String),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Sitesweep operations
pub type Result<T> = std::result::Result<T, SweepError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::{Config, CrawlParams, FetchConfig};
pub use crawler::{crawl, Crawl, CrawlHandle, FinishReason, Notification, PageResult};
pub use state::{ProgressRecord, WorkerState};
pub use url::{is_in_scope, normalize_url, NormalizeOptions};
