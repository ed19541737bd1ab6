//! Fetch capability used by the crawl workers
//!
//! The scheduler only sees two traits: a [`PageSession`] shared by the whole
//! crawl, and one [`PageHandle`] per worker drawn from it. A handle navigates
//! to a URL within a timeout and then answers metadata and link queries about
//! the page it holds. [`HttpSession`] implements them over reqwest and
//! scraper; tests substitute in-memory doubles.

mod extract;
mod http;

pub use extract::{extract_links, extract_metadata};
pub use http::{HttpPage, HttpSession};

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors from a single navigation attempt
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP error for {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("Fetch session error: {0}")]
    Session(String),
}

/// Metadata extracted from a loaded page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// A process-wide fetch session (an HTTP client, a browser, ...)
#[async_trait]
pub trait PageSession: Send + Sync + 'static {
    type Page: PageHandle;

    /// Opens a page handle owned by one worker for its lifetime
    async fn new_page(&self) -> Result<Self::Page, FetchError>;

    /// Releases the session; called once when the crawl finalizes
    async fn close(&self);
}

/// A single worker's view of the fetch session
#[async_trait]
pub trait PageHandle: Send + Sync + 'static {
    /// Loads `url`, giving up after `timeout`
    async fn goto(&mut self, url: &str, timeout: Duration) -> Result<(), FetchError>;

    /// Title and description of the currently loaded page
    async fn extract_metadata(&self) -> PageMetadata;

    /// Links on the currently loaded page that start with `prefix`
    async fn extract_links(&self, prefix: &str) -> Vec<String>;
}
