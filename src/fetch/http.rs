//! HTTP fetch capability
//!
//! A [`HttpSession`] wraps one reqwest client shared by every worker; each
//! [`HttpPage`] keeps the last document it loaded so that extraction runs
//! against it after navigation.

use crate::config::FetchConfig;
use crate::fetch::{extract, FetchError, PageHandle, PageMetadata, PageSession};
use crate::SweepError;
use async_trait::async_trait;
use reqwest::Client;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Shared HTTP session
pub struct HttpSession {
    client: Client,
    closed: Arc<AtomicBool>,
}

impl HttpSession {
    /// Builds the session's HTTP client
    ///
    /// # Arguments
    ///
    /// * `config` - The fetch configuration
    ///
    /// # Returns
    ///
    /// * `Ok(HttpSession)` - Client built successfully
    /// * `Err(SweepError)` - The client could not be built (TLS backend, ...)
    ///
    /// # Example
    ///
    /// ```no_run
    /// use sitesweep::config::FetchConfig;
    /// use sitesweep::fetch::HttpSession;
    ///
    /// let session = HttpSession::new(&FetchConfig::default()).unwrap();
    /// ```
    pub fn new(config: &FetchConfig) -> Result<Self, SweepError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .connect_timeout(config.connect_timeout())
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self {
            client,
            closed: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageSession for HttpSession {
    type Page = HttpPage;

    async fn new_page(&self) -> Result<HttpPage, FetchError> {
        if self.is_closed() {
            return Err(FetchError::Session("session already closed".to_string()));
        }

        Ok(HttpPage {
            client: self.client.clone(),
            closed: Arc::clone(&self.closed),
            loaded: None,
        })
    }

    async fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            tracing::debug!("HTTP session closed");
        }
    }
}

/// A document loaded by a page handle
#[derive(Debug, Clone)]
struct LoadedDocument {
    /// Final URL after redirects, used to resolve relative links
    url: Url,
    body: String,
}

/// One worker's page handle
pub struct HttpPage {
    client: Client,
    closed: Arc<AtomicBool>,
    loaded: Option<LoadedDocument>,
}

impl HttpPage {
    async fn load(&self, url: &str) -> Result<LoadedDocument, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            // error pages still render; their links and title are used as-is
            tracing::debug!("{} answered with HTTP {}", url, status.as_u16());
        }

        let final_url = response.url().clone();
        let body = response.text().await.map_err(|e| classify_error(url, e))?;

        Ok(LoadedDocument {
            url: final_url,
            body,
        })
    }
}

#[async_trait]
impl PageHandle for HttpPage {
    async fn goto(&mut self, url: &str, timeout: Duration) -> Result<(), FetchError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(FetchError::Session("session already closed".to_string()));
        }

        // a failed navigation leaves nothing to extract from
        self.loaded = None;

        let document = tokio::time::timeout(timeout, self.load(url))
            .await
            .map_err(|_| FetchError::Timeout {
                url: url.to_string(),
            })??;

        self.loaded = Some(document);
        Ok(())
    }

    async fn extract_metadata(&self) -> PageMetadata {
        match &self.loaded {
            Some(document) => extract::extract_metadata(&document.body),
            None => PageMetadata::default(),
        }
    }

    async fn extract_links(&self, prefix: &str) -> Vec<String> {
        match &self.loaded {
            Some(document) => extract::extract_links(&document.body, &document.url, prefix),
            None => Vec::new(),
        }
    }
}

/// Maps a reqwest error onto the fetch error taxonomy
fn classify_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_builder() {
        FetchError::Navigation {
            url: url.to_string(),
            message: error.to_string(),
        }
    } else {
        FetchError::Http {
            url: url.to_string(),
            source: error,
        }
    }
}
