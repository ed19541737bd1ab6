//! In-memory fetch session for crawler tests

use crate::fetch::{FetchError, PageHandle, PageMetadata, PageSession};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, Default)]
struct GraphPage {
    title: Option<String>,
    description: Option<String>,
    links: Vec<String>,
}

/// A fixed link graph served without any I/O
#[derive(Debug, Default)]
pub(crate) struct SiteGraph {
    pages: HashMap<String, GraphPage>,
    failing: HashSet<String>,
    hanging: HashSet<String>,
    panicking: HashSet<String>,
    refuse_pages: bool,
    attempts: Mutex<HashMap<String, u32>>,
    closed: AtomicBool,
}

impl SiteGraph {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn page(mut self, url: &str, title: &str, links: &[&str]) -> Self {
        self.pages.insert(
            url.to_string(),
            GraphPage {
                title: Some(title.to_string()),
                description: Some(format!("About {}", title)),
                links: links.iter().map(|l| l.to_string()).collect(),
            },
        );
        self
    }

    /// Every navigation to `url` fails immediately
    pub(crate) fn failing(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    /// Navigations to `url` never complete
    pub(crate) fn hanging(mut self, url: &str) -> Self {
        self.hanging.insert(url.to_string());
        self
    }

    /// Navigating to `url` panics the worker
    pub(crate) fn panicking(mut self, url: &str) -> Self {
        self.panicking.insert(url.to_string());
        self
    }

    /// The session cannot open page handles
    pub(crate) fn refusing_pages(mut self) -> Self {
        self.refuse_pages = true;
        self
    }

    pub(crate) fn session(self) -> GraphSession {
        GraphSession {
            graph: Arc::new(self),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct GraphSession {
    graph: Arc<SiteGraph>,
}

impl GraphSession {
    pub(crate) fn attempts(&self, url: &str) -> u32 {
        self.graph
            .attempts
            .lock()
            .unwrap()
            .get(url)
            .copied()
            .unwrap_or(0)
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.graph.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageSession for GraphSession {
    type Page = GraphPageHandle;

    async fn new_page(&self) -> Result<GraphPageHandle, FetchError> {
        if self.graph.refuse_pages {
            return Err(FetchError::Session("cannot open page".to_string()));
        }
        Ok(GraphPageHandle {
            graph: Arc::clone(&self.graph),
            current: None,
        })
    }

    async fn close(&self) {
        self.graph.closed.store(true, Ordering::SeqCst);
    }
}

#[derive(Debug)]
pub(crate) struct GraphPageHandle {
    graph: Arc<SiteGraph>,
    current: Option<GraphPage>,
}

#[async_trait]
impl PageHandle for GraphPageHandle {
    async fn goto(&mut self, url: &str, _timeout: Duration) -> Result<(), FetchError> {
        *self
            .graph
            .attempts
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_insert(0) += 1;
        self.current = None;

        if self.graph.panicking.contains(url) {
            panic!("page handle crashed on {}", url);
        }
        if self.graph.hanging.contains(url) {
            std::future::pending::<()>().await;
        }
        if self.graph.failing.contains(url) {
            return Err(FetchError::Navigation {
                url: url.to_string(),
                message: "net::ERR_CONNECTION_REFUSED".to_string(),
            });
        }

        match self.graph.pages.get(url) {
            Some(page) => {
                self.current = Some(page.clone());
                Ok(())
            }
            None => Err(FetchError::Navigation {
                url: url.to_string(),
                message: "no such page".to_string(),
            }),
        }
    }

    async fn extract_metadata(&self) -> PageMetadata {
        self.current
            .as_ref()
            .map(|page| PageMetadata {
                title: page.title.clone(),
                description: page.description.clone(),
            })
            .unwrap_or_default()
    }

    async fn extract_links(&self, prefix: &str) -> Vec<String> {
        self.current
            .as_ref()
            .map(|page| {
                page.links
                    .iter()
                    .filter(|link| link.starts_with(prefix))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}
