//! Crawl worker
//!
//! A worker owns one page handle and loops: claim a URL from the shared
//! frontier, crawl it, pause for the configured interval. With nothing to
//! claim it parks until a peer discovers new work or the frontier drains.

use crate::config::CrawlParams;
use crate::crawler::channels::{Outbound, PageResult};
use crate::crawler::frontier::{Claim, Frontier};
use crate::crawler::shutdown::Shutdown;
use crate::fetch::PageHandle;
use crate::state::WorkerState;
use std::sync::Arc;
use tokio::sync::watch;

/// How a page's fetch attempts ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchOutcome {
    Loaded,
    Exhausted,
    Cancelled,
}

pub(crate) struct Worker<P: PageHandle> {
    id: usize,
    page: P,
    params: Arc<CrawlParams>,
    frontier: Arc<Frontier>,
    outbound: Outbound,
    shutdown: Shutdown,
    state: watch::Sender<WorkerState>,
}

impl<P: PageHandle> Worker<P> {
    pub(crate) fn new(
        id: usize,
        page: P,
        params: Arc<CrawlParams>,
        frontier: Arc<Frontier>,
        outbound: Outbound,
        shutdown: Shutdown,
        state: watch::Sender<WorkerState>,
    ) -> Self {
        Self {
            id,
            page,
            params,
            frontier,
            outbound,
            shutdown,
            state,
        }
    }

    /// Runs until the frontier drains or a stop is requested
    pub(crate) async fn run(mut self) {
        tracing::debug!("Worker {} started", self.id);
        let frontier = Arc::clone(&self.frontier);
        let token = self.shutdown.token();

        loop {
            if token.is_cancelled() {
                break;
            }

            let notified = frontier.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            match frontier.claim() {
                Claim::Url(url) => {
                    self.set_state(WorkerState::Running);
                    self.crawl_one(&url).await;
                    if !self.pause().await {
                        break;
                    }
                }
                Claim::Wait => {
                    self.set_state(WorkerState::Idle);
                    tokio::select! {
                        _ = notified.as_mut() => {}
                        _ = token.cancelled() => break,
                    }
                }
                Claim::Drained => break,
            }
        }

        self.set_state(WorkerState::Stopped);
        tracing::debug!("Worker {} stopped", self.id);
    }

    /// Crawls one claimed URL
    ///
    /// Emits a progress notification before fetching, exactly one page
    /// result, and a second progress notification once the page is counted.
    /// A stop request during the fetch abandons the page without a result.
    pub(crate) async fn crawl_one(&mut self, url: &str) {
        self.frontier.report(url, &self.outbound);

        match self.fetch_with_retry(url).await {
            FetchOutcome::Cancelled => {
                tracing::debug!("Worker {} abandoned {}", self.id, url);
                return;
            }
            FetchOutcome::Exhausted => {
                tracing::warn!(
                    "Giving up on {} after {} attempts",
                    url,
                    self.params.attempts()
                );
                self.outbound.send_result(PageResult::failed(url));
            }
            FetchOutcome::Loaded => {
                let metadata = self.page.extract_metadata().await;
                self.outbound.send_result(PageResult::loaded(url, metadata));

                let links = self.page.extract_links(&self.params.url).await;
                let found = links.len();
                let accepted = links
                    .iter()
                    .filter(|link| self.frontier.push_if_new(link))
                    .count();
                tracing::debug!(
                    "Crawled {}: {} in-scope links, {} new",
                    url,
                    found,
                    accepted
                );
            }
        }

        self.frontier.complete();
        self.frontier.report(url, &self.outbound);
    }

    /// Tries to load `url`, each attempt with a longer timeout than the last
    async fn fetch_with_retry(&mut self, url: &str) -> FetchOutcome {
        let token = self.shutdown.token();

        for attempt in 0..self.params.attempts() {
            let timeout = self.params.attempt_timeout(attempt);
            tracing::trace!(
                "Worker {} fetching {} (attempt {}, timeout {:?})",
                self.id,
                url,
                attempt + 1,
                timeout
            );

            let result = tokio::select! {
                _ = token.cancelled() => return FetchOutcome::Cancelled,
                result = tokio::time::timeout(timeout, self.page.goto(url, timeout)) => result,
            };

            match result {
                Ok(Ok(())) => return FetchOutcome::Loaded,
                Ok(Err(e)) => tracing::debug!("Attempt {} for {} failed: {}", attempt + 1, url, e),
                Err(_) => tracing::debug!("Attempt {} for {} timed out", attempt + 1, url),
            }
        }

        FetchOutcome::Exhausted
    }

    /// Sleeps for the crawl interval; false if a stop arrived meanwhile
    async fn pause(&self) -> bool {
        let interval = self.params.interval();
        if interval.is_zero() {
            tokio::task::yield_now().await;
            return !self.shutdown.is_triggered();
        }

        tokio::select! {
            _ = tokio::time::sleep(interval) => true,
            _ = self.shutdown.cancelled() => false,
        }
    }

    fn set_state(&self, next: WorkerState) {
        let current = *self.state.borrow();
        if current != next && current.can_transition_to(next) {
            self.state.send_replace(next);
        }
    }
}
