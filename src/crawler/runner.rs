//! Crawl runner - worker pool and lifecycle
//!
//! The runner seeds the frontier, opens one page handle per worker, spawns
//! the workers and a supervising task. The supervisor waits for either every
//! worker to stop on its own (the frontier drained) or a stop request, then
//! runs the finalize path exactly once:
//!
//! 1. Abort and reap any workers still running
//! 2. Emit the `Finished` notification with the stop reason
//! 3. Close the fetch session
//! 4. Drop the stream senders so both streams end

use crate::config::{validate_params, CrawlParams};
use crate::crawler::channels::{self, FinishReason, Notification, Outbound, PageResult};
use crate::crawler::frontier::Frontier;
use crate::crawler::shutdown::Shutdown;
use crate::crawler::worker::Worker;
use crate::fetch::PageSession;
use crate::state::{ProgressRecord, WorkerState};
use crate::url::NormalizeOptions;
use crate::SweepError;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::watch;
use tokio::task::JoinSet;

/// A running crawl: its two output streams and a control handle
pub struct Crawl {
    /// One record per processed URL
    pub results: UnboundedReceiver<PageResult>,

    /// Progress events, ending with a single `Finished`
    pub notifications: UnboundedReceiver<Notification>,

    pub handle: CrawlHandle,
}

/// Control handle for a running crawl
#[derive(Debug, Clone)]
pub struct CrawlHandle {
    shutdown: Shutdown,
    frontier: Arc<Frontier>,
    workers: Vec<watch::Receiver<WorkerState>>,
    done: watch::Receiver<Option<FinishReason>>,
}

impl CrawlHandle {
    /// Requests the crawl to stop
    ///
    /// In-flight fetches are abandoned. Returns false if the crawl was
    /// already stopping, in which case the earlier reason is kept.
    pub fn stop(&self, reason: FinishReason) -> bool {
        let first = self.shutdown.trigger(reason);
        if first {
            tracing::info!("Stop requested: {}", reason);
        }
        first
    }

    /// Waits for the finalize path to complete and returns the reason
    pub async fn finished(&self) -> FinishReason {
        let mut done = self.done.clone();
        let reason = match done.wait_for(Option::is_some).await {
            Ok(reason) => *reason,
            Err(_) => None,
        };
        reason.unwrap_or(FinishReason::Error)
    }

    /// Returns the finish reason if the crawl has finalized
    pub fn finish_reason(&self) -> Option<FinishReason> {
        *self.done.borrow()
    }

    /// Current state of every worker, by worker index
    pub fn worker_states(&self) -> Vec<WorkerState> {
        self.workers.iter().map(|state| *state.borrow()).collect()
    }

    pub fn progress(&self) -> ProgressRecord {
        self.frontier.snapshot(None)
    }
}

/// Launches crawl workers over a fetch session
pub struct Runner<S: PageSession> {
    params: Arc<CrawlParams>,
    session: Arc<S>,
}

impl<S: PageSession> Runner<S> {
    pub fn new(params: CrawlParams, session: S) -> Self {
        Self {
            params: Arc::new(params),
            session: Arc::new(session),
        }
    }

    /// Starts the crawl
    ///
    /// # Returns
    ///
    /// * `Ok(Crawl)` - Workers are running; read the streams until `Finished`
    /// * `Err(SweepError)` - Invalid parameters, or the session could not
    ///   open page handles; no worker was started
    pub async fn start(self) -> Result<Crawl, SweepError> {
        validate_params(&self.params)?;

        let opts = NormalizeOptions::from(self.params.as_ref());
        let frontier = Arc::new(Frontier::seeded(&self.params.url, opts));

        let mut pages = Vec::with_capacity(self.params.connections as usize);
        for _ in 0..self.params.connections {
            match self.session.new_page().await {
                Ok(page) => pages.push(page),
                Err(e) => {
                    self.session.close().await;
                    return Err(SweepError::Session(e.to_string()));
                }
            }
        }

        let (outbound, results, notifications) = channels::open();
        let shutdown = Shutdown::new();
        let (done_tx, done_rx) = watch::channel(None);

        let mut workers = JoinSet::new();
        let mut states = Vec::with_capacity(pages.len());
        for (id, page) in pages.into_iter().enumerate() {
            let (state_tx, state_rx) = watch::channel(WorkerState::Idle);
            states.push(state_rx);

            let worker = Worker::new(
                id,
                page,
                Arc::clone(&self.params),
                Arc::clone(&frontier),
                outbound.clone(),
                shutdown.clone(),
                state_tx,
            );
            workers.spawn(worker.run());
        }

        tracing::info!(
            "Crawling {} with {} workers",
            self.params.url,
            self.params.connections
        );

        tokio::spawn(supervise(
            workers,
            shutdown.clone(),
            outbound,
            Arc::clone(&self.session),
            done_tx,
        ));

        Ok(Crawl {
            results,
            notifications,
            handle: CrawlHandle {
                shutdown,
                frontier,
                workers: states,
                done: done_rx,
            },
        })
    }
}

/// Waits for the pool to stop and runs the finalize path
async fn supervise<S: PageSession>(
    mut workers: JoinSet<()>,
    shutdown: Shutdown,
    outbound: Outbound,
    session: Arc<S>,
    done: watch::Sender<Option<FinishReason>>,
) {
    loop {
        tokio::select! {
            joined = workers.join_next() => match joined {
                None => {
                    shutdown.trigger(FinishReason::Completed);
                    break;
                }
                Some(Ok(())) => {}
                Some(Err(e)) if e.is_panic() => {
                    tracing::error!("Worker crashed: {}", e);
                    shutdown.trigger(FinishReason::Error);
                    break;
                }
                Some(Err(e)) => tracing::debug!("Worker cancelled: {}", e),
            },
            _ = shutdown.cancelled() => break,
        }
    }

    if !shutdown.begin_finalize() {
        return;
    }

    workers.abort_all();
    while workers.join_next().await.is_some() {}

    let reason = shutdown.reason().unwrap_or(FinishReason::Error);
    outbound.send_finished(reason);
    session.close().await;
    drop(outbound);

    tracing::info!("Crawl finished: {}", reason);
    done.send_replace(Some(reason));
}
