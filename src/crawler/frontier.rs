//! Shared crawl frontier
//!
//! The frontier owns the FIFO queue of URLs still to crawl, the set of
//! normalized keys ever accepted and the progress counters. Every mutation
//! happens under a single mutex so the dedup check and the insert are one
//! step, and counters never lose updates. Workers with nothing to claim park
//! on a [`Notify`] until a peer pushes new work or the crawl drains.

use crate::crawler::channels::Outbound;
use crate::state::ProgressRecord;
use crate::url::{normalize_url, NormalizeOptions};
use std::collections::{HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::futures::Notified;
use tokio::sync::Notify;

/// Result of a worker asking the frontier for work
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Claim {
    /// A URL to crawl; the caller must report it with [`Frontier::complete`]
    Url(String),

    /// Nothing queued, but peers are still crawling and may discover more
    Wait,

    /// Nothing queued and nothing in flight: the crawl is over
    Drained,
}

#[derive(Debug, Default)]
struct FrontierState {
    queue: VecDeque<String>,
    seen: HashSet<String>,
    in_flight: u64,
    processed: u64,
    sum: u64,
}

impl FrontierState {
    fn is_drained(&self) -> bool {
        self.queue.is_empty() && self.in_flight == 0
    }

    fn record(&self, url: Option<&str>) -> ProgressRecord {
        ProgressRecord {
            processed: self.processed,
            sum: self.sum,
            queued: self.queue.len() as u64,
            url: url.map(str::to_string),
        }
    }
}

/// Frontier queue and dedup set shared by all workers
#[derive(Debug)]
pub struct Frontier {
    state: Mutex<FrontierState>,
    opts: NormalizeOptions,
    work: Notify,
}

impl Frontier {
    /// Creates an empty frontier
    pub fn new(opts: NormalizeOptions) -> Self {
        Self {
            state: Mutex::new(FrontierState::default()),
            opts,
            work: Notify::new(),
        }
    }

    /// Creates a frontier holding the seed URL, its key already marked seen
    pub fn seeded(seed: &str, opts: NormalizeOptions) -> Self {
        let frontier = Self::new(opts);
        frontier.push_if_new(seed);
        frontier
    }

    fn lock(&self) -> MutexGuard<'_, FrontierState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Enqueues `raw_url` unless a URL with the same key was ever accepted
    ///
    /// Returns whether the URL was enqueued. Accepted URLs count towards
    /// `sum`.
    pub fn push_if_new(&self, raw_url: &str) -> bool {
        let key = normalize_url(raw_url, &self.opts);

        let inserted = {
            let mut state = self.lock();
            if state.seen.insert(key) {
                state.queue.push_back(raw_url.to_string());
                state.sum += 1;
                true
            } else {
                false
            }
        };

        if inserted {
            self.work.notify_waiters();
        }
        inserted
    }

    /// Dequeues the oldest URL without tracking it as in flight
    ///
    /// This bypasses the claim accounting: a URL taken here is never counted
    /// as processed, and [`Frontier::claim`] may report `Drained` while the
    /// caller still holds it. Do not mix it with a running crawl's workers.
    pub fn pop_next(&self) -> Option<String> {
        self.lock().queue.pop_front()
    }

    /// Dequeues the oldest URL and tracks it as in flight
    pub fn claim(&self) -> Claim {
        let mut state = self.lock();
        match state.queue.pop_front() {
            Some(url) => {
                state.in_flight += 1;
                Claim::Url(url)
            }
            None if state.in_flight == 0 => Claim::Drained,
            None => Claim::Wait,
        }
    }

    /// Marks a claimed URL as processed
    ///
    /// Wakes waiting workers when this was the last page in flight and the
    /// queue is empty, so they can observe the drain and stop.
    pub fn complete(&self) {
        let drained = {
            let mut state = self.lock();
            state.in_flight = state.in_flight.saturating_sub(1);
            state.processed += 1;
            state.is_drained()
        };

        if drained {
            self.work.notify_waiters();
        }
    }

    /// A future resolved by the next push or drain
    ///
    /// Call `enable()` on it before [`Frontier::claim`] so a wakeup between
    /// the claim and the wait is not lost.
    pub fn notified(&self) -> Notified<'_> {
        self.work.notified()
    }

    pub fn size(&self) -> usize {
        self.lock().queue.len()
    }

    #[cfg(test)]
    pub(crate) fn is_drained(&self) -> bool {
        self.lock().is_drained()
    }

    /// Number of distinct keys accepted so far
    #[cfg(test)]
    pub(crate) fn seen_count(&self) -> usize {
        self.lock().seen.len()
    }

    /// Returns true if a URL with the same key was accepted
    #[cfg(test)]
    pub(crate) fn has_seen(&self, raw_url: &str) -> bool {
        let key = normalize_url(raw_url, &self.opts);
        self.lock().seen.contains(&key)
    }

    /// Current counters, tagged with the URL they are reported for
    pub fn snapshot(&self, url: Option<&str>) -> ProgressRecord {
        self.lock().record(url)
    }

    /// Sends the current counters for `url` as a progress notification
    ///
    /// The send happens under the lock, so notifications reach the stream in
    /// counter order even when several workers report at once.
    pub(crate) fn report(&self, url: &str, outbound: &Outbound) {
        let state = self.lock();
        outbound.send_progress(state.record(Some(url)));
    }
}
