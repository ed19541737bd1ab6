//! Crawl-wide stop coordination
//!
//! Every worker watches the same cancellation token. The first stop request
//! fixes the finish reason; later requests only report that a stop is
//! already under way. Finalization is claimed through a separate flag so it
//! runs exactly once.

use crate::crawler::channels::FinishReason;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

#[derive(Debug, Clone, Default)]
pub(crate) struct Shutdown {
    token: CancellationToken,
    reason: Arc<Mutex<Option<FinishReason>>>,
    finalizing: Arc<AtomicBool>,
}

impl Shutdown {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Requests a stop; returns false if one was already requested
    pub(crate) fn trigger(&self, reason: FinishReason) -> bool {
        let first = {
            let mut current = self.reason.lock().unwrap_or_else(PoisonError::into_inner);
            if current.is_some() {
                false
            } else {
                *current = Some(reason);
                true
            }
        };

        self.token.cancel();
        first
    }

    pub(crate) fn is_triggered(&self) -> bool {
        self.token.is_cancelled()
    }

    pub(crate) fn reason(&self) -> Option<FinishReason> {
        *self.reason.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }

    pub(crate) fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Claims the finalize path; only the first caller gets true
    pub(crate) fn begin_finalize(&self) -> bool {
        !self.finalizing.swap(true, Ordering::SeqCst)
    }
}
