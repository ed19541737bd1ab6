//! Outbound result and notification streams
//!
//! A crawl hands the caller two unbounded receivers: one record per processed
//! page, and progress notifications that end with exactly one `Finished`
//! event.

use crate::fetch::PageMetadata;
use crate::state::ProgressRecord;
use serde::{Serialize, Serializer};
use std::fmt;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Outcome record for one dequeued URL
///
/// A page that could not be fetched carries only its URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageResult {
    pub url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl PageResult {
    /// Result for a page whose fetch attempts were all exhausted
    pub fn failed(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: None,
            description: None,
        }
    }

    /// Result for a loaded page
    pub fn loaded(url: impl Into<String>, metadata: PageMetadata) -> Self {
        Self {
            url: url.into(),
            title: metadata.title,
            description: metadata.description,
        }
    }

    /// Ordered (column, value) view used by tabular writers
    pub fn fields(&self) -> [(&'static str, Option<&str>); 3] {
        [
            ("url", Some(self.url.as_str())),
            ("title", self.title.as_deref()),
            ("description", self.description.as_deref()),
        ]
    }
}

/// Why a crawl ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FinishReason {
    /// The frontier drained and every worker stopped
    Completed,

    /// Stopped from outside (OS signal or an explicit stop)
    Killed,

    /// A worker faulted and the crawl was torn down
    Error,
}

impl FinishReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "Finished!",
            Self::Killed => "Killed!",
            Self::Error => "Error!",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for FinishReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FinishReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Event on the notification stream
///
/// Serializes as `{"processed":..,"sum":..,"queued":..,"url":..}` or
/// `{"finished":"Finished!"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Notification {
    Progress(ProgressRecord),
    Finished { finished: FinishReason },
}

impl Notification {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished { .. })
    }
}

/// Sending half of both streams, cloned into every worker
#[derive(Debug, Clone)]
pub(crate) struct Outbound {
    results: UnboundedSender<PageResult>,
    notifications: UnboundedSender<Notification>,
}

impl Outbound {
    pub(crate) fn send_result(&self, result: PageResult) {
        if self.results.send(result).is_err() {
            tracing::trace!("Result receiver dropped");
        }
    }

    pub(crate) fn send_progress(&self, record: ProgressRecord) {
        if self.notifications.send(Notification::Progress(record)).is_err() {
            tracing::trace!("Notification receiver dropped");
        }
    }

    pub(crate) fn send_finished(&self, reason: FinishReason) {
        if self
            .notifications
            .send(Notification::Finished { finished: reason })
            .is_err()
        {
            tracing::trace!("Notification receiver dropped");
        }
    }
}

/// Opens both streams
pub(crate) fn open() -> (
    Outbound,
    UnboundedReceiver<PageResult>,
    UnboundedReceiver<Notification>,
) {
    let (results_tx, results_rx) = mpsc::unbounded_channel();
    let (notify_tx, notify_rx) = mpsc::unbounded_channel();

    let outbound = Outbound {
        results: results_tx,
        notifications: notify_tx,
    };

    (outbound, results_rx, notify_rx)
}
