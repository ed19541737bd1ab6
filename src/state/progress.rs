/// Progress counters shared by every worker of a crawl
use serde::Serialize;

/// Snapshot of crawl progress
///
/// `processed` and `sum` never decrease over a crawl; `queued` rises and
/// falls with the frontier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressRecord {
    /// Pages dequeued and finished, successfully or not
    pub processed: u64,

    /// URLs ever accepted into the frontier, the seed included
    pub sum: u64,

    /// URLs waiting in the frontier
    pub queued: u64,

    /// URL the snapshot was taken for
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl ProgressRecord {
    /// Pages accepted but not yet processed, in flight included
    pub fn outstanding(&self) -> u64 {
        self.sum.saturating_sub(self.processed)
    }
}
