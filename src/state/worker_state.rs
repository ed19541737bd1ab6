/// Worker state definitions for tracking pool liveness
use std::fmt;

/// Represents the current state of a crawl worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WorkerState {
    /// Worker is waiting: not started yet, or the frontier is empty while
    /// peers still have pages in flight
    #[default]
    Idle,

    /// Worker is claiming and crawling pages
    Running,

    /// Worker has exited its loop (frontier drained or stop requested)
    Stopped,
}

impl WorkerState {
    /// Returns true if the worker may still claim work
    pub fn is_live(&self) -> bool {
        !matches!(self, Self::Stopped)
    }

    /// Returns true if the worker is currently crawling
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// Checks whether a transition is allowed
    ///
    /// Stopped is final: a worker never picks up work after leaving its loop.
    pub fn can_transition_to(&self, next: WorkerState) -> bool {
        match self {
            Self::Idle => matches!(next, Self::Running | Self::Stopped),
            Self::Running => matches!(next, Self::Idle | Self::Stopped),
            Self::Stopped => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
