//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `WorkerState`: lifecycle of a single crawl worker (idle, running, stopped)
//! - `ProgressRecord`: counters shared by all workers and reported in notifications

mod progress;
mod worker_state;

// Re-export main types
pub use progress::ProgressRecord;
pub use worker_state::WorkerState;
