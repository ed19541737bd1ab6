//! Crawler module - the concurrent crawl scheduler
//!
//! This module contains the core crawling logic:
//! - The shared frontier with URL dedup and progress counters
//! - Crawl workers with bounded retry and growing per-attempt timeouts
//! - The runner that supervises the worker pool and finalizes the crawl
//! - Result and notification streams
//! - Signal-triggered shutdown

mod channels;
mod frontier;
mod runner;
mod shutdown;
mod signals;
mod worker;

#[cfg(test)]
mod testing;

pub use channels::{FinishReason, Notification, PageResult};
pub use frontier::{Claim, Frontier};
pub use runner::{Crawl, CrawlHandle, Runner};
pub use signals::listen_for_signals;

use crate::config::{CrawlParams, FetchConfig};
use crate::fetch::HttpSession;
use crate::SweepError;

/// Starts a crawl over HTTP
///
/// This is the main entry point. It will:
/// 1. Validate the crawl parameters
/// 2. Build the HTTP fetch session
/// 3. Seed the frontier and start `connections` workers
///
/// Read both streams of the returned [`Crawl`] until the notification
/// stream yields its `Finished` event.
///
/// # Arguments
///
/// * `params` - The crawl parameters
/// * `fetch` - HTTP client settings
///
/// # Returns
///
/// * `Ok(Crawl)` - The crawl is running
/// * `Err(SweepError)` - Invalid parameters or the fetch session failed to start
///
/// # Example
///
/// ```no_run
/// use sitesweep::config::{CrawlParams, FetchConfig};
/// use sitesweep::crawler::{crawl, Notification};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut crawl = crawl(CrawlParams::new("https://example.com/"), &FetchConfig::default()).await?;
/// while let Some(note) = crawl.notifications.recv().await {
///     if let Notification::Finished { finished } = note {
///         println!("{}", finished);
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub async fn crawl(params: CrawlParams, fetch: &FetchConfig) -> Result<Crawl, SweepError> {
    crate::config::validate_params(&params)?;
    let session = HttpSession::new(fetch)?;
    Runner::new(params, session).start().await
}
