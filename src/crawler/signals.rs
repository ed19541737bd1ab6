//! OS signal handling for a running crawl
//!
//! SIGINT (Ctrl-C) and, on unix, SIGUSR1/SIGUSR2 stop the crawl with
//! [`FinishReason::Killed`]. Signals arriving while the crawl is already
//! stopping are absorbed.

use crate::crawler::channels::FinishReason;
use crate::crawler::runner::CrawlHandle;
use tokio::task::JoinHandle;

/// Spawns a task that stops `handle` on interruption signals
///
/// The task exits once the crawl has finalized.
pub fn listen_for_signals(handle: CrawlHandle) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut signals = match Signals::new() {
            Ok(signals) => signals,
            Err(e) => {
                tracing::warn!("Cannot install signal handlers: {}", e);
                return;
            }
        };

        loop {
            tokio::select! {
                name = signals.recv() => {
                    if handle.stop(FinishReason::Killed) {
                        tracing::info!("Received {}, stopping crawl", name);
                    } else {
                        tracing::debug!("Received {} while already stopping", name);
                    }
                }
                _ = handle.finished() => break,
            }
        }
    })
}

#[cfg(unix)]
struct Signals {
    usr1: tokio::signal::unix::Signal,
    usr2: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl Signals {
    fn new() -> std::io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            usr1: signal(SignalKind::user_defined1())?,
            usr2: signal(SignalKind::user_defined2())?,
        })
    }

    async fn recv(&mut self) -> &'static str {
        tokio::select! {
            _ = ctrl_c() => "SIGINT",
            _ = self.usr1.recv() => "SIGUSR1",
            _ = self.usr2.recv() => "SIGUSR2",
        }
    }
}

#[cfg(not(unix))]
struct Signals;

#[cfg(not(unix))]
impl Signals {
    fn new() -> std::io::Result<Self> {
        Ok(Self)
    }

    async fn recv(&mut self) -> &'static str {
        ctrl_c().await;
        "SIGINT"
    }
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Ctrl-C handler failed: {}", e);
        std::future::pending::<()>().await;
    }
}
