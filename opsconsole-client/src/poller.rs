//! Process status poller
//!
//! Re-fetches process statuses on a fixed interval and hands each snapshot
//! to the consumer. A failed fetch is logged and the next tick fetches
//! again; polling only stops when the consumer goes away or asks it to.

use async_trait::async_trait;
use opsconsole_core::domain::status::ProcessStatus;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::ConsoleClient;
use crate::error::Result;

/// Default status refresh cadence
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Anything that can produce a status snapshot
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Fetch the current status of every process
    async fn fetch_statuses(&self) -> Result<Vec<ProcessStatus>>;
}

#[async_trait]
impl StatusSource for ConsoleClient {
    async fn fetch_statuses(&self) -> Result<Vec<ProcessStatus>> {
        self.list_statuses().await
    }
}

/// Fixed-interval status poller
pub struct StatusPoller {
    source: Arc<dyn StatusSource>,
    interval: Duration,
}

impl StatusPoller {
    /// Creates a poller with the default one second interval
    pub fn new(source: Arc<dyn StatusSource>) -> Self {
        Self {
            source,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Start polling in a background task
    ///
    /// The first fetch happens immediately.
    pub fn spawn(self) -> StatusFeed {
        let (tx, rx) = mpsc::channel(1);

        let task = tokio::spawn(async move {
            info!("Starting status poller (interval: {:?})", self.interval);

            let mut ticker = time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = tx.closed() => {
                        debug!("Status consumer dropped, stopping poller");
                        break;
                    }
                    _ = ticker.tick() => {}
                }

                match self.source.fetch_statuses().await {
                    Ok(statuses) => {
                        debug!("Fetched {} process status(es)", statuses.len());
                        if tx.send(statuses).await.is_err() {
                            debug!("Status consumer dropped, stopping poller");
                            break;
                        }
                    }
                    Err(e) => {
                        error!("Failed to fetch process statuses: {}", e);
                    }
                }
            }
        });

        StatusFeed { snapshots: rx, task }
    }
}

/// Receiving side of a running poller
pub struct StatusFeed {
    snapshots: mpsc::Receiver<Vec<ProcessStatus>>,
    task: JoinHandle<()>,
}

impl StatusFeed {
    /// Wait for the next full snapshot
    pub async fn next_snapshot(&mut self) -> Option<Vec<ProcessStatus>> {
        self.snapshots.recv().await
    }

    /// Stop polling
    pub fn stop(self) {
        self.task.abort();
    }
}

impl Drop for StatusFeed {
    fn drop(&mut self) {
        self.task.abort();
    }
}
