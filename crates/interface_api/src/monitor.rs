//! Admin notification polling
//!
//! Counts subscription payments awaiting verification on a fixed interval
//! and publishes the latest count through a watch channel. The
//! `/admin/notifications` handler only reads the channel.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use core_kernel::{CancellationHandle, PeriodicTask};
use domain_subscription::SubscriptionService;

/// Latest poll result
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingVerifications {
    pub count: usize,
    /// When the count was taken; `None` before the first poll completes
    pub checked_at: Option<DateTime<Utc>>,
}

/// A channel that never receives a poll; used when no monitor runs
pub fn idle_channel() -> watch::Receiver<PendingVerifications> {
    let (tx, rx) = watch::channel(PendingVerifications::default());
    // The receiver keeps the last value after the sender is gone.
    drop(tx);
    rx
}

pub struct PendingVerificationMonitor {
    handle: CancellationHandle,
    join: JoinHandle<()>,
    rx: watch::Receiver<PendingVerifications>,
}

impl PendingVerificationMonitor {
    /// Starts polling; the first count is taken immediately.
    ///
    /// A failed poll is logged and the previous count stays published.
    pub fn spawn(service: SubscriptionService, interval: Duration) -> Self {
        let (tx, rx) = watch::channel(PendingVerifications::default());
        let tx = Arc::new(tx);

        let (handle, join) =
            PeriodicTask::new("pending-verifications", interval).spawn(move || {
                let service = service.clone();
                let tx = tx.clone();
                async move {
                    match service.pending_verification_count().await {
                        Ok(count) => {
                            debug!(count, "pending verifications polled");
                            tx.send_replace(PendingVerifications {
                                count,
                                checked_at: Some(Utc::now()),
                            });
                        }
                        Err(e) => warn!(error = %e, "pending verification poll failed"),
                    }
                }
            });

        Self { handle, join, rx }
    }

    pub fn subscribe(&self) -> watch::Receiver<PendingVerifications> {
        self.rx.clone()
    }

    /// Stops polling and waits for the task to finish
    pub async fn shutdown(self) {
        self.handle.cancel();
        if let Err(e) = self.join.await {
            warn!(error = %e, "pending verification monitor ended abnormally");
        }
    }
}
