//! Fixed-interval background tasks
//!
//! Used for polling (e.g. the count of subscription payments awaiting an
//! admin). Ticks run at a fixed interval with no backoff or jitter; a
//! failing tick is logged by the caller and the next one runs on schedule.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

/// Stops a running [`PeriodicTask`]
///
/// Dropping the handle also stops the task, so the owner controls its
/// lifetime.
#[derive(Debug)]
pub struct CancellationHandle {
    tx: watch::Sender<bool>,
}

impl CancellationHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

/// A named task that runs a closure every `interval`
#[derive(Debug, Clone)]
pub struct PeriodicTask {
    name: String,
    interval: Duration,
}

impl PeriodicTask {
    pub fn new(name: impl Into<String>, interval: Duration) -> Self {
        Self {
            name: name.into(),
            interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Spawns the task on the current tokio runtime.
    ///
    /// The first tick runs immediately.
    pub fn spawn<F, Fut>(self, mut tick: F) -> (CancellationHandle, JoinHandle<()>)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (tx, mut rx) = watch::channel(false);
        let name = self.name;
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let join = tokio::spawn(async move {
            debug!(task = %name, "periodic task started");
            loop {
                tokio::select! {
                    changed = rx.changed() => {
                        if changed.is_err() || *rx.borrow() {
                            break;
                        }
                    }
                    _ = interval.tick() => {
                        tick().await;
                    }
                }
            }
            debug!(task = %name, "periodic task stopped");
        });

        (CancellationHandle { tx }, join)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_task_ticks_until_cancelled() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = ticks.clone();

        let (handle, join) = PeriodicTask::new("test", Duration::from_millis(10)).spawn(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        tokio::time::sleep(Duration::from_millis(60)).await;
        handle.cancel();
        assert!(handle.is_cancelled());
        join.await.unwrap();

        let seen = ticks.load(Ordering::SeqCst);
        assert!(seen >= 2, "expected at least two ticks, saw {}", seen);

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), seen);
    }

    #[tokio::test]
    async fn test_dropping_handle_stops_task() {
        let (handle, join) =
            PeriodicTask::new("dropped", Duration::from_millis(5)).spawn(|| async {});
        drop(handle);
        tokio::time::timeout(Duration::from_secs(1), join)
            .await
            .expect("task should stop when its handle is dropped")
            .unwrap();
    }
}
