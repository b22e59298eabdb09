//! Progress aggregation across all workers.
//!
//! `total` grows once per accepted enqueue. The completed count is owned by
//! the [`ResultTable`](crate::results::ResultTable), which bumps it in the same
//! step that appends the outcome; workers pass that value in. After every
//! completion the aggregator builds a [`ProgressSnapshot`] and hands it to the
//! registered observer on the completing worker's task.
//!
//! Delivery is not serialized through a single dispatch point. Each worker
//! calls the observer directly, so the observer must be thread-safe and a slow
//! observer only stalls the worker that is delivering to it. Snapshots from
//! different workers may arrive out of order; `completed` within each snapshot
//! is unique and never decreases from the counter's point of view.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use tokio::sync::{Notify, broadcast};

use crate::error::{Error, Result};
use crate::types::{Event, LoadOutcome, ProgressSnapshot};

/// Callback invoked with every progress snapshot
pub type ProgressObserver = Arc<dyn Fn(&ProgressSnapshot) + Send + Sync>;

/// Shared total counter plus observer delivery
pub struct ProgressAggregator {
    total: AtomicUsize,
    /// Completions whose events and observer call have finished
    delivered: AtomicUsize,
    observer: OnceLock<ProgressObserver>,
    event_tx: broadcast::Sender<Event>,
    settled: Notify,
}

impl ProgressAggregator {
    /// Create an aggregator that also publishes events on `event_tx`
    pub fn new(event_tx: broadcast::Sender<Event>) -> Self {
        Self {
            total: AtomicUsize::new(0),
            delivered: AtomicUsize::new(0),
            observer: OnceLock::new(),
            event_tx,
            settled: Notify::new(),
        }
    }

    /// Register the observer
    ///
    /// # Errors
    ///
    /// Returns [`Error::ObserverAlreadySet`] if an observer is already registered.
    pub fn set_observer(&self, observer: ProgressObserver) -> Result<()> {
        self.observer
            .set(observer)
            .map_err(|_| Error::ObserverAlreadySet)
    }

    /// Count one more enqueued request, returning the new total
    pub fn record_enqueued(&self) -> usize {
        self.total.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Undo [`record_enqueued`](Self::record_enqueued) for a request the queue rejected
    pub fn retract_enqueued(&self) {
        self.total.fetch_sub(1, Ordering::SeqCst);
    }

    /// Deliver the snapshot for a processed item
    ///
    /// `completed` is the count returned by
    /// [`ResultTable::record_outcome`](crate::results::ResultTable::record_outcome)
    /// for this outcome.
    pub fn on_completed(&self, outcome: LoadOutcome, completed: usize) -> ProgressSnapshot {
        // total is bumped before the request becomes visible to workers,
        // so it is always >= completed here.
        let total = self.total.load(Ordering::SeqCst);
        let is_complete = completed == total;

        let snapshot = ProgressSnapshot {
            completed,
            total,
            is_complete,
            last: outcome,
        };

        self.event_tx
            .send(Event::Loaded {
                tag: snapshot.last.tag.clone(),
                locator: snapshot.last.locator.clone(),
                success: snapshot.last.success,
                completed,
                total,
            })
            .ok();

        if is_complete {
            tracing::info!(total, "All queued textures processed");
            self.event_tx.send(Event::BatchComplete { total }).ok();
        }

        // A panicking observer must not take the worker down with it.
        if let Some(observer) = self.observer.get()
            && panic::catch_unwind(AssertUnwindSafe(|| observer(&snapshot))).is_err()
        {
            tracing::error!(completed, total, "Progress observer panicked");
        }

        let delivered = self.delivered.fetch_add(1, Ordering::SeqCst) + 1;
        if delivered >= self.total() {
            self.settled.notify_waiters();
        }

        snapshot
    }

    /// Items enqueued so far
    pub fn total(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    /// Wait until every request counted so far has completed and its snapshot
    /// has been delivered
    pub async fn wait_settled(&self) {
        loop {
            let notified = self.settled.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.delivered.load(Ordering::SeqCst) >= self.total() {
                return;
            }

            notified.await;
        }
    }
}

/// Observer that logs every snapshot through `tracing`
///
/// ```
/// use std::sync::Arc;
/// use texture_loader::progress::{ProgressObserver, log_progress};
///
/// let observer: ProgressObserver = Arc::new(log_progress);
/// # let _ = observer;
/// ```
pub fn log_progress(snapshot: &ProgressSnapshot) {
    tracing::debug!(
        completed = snapshot.completed,
        total = snapshot.total,
        complete = snapshot.is_complete,
        locator = %snapshot.last.locator,
        success = snapshot.last.success,
        "{}/{} {}",
        snapshot.completed,
        snapshot.total,
        snapshot.is_complete
    );
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LoadRequest;
    use std::sync::Mutex;
    use std::time::Duration;

    fn outcome(n: usize) -> LoadOutcome {
        LoadOutcome::failed(LoadRequest::new(format!("/{n}.png"), n.to_string()), "x")
    }

    fn aggregator() -> (ProgressAggregator, broadcast::Receiver<Event>) {
        let (tx, rx) = broadcast::channel(64);
        (ProgressAggregator::new(tx), rx)
    }

    #[test]
    fn snapshot_reports_counts_and_completion() {
        let (progress, _rx) = aggregator();
        progress.record_enqueued();
        progress.record_enqueued();

        let first = progress.on_completed(outcome(1), 1);
        assert_eq!((first.completed, first.total), (1, 2));
        assert!(!first.is_complete);

        let second = progress.on_completed(outcome(2), 2);
        assert_eq!((second.completed, second.total), (2, 2));
        assert!(second.is_complete);
        assert_eq!(second.last.tag, "2");
    }

    #[test]
    fn total_can_grow_after_completions() {
        let (progress, _rx) = aggregator();
        progress.record_enqueued();
        assert!(progress.on_completed(outcome(1), 1).is_complete);

        progress.record_enqueued();
        let snapshot = progress.on_completed(outcome(2), 2);
        assert_eq!((snapshot.completed, snapshot.total), (2, 2));
    }

    #[test]
    fn observer_receives_every_snapshot() {
        let (progress, _rx) = aggregator();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        progress
            .set_observer(Arc::new(move |s: &ProgressSnapshot| {
                sink.lock().unwrap().push(s.completed)
            }))
            .unwrap();

        for n in 1..=3 {
            progress.record_enqueued();
            progress.on_completed(outcome(n), n);
        }
        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn observer_can_only_be_registered_once() {
        let (progress, _rx) = aggregator();
        progress.set_observer(Arc::new(log_progress)).unwrap();
        assert!(matches!(
            progress.set_observer(Arc::new(log_progress)),
            Err(Error::ObserverAlreadySet)
        ));
    }

    #[test]
    fn completion_publishes_loaded_and_batch_complete_events() {
        let (progress, mut rx) = aggregator();
        progress.record_enqueued();
        progress.on_completed(outcome(9), 1);

        match rx.try_recv().unwrap() {
            Event::Loaded {
                tag,
                success,
                completed,
                total,
                ..
            } => {
                assert_eq!(tag, "9");
                assert!(!success);
                assert_eq!((completed, total), (1, 1));
            }
            other => panic!("expected Loaded, got {:?}", other),
        }
        assert_eq!(rx.try_recv().unwrap(), Event::BatchComplete { total: 1 });
    }

    #[tokio::test]
    async fn wait_settled_returns_once_counts_meet() {
        let (progress, _rx) = aggregator();
        let progress = Arc::new(progress);
        progress.record_enqueued();

        let waiter = {
            let progress = progress.clone();
            tokio::spawn(async move { progress.wait_settled().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        progress.on_completed(outcome(1), 1);
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter not released")
            .unwrap();
    }

    #[tokio::test]
    async fn wait_settled_is_immediate_when_idle() {
        let (progress, _rx) = aggregator();
        tokio::time::timeout(Duration::from_millis(100), progress.wait_settled())
            .await
            .expect("idle aggregator should not wait");
    }
}
