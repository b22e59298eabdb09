//! Worker pool: a fixed set of tasks draining the shared queue.
//!
//! Each worker loops: take one request (waiting while the queue is empty),
//! fetch it, record the outcome, report progress. A failed or panicking fetch
//! becomes a `success = false` outcome and the worker moves on. Nothing is
//! retried here.
//!
//! On shutdown the cancellation token fires. Workers waiting on the queue exit
//! immediately; in-flight fetches are dropped and their items are neither
//! recorded nor counted as completed.

use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures::FutureExt;
use tokio::task::JoinSet;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

use crate::fetcher::Fetcher;
use crate::progress::ProgressAggregator;
use crate::queue::WorkQueue;
use crate::results::ResultTable;
use crate::types::{Asset, ImageFormat, LoadOutcome, LoadRequest};

/// Shared state handed to every worker
#[derive(Clone)]
pub(crate) struct WorkerContext {
    pub(crate) queue: Arc<WorkQueue>,
    pub(crate) results: Arc<ResultTable>,
    pub(crate) progress: Arc<ProgressAggregator>,
    pub(crate) fetcher: Arc<dyn Fetcher>,
}

/// Handles of the running workers plus their shared stop signal
///
/// Dropping the pool aborts any worker still running.
pub(crate) struct WorkerPool {
    workers: Mutex<JoinSet<()>>,
    cancel: CancellationToken,
    size: usize,
}

impl WorkerPool {
    /// Spawn `size` workers on the current runtime
    pub(crate) fn spawn(size: usize, ctx: WorkerContext) -> Self {
        let cancel = CancellationToken::new();
        let mut workers = JoinSet::new();
        for worker_id in 0..size {
            workers.spawn(run_worker(worker_id, ctx.clone(), cancel.clone()));
        }
        Self {
            workers: Mutex::new(workers),
            cancel,
            size,
        }
    }

    pub(crate) fn size(&self) -> usize {
        self.size
    }

    /// Resolves once [`stop`](Self::stop) has been called
    pub(crate) fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.cancel.cancelled()
    }

    /// Signal every worker to stop and wait until all of them have exited
    ///
    /// Workers that are still running after `timeout` are aborted. When this
    /// returns no worker touches the result table any more.
    pub(crate) async fn stop(&self, timeout: Duration) {
        self.cancel.cancel();

        let mut workers = {
            let mut guard = self.workers.lock().unwrap_or_else(PoisonError::into_inner);
            std::mem::take(&mut *guard)
        };

        let drained = tokio::time::timeout(timeout, async {
            while let Some(joined) = workers.join_next().await {
                if let Err(e) = joined
                    && e.is_panic()
                {
                    tracing::error!(error = %e, "Worker panicked");
                }
            }
        })
        .await;

        if drained.is_err() {
            tracing::warn!(
                remaining = workers.len(),
                "Timeout waiting for workers to stop, aborting"
            );
            workers.shutdown().await;
        }
    }
}

/// Worker loop body
async fn run_worker(worker_id: usize, ctx: WorkerContext, cancel: CancellationToken) {
    tracing::debug!(worker_id, "Worker started");

    loop {
        let request = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            request = ctx.queue.take_or_wait() => match request {
                Some(request) => request,
                None => break,
            },
        };

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!(
                    worker_id,
                    locator = %request.locator,
                    "Abandoning in-flight fetch on shutdown"
                );
                break;
            }
            outcome = load(&ctx, request.clone()) => outcome,
        };

        let completed = ctx.results.record_outcome(outcome.clone());
        ctx.progress.on_completed(outcome, completed);
    }

    tracing::debug!(worker_id, "Worker stopped");
}

/// Fetch one request and turn the result into an outcome
async fn load(ctx: &WorkerContext, request: LoadRequest) -> LoadOutcome {
    let fetched = AssertUnwindSafe(ctx.fetcher.fetch(&request.locator))
        .catch_unwind()
        .await;

    match fetched {
        Ok(Ok(bytes)) => {
            let asset = Arc::new(Asset {
                format: ImageFormat::from_locator(&request.locator),
                locator: request.locator.clone(),
                bytes,
            });
            tracing::debug!(
                tag = %request.tag,
                locator = %request.locator,
                bytes = asset.len(),
                "Texture loaded"
            );
            LoadOutcome::loaded(request, asset)
        }
        Ok(Err(e)) => {
            tracing::warn!(
                tag = %request.tag,
                locator = %request.locator,
                error = %e,
                "Texture failed to load"
            );
            LoadOutcome::failed(request, e)
        }
        Err(_) => {
            tracing::error!(locator = %request.locator, "Fetcher panicked");
            LoadOutcome::failed(request, "fetcher panicked")
        }
    }
}
