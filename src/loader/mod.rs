//! Texture loader split into focused submodules.
//!
//! The `TextureLoader` struct and its methods are organized by concern:
//! - [`enqueue`] - Accepting load requests and deriving tags
//! - [`directory`] - Directory scanning for recognized image files
//! - [`worker`] - The worker pool draining the queue
//! - [`lifecycle`] - Shutdown and asset release

mod directory;
mod enqueue;
mod lifecycle;
mod worker;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::Config;
use crate::error::Result;
use crate::fetcher::{DefaultFetcher, Fetcher};
use crate::progress::{ProgressAggregator, ProgressObserver};
use crate::queue::WorkQueue;
use crate::results::{ResultTable, TableSnapshot};
use crate::types::{AssetHandle, Event, LoadOutcome, LoadStats};

use worker::{WorkerContext, WorkerPool};

/// Main loader instance (cloneable - all fields are Arc-wrapped)
///
/// Workers start as soon as the loader is built and keep running until
/// [`shutdown`](Self::shutdown) is called or the last clone is dropped.
#[derive(Clone)]
pub struct TextureLoader {
    /// Configuration the loader was built with
    pub(crate) config: Arc<Config>,
    /// Pending requests shared with the workers
    pub(crate) queue: Arc<WorkQueue>,
    /// Completed outcomes and the tag lookup
    pub(crate) results: Arc<ResultTable>,
    /// Completed/total counters and observer delivery
    pub(crate) progress: Arc<ProgressAggregator>,
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: tokio::sync::broadcast::Sender<Event>,
    /// Running workers
    pub(crate) pool: Arc<WorkerPool>,
    /// Set to false when shutdown begins
    pub(crate) accepting_new: Arc<AtomicBool>,
}

/// Builder for a [`TextureLoader`] with a custom fetcher or an observer
/// registered before any work starts
pub struct LoaderBuilder {
    config: Config,
    fetcher: Option<Arc<dyn Fetcher>>,
    observer: Option<ProgressObserver>,
}

impl LoaderBuilder {
    /// Use `fetcher` instead of [`DefaultFetcher`]
    pub fn fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Register the progress observer before the workers start
    pub fn observer(mut self, observer: ProgressObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Validate the configuration, start the workers and load the initial directory
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) for invalid settings and
    /// [`Error::Io`](crate::Error::Io) if the initial directory cannot be read.
    pub async fn build(self) -> Result<TextureLoader> {
        let LoaderBuilder {
            config,
            fetcher,
            observer,
        } = self;
        config.validate()?;

        let fetcher: Arc<dyn Fetcher> = match fetcher {
            Some(fetcher) => fetcher,
            None => Arc::new(DefaultFetcher::new(config.fetch.clone())?),
        };

        let (event_tx, _rx) = tokio::sync::broadcast::channel(config.event_buffer);
        let queue = Arc::new(WorkQueue::new());
        let results = Arc::new(ResultTable::new());
        let progress = Arc::new(ProgressAggregator::new(event_tx.clone()));
        if let Some(observer) = observer {
            progress.set_observer(observer)?;
        }

        let pool = WorkerPool::spawn(
            config.workers,
            WorkerContext {
                queue: queue.clone(),
                results: results.clone(),
                progress: progress.clone(),
                fetcher,
            },
        );
        tracing::info!(workers = config.workers, "Texture loader started");

        let initial_directory = config.initial_directory.clone();
        let loader = TextureLoader {
            config: Arc::new(config),
            queue,
            results,
            progress,
            event_tx,
            pool: Arc::new(pool),
            accepting_new: Arc::new(AtomicBool::new(true)),
        };

        if let Some(dir) = initial_directory {
            loader.load_directory(&dir).await?;
        }

        Ok(loader)
    }
}

impl TextureLoader {
    /// Create a loader with the [`DefaultFetcher`] and start its workers
    ///
    /// # Errors
    ///
    /// See [`LoaderBuilder::build`].
    pub async fn new(config: Config) -> Result<Self> {
        Self::builder(config).build().await
    }

    /// Start configuring a loader
    pub fn builder(config: Config) -> LoaderBuilder {
        LoaderBuilder {
            config,
            fetcher: None,
            observer: None,
        }
    }

    /// Register the progress observer
    ///
    /// Only one observer may ever be registered. It runs on the worker that
    /// completed the item, so it must be thread-safe and should return quickly:
    /// a slow observer stalls that worker.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ObserverAlreadySet`](crate::Error::ObserverAlreadySet)
    /// on a second registration.
    pub fn set_observer(&self, observer: ProgressObserver) -> Result<()> {
        self.progress.set_observer(observer)
    }

    /// Subscribe to loader events
    ///
    /// Each subscriber receives all events independently. A subscriber that
    /// falls behind by more than `event_buffer` events gets `RecvError::Lagged`.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Get the configuration the loader was built with
    pub fn get_config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    /// Successfully loaded assets in completion order (snapshot at call time)
    pub fn available_assets(&self) -> Vec<AssetHandle> {
        self.results.available_assets()
    }

    /// Every processed outcome in completion order, failures included
    pub fn all_outcomes(&self) -> Vec<LoadOutcome> {
        self.results.outcomes()
    }

    /// Asset last loaded under `tag`
    pub fn get(&self, tag: &str) -> Option<AssetHandle> {
        self.results.get(tag)
    }

    /// Consistent copy of the outcome log and the tag map
    pub fn snapshot(&self) -> TableSnapshot {
        self.results.snapshot()
    }

    /// Current counters
    pub fn stats(&self) -> LoadStats {
        // completed first: total only grows, so completed <= total holds
        let completed = self.results.completed();
        let total = self.progress.total();
        LoadStats {
            total,
            completed,
            pending: self.queue.len(),
            is_complete: completed == total,
            accepting_new: self.accepting_new.load(Ordering::SeqCst),
        }
    }

    /// Wait until every request enqueued so far has been processed
    ///
    /// Also returns once shutdown has begun, since abandoned requests never
    /// complete.
    pub async fn wait_for_completion(&self) {
        tokio::select! {
            _ = self.progress.wait_settled() => {}
            _ = self.pool.cancelled() => {}
        }
    }

    /// Number of workers in the pool
    pub fn worker_count(&self) -> usize {
        self.pool.size()
    }
}
