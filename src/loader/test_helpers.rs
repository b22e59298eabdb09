//! Shared test helpers for creating TextureLoader instances in tests.

use crate::config::Config;
use crate::error::FetchError;
use crate::fetcher::Fetcher;
use crate::loader::TextureLoader;
use crate::progress::ProgressObserver;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// In-memory fetcher whose payload is the locator's own bytes
///
/// Records every call so tests can check for double dispatch, and tracks the
/// peak number of concurrent fetches.
#[derive(Default)]
pub(crate) struct MockFetcher {
    delay: Duration,
    fail_all: bool,
    failing: HashSet<String>,
    panicking: HashSet<String>,
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockFetcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Sleep this long inside every fetch
    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Fail every fetch with a 404
    pub(crate) fn always_failing(mut self) -> Self {
        self.fail_all = true;
        self
    }

    /// Fail fetches of these locators with a 404
    pub(crate) fn failing(mut self, locators: &[&str]) -> Self {
        self.failing = locators.iter().map(|l| l.to_string()).collect();
        self
    }

    /// Panic when fetching these locators
    pub(crate) fn panicking(mut self, locators: &[&str]) -> Self {
        self.panicking = locators.iter().map(|l| l.to_string()).collect();
        self
    }

    /// Locators fetched so far, in call order
    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Highest number of fetches observed running at once
    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

/// Decrements the in-flight counter even when the fetch future is dropped
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, locator: &str) -> Result<Vec<u8>, FetchError> {
        self.calls.lock().unwrap().push(locator.to_string());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if self.panicking.contains(locator) {
            panic!("mock fetcher asked to panic on {locator}");
        }
        if self.fail_all || self.failing.contains(locator) {
            return Err(FetchError::Status {
                locator: locator.to_string(),
                status: 404,
            });
        }
        Ok(locator.as_bytes().to_vec())
    }
}

/// Config with `workers` workers and a short shutdown timeout
pub(crate) fn test_config(workers: usize) -> Config {
    Config {
        workers,
        shutdown_timeout: Duration::from_secs(5),
        ..Default::default()
    }
}

/// Build a loader around `fetcher`
pub(crate) async fn create_test_loader(workers: usize, fetcher: Arc<MockFetcher>) -> TextureLoader {
    TextureLoader::builder(test_config(workers))
        .fetcher(fetcher)
        .build()
        .await
        .unwrap()
}

/// Build a loader around `fetcher` with an observer registered up front
pub(crate) async fn create_observed_loader(
    workers: usize,
    fetcher: Arc<MockFetcher>,
    observer: ProgressObserver,
) -> TextureLoader {
    TextureLoader::builder(test_config(workers))
        .fetcher(fetcher)
        .observer(observer)
        .build()
        .await
        .unwrap()
}

/// Wait for the batch to drain, failing the test after a few seconds
pub(crate) async fn wait_done(loader: &TextureLoader) {
    tokio::time::timeout(Duration::from_secs(10), loader.wait_for_completion())
        .await
        .expect("batch did not complete in time");
}

/// `file:///textures/{name}.png`
pub(crate) fn locator(name: &str) -> String {
    format!("file:///textures/{name}.png")
}
