//! Retry logic with exponential backoff
//!
//! Used by [`DefaultFetcher`](crate::fetcher::DefaultFetcher) for transient
//! network failures on remote locators. The worker pool itself never retries:
//! a failed item is recorded and callers may re-enqueue it.
//!
//! # Example
//!
//! ```no_run
//! use texture_loader::retry::{IsRetryable, fetch_with_retry};
//! use texture_loader::config::RetryConfig;
//!
//! #[derive(Debug)]
//! enum MyError {
//!     Transient,
//!     Permanent,
//! }
//!
//! impl std::fmt::Display for MyError {
//!     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
//!         write!(f, "{:?}", self)
//!     }
//! }
//!
//! impl IsRetryable for MyError {
//!     fn is_retryable(&self) -> bool {
//!         matches!(self, MyError::Transient)
//!     }
//! }
//!
//! # async fn example() -> Result<(), MyError> {
//! let config = RetryConfig::default();
//! let bytes = fetch_with_retry(&config, || async {
//!     Ok::<_, MyError>(vec![0u8; 4])
//! }).await?;
//! # Ok(())
//! # }
//! ```

use crate::config::RetryConfig;
use crate::error::FetchError;
use rand::Rng;
use std::future::Future;
use std::time::Duration;

/// Trait for errors that can be classified as retryable or not
///
/// Transient failures (timeouts, refused connections, server errors) return `true`.
/// Permanent failures (missing file, 404, bad locator) return `false`.
pub trait IsRetryable {
    /// Returns true if the error is transient and the operation should be retried
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for FetchError {
    fn is_retryable(&self) -> bool {
        match self {
            FetchError::Network(e) => e.is_timeout() || e.is_connect(),
            // 5xx and 429 are worth another attempt, other statuses are final
            FetchError::Status { status, .. } => *status >= 500 || *status == 429,
            FetchError::Io { source, .. } => matches!(
                source.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::Interrupted
            ),
            FetchError::InvalidLocator(_) | FetchError::UnsupportedScheme(_) => false,
        }
    }
}

/// Run `operation`, retrying transient failures with exponential backoff
///
/// The first try is followed by up to `max_attempts` retries. Permanent errors
/// and the error of the last retry are returned as-is.
pub async fn fetch_with_retry<F, Fut, T, E>(config: &RetryConfig, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: IsRetryable + std::fmt::Display,
{
    let mut delay = config.initial_delay;

    for retry in 1..=config.max_attempts {
        match operation().await {
            Err(e) if e.is_retryable() => {
                let pause = if config.jitter { add_jitter(delay) } else { delay };
                tracing::warn!(
                    error = %e,
                    retry,
                    max_retries = config.max_attempts,
                    pause_ms = pause.as_millis(),
                    "Transient fetch failure, backing off"
                );
                tokio::time::sleep(pause).await;
                delay = delay
                    .mul_f64(config.backoff_multiplier)
                    .min(config.max_delay);
            }
            settled => return settled,
        }
    }

    operation().await
}

/// Add random jitter to a delay to prevent thundering herd
///
/// The result lies between `delay` and `2 * delay`.
fn add_jitter(delay: Duration) -> Duration {
    let mut rng = rand::thread_rng();
    let jitter_factor: f64 = rng.gen_range(0.0..=1.0);
    Duration::from_secs_f64(delay.as_secs_f64() * (1.0 + jitter_factor))
}
