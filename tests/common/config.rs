//! Loader configurations for integration tests

use std::time::Duration;
use texture_loader::{Config, FetchConfig, RetryConfig};

/// Config with fast retries so failing HTTP sources settle quickly
pub fn test_config(workers: usize) -> Config {
    Config {
        workers,
        shutdown_timeout: Duration::from_secs(5),
        fetch: FetchConfig {
            timeout: Duration::from_secs(5),
            retry: RetryConfig {
                max_attempts: 2,
                initial_delay: Duration::from_millis(10),
                max_delay: Duration::from_millis(50),
                backoff_multiplier: 2.0,
                jitter: false,
            },
            ..Default::default()
        },
        ..Default::default()
    }
}
