//! Error types for texture-loader
//!
//! Two families of errors exist:
//! - [`Error`] is returned to callers of the [`TextureLoader`](crate::TextureLoader)
//!   API (configuration, shutdown races, rejected locators).
//! - [`FetchError`] describes why a single item could not be fetched. It never
//!   crosses a worker's loop boundary; workers fold it into the recorded
//!   [`LoadOutcome`](crate::types::LoadOutcome).

use thiserror::Error;

/// Result type alias for texture-loader operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for texture-loader
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "workers")
        key: Option<String>,
    },

    /// I/O error (directory enumeration)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Shutdown in progress - not accepting new load requests
    #[error("shutdown in progress: not accepting new load requests")]
    ShuttingDown,

    /// No tag could be derived from the locator (only raised with `strict_tags`)
    #[error("cannot derive a tag from locator: {0}")]
    MalformedLocator(String),

    /// A progress observer has already been registered
    #[error("a progress observer is already registered")]
    ObserverAlreadySet,
}

/// Failure to fetch a single locator
#[derive(Debug, Error)]
pub enum FetchError {
    /// Reading a local file failed
    #[error("failed to read {locator}: {source}")]
    Io {
        /// The locator that was being read
        locator: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Remote server answered with a non-success status
    #[error("{locator} returned HTTP {status}")]
    Status {
        /// The locator that was requested
        locator: String,
        /// HTTP status code
        status: u16,
    },

    /// Transport-level HTTP failure
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Locator could not be parsed as a URI or path
    #[error("invalid locator: {0}")]
    InvalidLocator(String),

    /// URI scheme is neither file nor http(s)
    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),
}
