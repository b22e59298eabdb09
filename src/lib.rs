//! # texture-loader
//!
//! Concurrent batch loader for image assets.
//!
//! Callers enqueue locators (file paths or URLs) and a fixed pool of workers
//! fetches them in parallel. Every processed request lands in a result table
//! keyed by a short tag derived from the file name, and a progress observer is
//! told about each completion.
//!
//! ## Design Philosophy
//!
//! - **Fixed concurrency** - `workers` fetches at most, however much is queued
//! - **Failures are data** - a failed fetch is recorded, never retried by the pool
//! - **Event-driven** - progress arrives through an observer or a broadcast channel
//! - **Pluggable sources** - anything implementing [`Fetcher`] can feed the pool
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use texture_loader::{Config, TextureLoader, log_progress};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let loader = TextureLoader::builder(Config::default())
//!         .observer(Arc::new(log_progress))
//!         .build()
//!         .await?;
//!
//!     loader.enqueue("file:///assets/grass.png")?;
//!     loader.enqueue("https://cdn.example.com/textures/stone.dds")?;
//!     loader.load_directory("/assets/terrain").await?;
//!
//!     loader.wait_for_completion().await;
//!     if let Some(grass) = loader.get("grass") {
//!         println!("grass: {} bytes", grass.len());
//!     }
//!
//!     loader.shutdown().await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Asset sources
pub mod fetcher;
/// The loader itself (decomposed into focused submodules)
pub mod loader;
/// Progress counters and observer delivery
pub mod progress;
/// Shared FIFO of pending requests
pub mod queue;
/// Outcome log and tag lookup
pub mod results;
/// Retry logic with exponential backoff
pub mod retry;
/// Tag derivation and file helpers
pub mod tag;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use config::{Config, FetchConfig, RetryConfig};
pub use error::{Error, FetchError, Result};
pub use fetcher::{DefaultFetcher, Fetcher};
pub use loader::{LoaderBuilder, TextureLoader};
pub use progress::{ProgressAggregator, ProgressObserver, log_progress};
pub use queue::WorkQueue;
pub use results::{ResultTable, TableSnapshot};
pub use tag::derive_tag;
pub use types::{
    Asset, AssetHandle, Event, ImageFormat, LoadOutcome, LoadRequest, LoadStats, ProgressSnapshot,
};
