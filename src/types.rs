//! Core types for texture-loader

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Image container formats recognized by the directory scanner
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// `.jpg`
    Jpeg,
    /// `.png`
    Png,
    /// `.dds`
    Dds,
    /// `.tga`
    Tga,
}

impl ImageFormat {
    /// All recognized formats
    pub const ALL: [ImageFormat; 4] = [
        ImageFormat::Jpeg,
        ImageFormat::Png,
        ImageFormat::Dds,
        ImageFormat::Tga,
    ];

    /// Map a file extension (without the dot, any case) to a format
    pub fn from_extension(ext: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|format| ext.eq_ignore_ascii_case(format.extension()))
    }

    /// Detect the format from the trailing extension of a locator or path
    pub fn from_locator(locator: &str) -> Option<Self> {
        let name = locator.rsplit(['/', '\\']).next().unwrap_or(locator);
        let (_, ext) = name.rsplit_once('.')?;
        Self::from_extension(ext)
    }

    /// Canonical extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Png => "png",
            ImageFormat::Dds => "dds",
            ImageFormat::Tga => "tga",
        }
    }
}

/// A pending load: where to fetch from and the key to store the result under
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LoadRequest {
    /// URI or path of the asset
    pub locator: String,
    /// Lookup key (derived tags are lower-cased)
    pub tag: String,
}

impl LoadRequest {
    /// Create a new request
    pub fn new(locator: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            locator: locator.into(),
            tag: tag.into(),
        }
    }
}

/// Raw bytes of a successfully fetched asset
///
/// Decoding is left to the consumer; `format` only reflects the locator's
/// extension.
#[derive(Debug, PartialEq, Eq)]
pub struct Asset {
    /// Locator the bytes were fetched from
    pub locator: String,
    /// Format guessed from the locator extension
    pub format: Option<ImageFormat>,
    /// Fetched payload
    pub bytes: Vec<u8>,
}

impl Asset {
    /// Size of the payload in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the payload is empty
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Shared, cheaply clonable handle to a loaded asset
///
/// The payload is freed once the loader has released its copy at shutdown and
/// every caller-held handle has been dropped.
pub type AssetHandle = Arc<Asset>;

/// Result of processing one [`LoadRequest`]
#[derive(Clone, Debug)]
pub struct LoadOutcome {
    /// Tag of the request
    pub tag: String,
    /// Locator of the request
    pub locator: String,
    /// Loaded asset (None when the fetch failed)
    pub asset: Option<AssetHandle>,
    /// Whether the fetch succeeded
    pub success: bool,
    /// Fetch error message for failed loads
    pub error: Option<String>,
    /// When the worker finished this item
    pub completed_at: DateTime<Utc>,
}

impl LoadOutcome {
    /// Build a successful outcome
    pub fn loaded(request: LoadRequest, asset: AssetHandle) -> Self {
        Self {
            tag: request.tag,
            locator: request.locator,
            asset: Some(asset),
            success: true,
            error: None,
            completed_at: Utc::now(),
        }
    }

    /// Build a failed outcome
    pub fn failed(request: LoadRequest, error: impl fmt::Display) -> Self {
        Self {
            tag: request.tag,
            locator: request.locator,
            asset: None,
            success: false,
            error: Some(error.to_string()),
            completed_at: Utc::now(),
        }
    }
}

/// Point-in-time progress delivered to the observer after every completion
#[derive(Clone, Debug)]
pub struct ProgressSnapshot {
    /// Items completed so far (successes and failures)
    pub completed: usize,
    /// Items enqueued so far
    pub total: usize,
    /// `completed == total` at the time of the snapshot
    pub is_complete: bool,
    /// The outcome whose completion produced this snapshot
    pub last: LoadOutcome,
}

impl fmt::Display for ProgressSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}/{} {}", self.completed, self.total, self.is_complete)?;
        write!(f, "{}", self.last.locator)
    }
}

/// Event emitted on the loader's broadcast channel
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Request accepted into the queue
    Queued {
        /// Request tag
        tag: String,
        /// Request locator
        locator: String,
    },

    /// A worker finished an item
    Loaded {
        /// Request tag
        tag: String,
        /// Request locator
        locator: String,
        /// Whether the fetch succeeded
        success: bool,
        /// Completed count after this item
        completed: usize,
        /// Total count at the time of completion
        total: usize,
    },

    /// Every item enqueued so far has completed
    BatchComplete {
        /// Number of items in the batch
        total: usize,
    },

    /// Loader shut down; no further events follow
    Shutdown,
}

/// Aggregate counters returned by [`TextureLoader::stats`](crate::TextureLoader::stats)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadStats {
    /// Requests enqueued
    pub total: usize,
    /// Requests processed (successes and failures)
    pub completed: usize,
    /// Requests still waiting in the queue
    pub pending: usize,
    /// `completed == total`
    pub is_complete: bool,
    /// Whether new requests are accepted
    pub accepting_new: bool,
}
