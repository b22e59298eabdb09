//! Completed load outcomes, kept in two views.
//!
//! - an append-only log in completion order (failures included)
//! - a tag -> asset map where the last write for a tag wins
//!
//! Both views are updated under one lock so a reader never sees an outcome in
//! the log that is missing from the map, or the reverse. Concurrent writes to
//! the same tag are not ordered beyond "one of them wins cleanly".
//!
//! The table is also the single source of the completed count: the count is
//! bumped in the same critical section as the append, so the log is never
//! observed ahead of it.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::types::{AssetHandle, LoadOutcome};

#[derive(Default)]
struct TableInner {
    outcomes: Vec<LoadOutcome>,
    /// Outcomes ever recorded; survives `release_all`
    recorded: usize,
    assets: HashMap<String, Option<AssetHandle>>,
}

/// Consistent copy of the table taken under a single lock
#[derive(Clone, Debug, Default)]
pub struct TableSnapshot {
    /// Every outcome recorded so far, in completion order
    pub outcomes: Vec<LoadOutcome>,
    /// Last-written asset per tag (None for tags whose last load failed)
    pub assets: HashMap<String, Option<AssetHandle>>,
}

/// Concurrent store of [`LoadOutcome`]s
#[derive(Default)]
pub struct ResultTable {
    inner: Mutex<TableInner>,
}

impl ResultTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, TableInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append to the log, upsert the tag map and count the completion in one step
    ///
    /// Returns the completed count including this outcome.
    pub fn record_outcome(&self, outcome: LoadOutcome) -> usize {
        let mut inner = self.lock();
        inner
            .assets
            .insert(outcome.tag.clone(), outcome.asset.clone());
        inner.outcomes.push(outcome);
        inner.recorded += 1;
        inner.recorded
    }

    /// Outcomes recorded since the table was created
    ///
    /// Equals [`len`](Self::len) until [`release_all`](Self::release_all)
    /// clears the log; the count itself is never reset.
    pub fn completed(&self) -> usize {
        self.lock().recorded
    }

    /// Copy both views
    pub fn snapshot(&self) -> TableSnapshot {
        let inner = self.lock();
        TableSnapshot {
            outcomes: inner.outcomes.clone(),
            assets: inner.assets.clone(),
        }
    }

    /// The full outcome log in completion order
    pub fn outcomes(&self) -> Vec<LoadOutcome> {
        self.lock().outcomes.clone()
    }

    /// Successfully loaded assets in completion order
    ///
    /// This is a snapshot at call time; completions racing with the call may or
    /// may not be included.
    pub fn available_assets(&self) -> Vec<AssetHandle> {
        self.lock()
            .outcomes
            .iter()
            .filter(|outcome| outcome.success)
            .filter_map(|outcome| outcome.asset.clone())
            .collect()
    }

    /// Asset most recently recorded under `tag`
    pub fn get(&self, tag: &str) -> Option<AssetHandle> {
        self.lock().assets.get(tag).cloned().flatten()
    }

    /// Number of outcomes recorded
    pub fn len(&self) -> usize {
        self.lock().outcomes.len()
    }

    /// Whether nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached asset and clear both views
    ///
    /// Returns how many assets the table was holding. Call only after all
    /// writers have stopped.
    pub fn release_all(&self) -> usize {
        let mut inner = self.lock();
        let released = inner.assets.values().filter(|asset| asset.is_some()).count();
        inner.assets.clear();
        inner.outcomes.clear();
        released
    }
}
