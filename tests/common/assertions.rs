//! Custom test assertions for integration tests

use std::time::Duration;
use texture_loader::{Event, TextureLoader};

/// Wait for the loader to settle, panicking after `timeout`
pub async fn wait_settled(loader: &TextureLoader, timeout: Duration) {
    tokio::time::timeout(timeout, loader.wait_for_completion())
        .await
        .expect("Timeout waiting for the batch to complete");
}

/// Drain every event currently buffered on `events`
pub fn drain_events(events: &mut tokio::sync::broadcast::Receiver<Event>) -> Vec<Event> {
    let mut drained = Vec::new();
    while let Ok(event) = events.try_recv() {
        drained.push(event);
    }
    drained
}

/// Assert that the counters agree with the outcome log
pub fn assert_consistent(loader: &TextureLoader) {
    let stats = loader.stats();
    let outcomes = loader.all_outcomes();
    assert!(
        stats.completed <= stats.total,
        "completed {} exceeds total {}",
        stats.completed,
        stats.total
    );
    assert_eq!(
        outcomes.len(),
        stats.completed,
        "outcome log length should equal completed count"
    );
}
