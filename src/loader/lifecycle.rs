//! Shutdown coordination.

use std::sync::atomic::Ordering;

use crate::error::Result;
use crate::types::Event;

use super::TextureLoader;

impl TextureLoader {
    /// Stop the loader and release every cached asset
    ///
    /// The shutdown sequence:
    /// 1. Stops accepting new requests (later enqueues fail with
    ///    [`Error::ShuttingDown`](crate::Error::ShuttingDown))
    /// 2. Closes the queue, abandoning requests no worker has taken yet
    /// 3. Cancels the workers; in-flight fetches are dropped and not recorded
    /// 4. Waits for every worker to exit (aborting them after `shutdown_timeout`)
    /// 5. Releases the cached assets and clears the outcome log
    ///
    /// Calling it again is a no-op. Assets stay alive only as long as callers
    /// hold their own [`AssetHandle`](crate::AssetHandle)s.
    pub async fn shutdown(&self) -> Result<()> {
        if !self.accepting_new.swap(false, Ordering::SeqCst) {
            tracing::debug!("Shutdown already in progress");
            return Ok(());
        }
        tracing::info!("Initiating shutdown");

        let abandoned = self.queue.close();
        tracing::info!(abandoned, "Stopped accepting new requests");

        self.pool.stop(self.config.shutdown_timeout).await;
        tracing::info!(workers = self.pool.size(), "All workers stopped");

        // Workers are gone, nothing writes to the table any more.
        let released = self.results.release_all();
        tracing::info!(released, "Released cached textures");

        self.event_tx.send(Event::Shutdown).ok();
        tracing::info!("Shutdown complete");
        Ok(())
    }
}
