//! Accepting load requests.

use std::sync::atomic::Ordering;

use crate::error::{Error, Result};
use crate::tag::derive_tag;
use crate::types::{Event, LoadRequest};

use super::TextureLoader;

impl TextureLoader {
    /// Queue a locator, deriving its tag from the file stem
    ///
    /// The tag is the lower-cased stem before the final extension, so
    /// `file:///a/b/My-Texture_01.PNG` is stored under `my-texture_01`.
    ///
    /// Returns the derived tag, or `Ok(None)` when no tag can be derived and
    /// the request is dropped without being counted. With `strict_tags` set,
    /// such locators are rejected with [`Error::MalformedLocator`] instead.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShuttingDown`] after [`shutdown`](Self::shutdown).
    pub fn enqueue(&self, locator: impl Into<String>) -> Result<Option<String>> {
        let locator = locator.into();

        let Some(tag) = derive_tag(&locator) else {
            if self.config.strict_tags {
                return Err(Error::MalformedLocator(locator));
            }
            tracing::debug!(%locator, "No tag derivable from locator, dropping request");
            return Ok(None);
        };

        self.enqueue_tagged(locator, tag.clone())?;
        Ok(Some(tag))
    }

    /// Queue a locator under an explicit tag (used as given, not lower-cased)
    ///
    /// A later request with the same tag replaces the earlier asset in the tag
    /// lookup once it completes; both stay in the outcome log.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShuttingDown`] after [`shutdown`](Self::shutdown).
    pub fn enqueue_tagged(&self, locator: impl Into<String>, tag: impl Into<String>) -> Result<()> {
        if !self.accepting_new.load(Ordering::SeqCst) {
            return Err(Error::ShuttingDown);
        }

        let locator = locator.into();
        let tag = tag.into();
        let request = LoadRequest::new(locator.clone(), tag.clone());

        // Count before the request becomes visible to workers so that
        // completed can never overtake total.
        let total = self.progress.record_enqueued();
        if let Err(e) = self.queue.enqueue(request) {
            self.progress.retract_enqueued();
            return Err(e);
        }

        tracing::debug!(%tag, %locator, total, "Texture queued");
        self.event_tx.send(Event::Queued { tag, locator }).ok();
        Ok(())
    }
}
