//! Directory scanning for recognized image files.

use std::path::Path;

use crate::error::Result;
use crate::tag::{file_locator, is_texture_file};

use super::TextureLoader;

impl TextureLoader {
    /// Queue every recognized image file directly inside `dir`
    ///
    /// The scan is not recursive. Files are matched by extension
    /// (jpg, png, dds, tga; any case), converted to `file://` locators with
    /// forward slashes, and queued in file-name order through
    /// [`enqueue`](Self::enqueue). Returns the number of requests queued.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`](crate::Error::Io) if the directory cannot be read,
    /// and any error [`enqueue`](Self::enqueue) returns.
    pub async fn load_directory(&self, dir: impl AsRef<Path>) -> Result<usize> {
        let dir = dir.as_ref();
        let mut entries = tokio::fs::read_dir(dir).await?;

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !is_texture_file(&path) {
                continue;
            }
            // metadata() follows symlinks, unlike DirEntry::file_type()
            match tokio::fs::metadata(&path).await {
                Ok(meta) if meta.is_file() => files.push(path),
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable entry");
                }
            }
        }
        files.sort();

        let mut queued = 0;
        for path in &files {
            if self.enqueue(file_locator(path))?.is_some() {
                queued += 1;
            }
        }

        tracing::info!(
            directory = %dir.display(),
            found = files.len(),
            queued,
            "Directory scanned"
        );
        Ok(queued)
    }
}
