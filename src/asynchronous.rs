//! Async probing.
//!
//! Native calls block, so [`MediaProbe::probe_async`] runs the whole probe
//! (session construction included) on `tokio::task::spawn_blocking`. The
//! session lives and dies on that blocking thread.

use std::path::PathBuf;

use crate::error::MediaInfoError;
use crate::metadata::MediaMetadata;
use crate::probe::MediaProbe;

impl MediaProbe {
    /// Probe a media file without blocking the async runtime.
    ///
    /// # Errors
    ///
    /// Everything [`MediaProbe::probe`] returns, plus
    /// [`MediaInfoError::BackgroundTask`] if the blocking task panicked.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use mediainfo::MediaProbe;
    ///
    /// # async fn example() -> Result<(), mediainfo::MediaInfoError> {
    /// let metadata = MediaProbe::probe_async("input.mp4").await?;
    /// println!("{}", metadata.format);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn probe_async<P: Into<PathBuf>>(path: P) -> Result<MediaMetadata, MediaInfoError> {
        let path = path.into();
        tokio::task::spawn_blocking(move || MediaProbe::probe(&path)).await?
    }
}
