//! One-shot media probing.
//!
//! [`MediaProbe`] opens a file, collects its [`MediaMetadata`], closes it and
//! releases the session, so callers that only want the summary never touch
//! the handle lifecycle. When the native library is unavailable and the
//! `ffmpeg` feature is enabled, probing falls back to FFmpeg's demuxer.

use std::path::Path;

use crate::configuration::SessionConfig;
use crate::error::MediaInfoError;
use crate::metadata::MediaMetadata;
use crate::session::{Session, SessionState};

/// Lightweight media file probe.
///
/// # Example
///
/// ```no_run
/// use mediainfo::MediaProbe;
///
/// let metadata = MediaProbe::probe("input.mp4")?;
/// println!("Format: {}, duration: {:?}", metadata.format, metadata.duration);
/// if let Some(video) = metadata.primary_video() {
///     println!("Video: {}x{} @ {} fps", video.width, video.height, video.frame_rate);
/// }
/// # Ok::<(), mediainfo::MediaInfoError>(())
/// ```
pub struct MediaProbe;

impl MediaProbe {
    /// Probe a media file and return its metadata.
    ///
    /// # Errors
    ///
    /// [`MediaInfoError::FileOpen`] if the library cannot open the file, and
    /// [`MediaInfoError::InvalidState`] if the library is unavailable and no
    /// fallback is compiled in.
    pub fn probe<P: AsRef<Path>>(path: P) -> Result<MediaMetadata, MediaInfoError> {
        Self::probe_and_dispose(Session::new(), path.as_ref())
    }

    /// Probe with a session built from `config`.
    pub fn probe_with_config<P: AsRef<Path>>(
        path: P,
        config: &SessionConfig,
    ) -> Result<MediaMetadata, MediaInfoError> {
        Self::probe_and_dispose(Session::from_config(config), path.as_ref())
    }

    /// Probe using an existing session.
    ///
    /// The file is closed again before returning; the session stays valid
    /// and can be reused.
    pub fn probe_with_session<P: AsRef<Path>>(
        session: &mut Session,
        path: P,
    ) -> Result<MediaMetadata, MediaInfoError> {
        let path = path.as_ref();

        if session.state() == SessionState::Invalid {
            return Self::fallback(path);
        }

        if !session.open(path)? {
            return Err(MediaInfoError::FileOpen {
                path: path.to_path_buf(),
                reason: "MediaInfo could not open the file".to_string(),
            });
        }

        let metadata = session.metadata();
        session.close()?;
        metadata
    }

    /// Probe multiple media files with one session.
    ///
    /// Files that cannot be probed produce an `Err` entry in the result
    /// vector rather than aborting the entire batch.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use mediainfo::MediaProbe;
    ///
    /// let results = MediaProbe::probe_many(&["a.mp4", "b.mkv", "c.avi"]);
    /// for result in &results {
    ///     match result {
    ///         Ok(meta) => println!("{}: {:?}", meta.format, meta.duration),
    ///         Err(err) => eprintln!("Error: {err}"),
    ///     }
    /// }
    /// ```
    pub fn probe_many<P: AsRef<Path>>(paths: &[P]) -> Vec<Result<MediaMetadata, MediaInfoError>> {
        let mut session = Session::new();
        let results = paths
            .iter()
            .map(|path| Self::probe_with_session(&mut session, path))
            .collect();
        if session.is_valid() {
            let _ = session.dispose();
        }
        results
    }

    fn probe_and_dispose(
        mut session: Session,
        path: &Path,
    ) -> Result<MediaMetadata, MediaInfoError> {
        let result = Self::probe_with_session(&mut session, path);
        if session.is_valid() {
            session.dispose()?;
        }
        result
    }

    #[cfg(feature = "ffmpeg")]
    fn fallback(path: &Path) -> Result<MediaMetadata, MediaInfoError> {
        log::debug!("Probing {} with FFmpeg", path.display());
        crate::fallback::probe_with_ffmpeg(path)
    }

    #[cfg(not(feature = "ffmpeg"))]
    fn fallback(path: &Path) -> Result<MediaMetadata, MediaInfoError> {
        log::debug!(
            "No fallback inspection method compiled in for {}",
            path.display()
        );
        Err(MediaInfoError::InvalidState("native library is not loaded"))
    }
}
