//! Parallel batch probing.
//!
//! Sessions are not thread-safe, so each rayon worker builds its own
//! [`Session`] and probes its share of the files sequentially. No session
//! ever crosses a thread boundary.

use std::path::Path;

use ::rayon::iter::{IntoParallelRefIterator, ParallelIterator};

use crate::error::MediaInfoError;
use crate::metadata::MediaMetadata;
use crate::probe::MediaProbe;
use crate::session::Session;

impl MediaProbe {
    /// Probe many files across the rayon thread pool.
    ///
    /// Results are returned in the order of `paths`. Failures are reported
    /// per file, as with [`MediaProbe::probe_many`].
    ///
    /// # Example
    ///
    /// ```no_run
    /// use mediainfo::MediaProbe;
    ///
    /// let results = MediaProbe::probe_many_parallel(&["a.mp4", "b.mkv"]);
    /// assert_eq!(results.len(), 2);
    /// ```
    pub fn probe_many_parallel<P: AsRef<Path> + Sync>(
        paths: &[P],
    ) -> Vec<Result<MediaMetadata, MediaInfoError>> {
        paths
            .par_iter()
            .map_init(Session::new, |session, path| {
                Self::probe_with_session(session, path)
            })
            .collect()
    }
}
