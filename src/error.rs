//! Error types for the `mediainfo` crate.
//!
//! This module defines [`MediaInfoError`], the unified error type returned by
//! all fallible operations in the crate. Lookup misses and failed opens are
//! deliberately *not* errors: the native library reports them as an empty
//! string and a zero return code, and the binding keeps that contract.

use std::path::PathBuf;

use thiserror::Error;

/// The unified error type for all `mediainfo` operations.
///
/// Variants carry enough context to diagnose the problem without needing
/// additional logging at the call site.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MediaInfoError {
    /// The native library (or one of its candidates) could not be loaded.
    #[error("Failed to load native library {library}: {reason}")]
    LibraryLoad {
        /// Library name or path that was tried last.
        library: String,
        /// Underlying loader message.
        reason: String,
    },

    /// The library was loaded but does not export a required entry point.
    #[error("Native library is missing entry point {symbol}: {reason}")]
    MissingSymbol {
        /// Name of the unresolved symbol.
        symbol: &'static str,
        /// Underlying loader message.
        reason: String,
    },

    /// The native constructor returned a null handle.
    #[error("Native library returned a null handle")]
    NullHandle,

    /// An operation required a live native handle but none is held.
    ///
    /// Raised by [`Session::dispose`](crate::Session::dispose) on a session
    /// that was never valid or is already disposed, and by every query
    /// method in the same situation.
    #[error("Invalid session state: {0}")]
    InvalidState(&'static str),

    /// The media file could not be opened (used by [`MediaProbe`](crate::MediaProbe)).
    #[error("Failed to open media file at {path}: {reason}")]
    FileOpen {
        /// Path that was passed to the probe.
        path: PathBuf,
        /// Reason the open failed.
        reason: String,
    },

    /// An error originating from the FFmpeg fallback.
    #[cfg(feature = "ffmpeg")]
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// A background probing task panicked or was cancelled.
    #[cfg(feature = "async")]
    #[error("Background task failed: {0}")]
    BackgroundTask(String),
}

#[cfg(feature = "ffmpeg")]
impl From<ffmpeg_next::Error> for MediaInfoError {
    fn from(error: ffmpeg_next::Error) -> Self {
        MediaInfoError::FfmpegError(error.to_string())
    }
}

#[cfg(feature = "async")]
impl From<tokio::task::JoinError> for MediaInfoError {
    fn from(error: tokio::task::JoinError) -> Self {
        MediaInfoError::BackgroundTask(error.to_string())
    }
}
