//! # mediainfo
//!
//! Safe bindings to the native MediaInfo library, loaded at runtime.
//!
//! `mediainfo` wraps the MediaInfo C interface in a [`Session`] that owns one
//! native handle, marshals strings to and from the platform wide-character
//! encoding, and releases the handle exactly once. The library (and its
//! `libzen` dependency) is located and loaded with
//! [`libloading`](https://crates.io/crates/libloading); nothing is linked at
//! build time.
//!
//! ## Quick Start
//!
//! ### Query a Field
//!
//! ```no_run
//! use mediainfo::{Session, StreamKind};
//!
//! let mut session = Session::try_new()?;
//! if session.open("input.mp4")? {
//!     let width = session.get(StreamKind::Video, 0, "Width")?;
//!     println!("Width: {width}");
//!     session.close()?;
//! }
//! session.dispose()?;
//! # Ok::<(), mediainfo::MediaInfoError>(())
//! ```
//!
//! ### Full Report
//!
//! ```no_run
//! use mediainfo::Session;
//!
//! let mut session = Session::try_new()?;
//! session.set_option("Complete", "1")?;
//! session.open("input.mkv")?;
//! println!("{}", session.inform()?);
//! # Ok::<(), mediainfo::MediaInfoError>(())
//! ```
//!
//! ### Probe Metadata
//!
//! ```no_run
//! use mediainfo::MediaProbe;
//!
//! let metadata = MediaProbe::probe("input.mp4")?;
//! println!("{} ({} video, {} audio)", metadata.format, metadata.video.len(), metadata.audio.len());
//! # Ok::<(), mediainfo::MediaInfoError>(())
//! ```
//!
//! ## Features
//!
//! - **Runtime loading**: explicit path, `MEDIAINFO_LIBRARY_PATH`, or the
//!   platform's conventional library names
//! - **Graceful degradation**: a session whose library failed to load is
//!   still constructible and reports itself as invalid
//! - **Typed queries**: [`StreamKind`] and [`InfoKind`] mirror the native
//!   enumerations, parameters by name or by index
//! - **Options**: per-session and process-wide option calls
//! - **Metadata summary**: [`MediaMetadata`] with per-stream details and
//!   [`ValidationReport`] checks
//!
//! ### Optional Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `ffmpeg` | Fall back to FFmpeg's demuxer when the native library is missing |
//! | `async` | `MediaProbe::probe_async` via Tokio's blocking pool |
//! | `rayon` | `MediaProbe::probe_many_parallel` with one session per worker |
//! | `full` | Enables all of the above |
//!
//! ## Requirements
//!
//! The MediaInfo shared library must be installed at runtime (`libmediainfo`
//! and `libzen` on Linux, `MediaInfo.dll` on Windows, `libmediainfo.dylib`
//! on macOS).

#[cfg(feature = "async")]
mod asynchronous;
pub mod configuration;
pub mod error;
#[cfg(feature = "ffmpeg")]
pub mod fallback;
pub mod kind;
pub mod library;
pub mod metadata;
#[cfg(feature = "rayon")]
mod parallel;
pub mod probe;
pub mod session;
pub mod validation;
mod wide;

pub use configuration::{LIBRARY_PATH_VARIABLE, NO_PRELOAD_VARIABLE, SessionConfig};
pub use error::MediaInfoError;
pub use kind::{ALL_STREAMS, InfoKind, Parameter, StreamKind};
pub use library::{Backend, MediaInfoLibrary};
pub use metadata::{AudioMetadata, MediaMetadata, MetadataSource, TextMetadata, VideoMetadata};
pub use probe::MediaProbe;
pub use session::{Session, SessionState};
pub use validation::ValidationReport;
