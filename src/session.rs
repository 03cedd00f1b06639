//! Core [`Session`] implementation.
//!
//! A `Session` owns exactly one native analysis context. It is created
//! valid (holding a handle) or degraded (the library could not be loaded),
//! and moves to disposed when the handle is released. Disposal happens
//! exactly once: explicitly through [`Session::dispose`], or implicitly when
//! a session that still holds its handle is dropped.
//!
//! ```text
//! Invalid                      (construction failed, terminal)
//! Valid ── dispose() / drop ──▶ Disposed (terminal)
//! ```
//!
//! Every query is only legal while `Valid`; otherwise it returns
//! [`MediaInfoError::InvalidState`] instead of passing a dangling handle to
//! the native side.

use std::ffi::c_void;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::path::Path;
use std::ptr::NonNull;
use std::sync::Arc;

use crate::{
    configuration::SessionConfig,
    error::MediaInfoError,
    kind::{ALL_STREAMS, InfoKind, Parameter, StreamKind},
    library::{Backend, MediaInfoLibrary},
    metadata::MediaMetadata,
};

/// Where a [`Session`] is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// The native library could not be loaded; no handle was ever held.
    Invalid,
    /// A handle is held and queries are allowed.
    Valid,
    /// The handle has been released.
    Disposed,
}

/// One native MediaInfo analysis context.
///
/// A session is neither `Send` nor `Sync`: the native library makes no
/// thread-safety promises, so concurrent work uses one session per thread.
///
/// # Example
///
/// ```no_run
/// use mediainfo::{Session, StreamKind};
///
/// let mut session = Session::new();
/// if !session.is_valid() {
///     // Use another inspection method.
///     return Ok(());
/// }
///
/// if session.open("video.mp4")? {
///     let videos = session.count(StreamKind::Video)?;
///     let width = session.get(StreamKind::Video, 0, "Width")?;
///     println!("{videos} video stream(s), first is {width} px wide");
///     session.close()?;
/// }
/// session.dispose()?;
/// # Ok::<(), mediainfo::MediaInfoError>(())
/// ```
pub struct Session {
    backend: Option<Arc<dyn Backend>>,
    handle: Option<NonNull<c_void>>,
}

impl Debug for Session {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Session")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Construct a session against the shared library.
    ///
    /// Never fails: if the library cannot be loaded the session is returned
    /// in the [`Invalid`](SessionState::Invalid) state and the reason is
    /// logged. Check [`is_valid`](Session::is_valid) and fall back to
    /// another inspection method when it returns `false`.
    pub fn new() -> Self {
        Self::try_new().unwrap_or_else(Self::degraded)
    }

    /// Construct a session from `config`, degrading like [`Session::new`].
    pub fn from_config(config: &SessionConfig) -> Self {
        Self::try_from_config(config).unwrap_or_else(Self::degraded)
    }

    /// Construct a session against the shared library, reporting failure.
    ///
    /// # Errors
    ///
    /// Any load failure of [`MediaInfoLibrary::shared`], or
    /// [`MediaInfoError::NullHandle`].
    pub fn try_new() -> Result<Self, MediaInfoError> {
        log::info!("Loading MediaInfo library");
        // Only the library location comes from the environment.
        let library = MediaInfoLibrary::shared()?;
        Self::create(library, &[])
    }

    /// Construct a session from `config`, reporting failure.
    ///
    /// The library is loaded with `config` rather than taken from the shared
    /// instance, and the configured options are applied to the new session.
    pub fn try_from_config(config: &SessionConfig) -> Result<Self, MediaInfoError> {
        log::info!("Loading MediaInfo library");
        let library = Arc::new(MediaInfoLibrary::load(config)?);
        Self::create(library, config.options())
    }

    /// Construct a session against any [`Backend`].
    pub fn with_backend(backend: Arc<dyn Backend>) -> Result<Self, MediaInfoError> {
        Self::create(backend, &[])
    }

    /// Construct a session against any [`Backend`], applying the options of
    /// `config`.
    ///
    /// The library location in `config` is ignored; `backend` is used as is.
    pub fn with_backend_and_config(
        backend: Arc<dyn Backend>,
        config: &SessionConfig,
    ) -> Result<Self, MediaInfoError> {
        Self::create(backend, config.options())
    }

    fn create(
        backend: Arc<dyn Backend>,
        options: &[(String, String)],
    ) -> Result<Self, MediaInfoError> {
        let handle = backend.create().ok_or(MediaInfoError::NullHandle)?;
        let mut session = Self {
            backend: Some(backend),
            handle: Some(handle),
        };

        for (option, value) in options {
            let answer = session.set_option(option, value)?;
            log::debug!("Option {option}={value:?} answered {answer:?}");
        }

        log::info!("Loaded {}", session.version()?);
        Ok(session)
    }

    fn degraded(error: MediaInfoError) -> Self {
        log::info!("Error loading MediaInfo library: {error}");
        if cfg!(not(any(windows, target_os = "macos"))) {
            log::info!("Make sure you have libmediainfo and libzen installed");
        }
        log::info!("Falling back to the less accurate FFmpeg parsing method");

        Self {
            backend: None,
            handle: None,
        }
    }

    /// Returns `true` while a native handle is held.
    pub fn is_valid(&self) -> bool {
        self.handle.is_some()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        match (&self.backend, self.handle) {
            (None, _) => SessionState::Invalid,
            (Some(_), Some(_)) => SessionState::Valid,
            (Some(_), None) => SessionState::Disposed,
        }
    }

    /// Release the native handle.
    ///
    /// # Errors
    ///
    /// [`MediaInfoError::InvalidState`] if no handle is held, i.e. the
    /// session is degraded or was already disposed.
    pub fn dispose(&mut self) -> Result<(), MediaInfoError> {
        let (backend, handle) = self.live()?;
        // SAFETY: the handle is live and is cleared right after, so it can
        // never reach the native side again.
        unsafe { backend.delete(handle) };
        self.handle = None;
        Ok(())
    }

    fn live(&self) -> Result<(&dyn Backend, NonNull<c_void>), MediaInfoError> {
        match (&self.backend, self.handle) {
            (Some(backend), Some(handle)) => Ok((backend.as_ref(), handle)),
            (None, _) => Err(MediaInfoError::InvalidState(
                "native library is not loaded",
            )),
            (Some(_), None) => Err(MediaInfoError::InvalidState("session has been disposed")),
        }
    }

    /// Open a file and collect information about it.
    ///
    /// Returns `true` if the file was opened. Failure to open is not an
    /// error; neither is a path the native side cannot represent, which is
    /// logged and reported as not opened.
    pub fn open<P: AsRef<Path>>(&mut self, path: P) -> Result<bool, MediaInfoError> {
        let (backend, handle) = self.live()?;
        let path = path.as_ref();

        let Some(native_path) = path.to_str() else {
            log::warn!(
                "Path is not valid Unicode and cannot be passed to MediaInfo: {}",
                path.display()
            );
            return Ok(false);
        };

        log::debug!("Opening media file: {}", path.display());
        // SAFETY: `live` only returns handles that have not been disposed.
        let opened = unsafe { backend.open(handle, native_path) } == 1;
        if !opened {
            log::debug!("MediaInfo could not open {}", path.display());
        }
        Ok(opened)
    }

    /// Close the file opened with [`open`](Session::open).
    pub fn close(&mut self) -> Result<(), MediaInfoError> {
        let (backend, handle) = self.live()?;
        // SAFETY: `live` only returns handles that have not been disposed.
        unsafe { backend.close(handle) };
        Ok(())
    }

    /// All details about the opened file as one human-readable string.
    ///
    /// The layout follows the `Inform` option (text by default).
    pub fn inform(&self) -> Result<String, MediaInfoError> {
        let (backend, handle) = self.live()?;
        // SAFETY: as in `close`.
        Ok(unsafe { backend.inform(handle) })
    }

    /// Value of a named parameter.
    ///
    /// Equivalent to [`get_with`](Session::get_with) with
    /// [`InfoKind::Text`] and a search by [`InfoKind::Name`]. Returns an
    /// empty string if the stream or parameter does not exist.
    pub fn get(
        &self,
        kind: StreamKind,
        stream_number: usize,
        parameter: &str,
    ) -> Result<String, MediaInfoError> {
        self.get_with(kind, stream_number, parameter, InfoKind::Text, InfoKind::Name)
    }

    /// One facet of a named parameter, searched by name.
    pub fn get_info(
        &self,
        kind: StreamKind,
        stream_number: usize,
        parameter: &str,
        info: InfoKind,
    ) -> Result<String, MediaInfoError> {
        self.get_with(kind, stream_number, parameter, info, InfoKind::Name)
    }

    /// One facet of a parameter, looked up in the `search` facet.
    ///
    /// Returns an empty string on any lookup miss.
    pub fn get_with(
        &self,
        kind: StreamKind,
        stream_number: usize,
        parameter: &str,
        info: InfoKind,
        search: InfoKind,
    ) -> Result<String, MediaInfoError> {
        let (backend, handle) = self.live()?;
        // SAFETY: as in `close`.
        Ok(unsafe { backend.get(handle, kind, stream_number, parameter, info, search) })
    }

    /// Value of the parameter at `parameter_index`.
    pub fn get_indexed(
        &self,
        kind: StreamKind,
        stream_number: usize,
        parameter_index: usize,
    ) -> Result<String, MediaInfoError> {
        self.get_indexed_info(kind, stream_number, parameter_index, InfoKind::Text)
    }

    /// One facet of the parameter at `parameter_index`.
    ///
    /// Returns an empty string on any lookup miss.
    pub fn get_indexed_info(
        &self,
        kind: StreamKind,
        stream_number: usize,
        parameter_index: usize,
        info: InfoKind,
    ) -> Result<String, MediaInfoError> {
        let (backend, handle) = self.live()?;
        // SAFETY: as in `close`.
        Ok(unsafe { backend.get_indexed(handle, kind, stream_number, parameter_index, info) })
    }

    /// Look up a [`Parameter`] by name or position.
    pub fn get_parameter<'a>(
        &self,
        kind: StreamKind,
        stream_number: usize,
        parameter: impl Into<Parameter<'a>>,
        info: InfoKind,
    ) -> Result<String, MediaInfoError> {
        match parameter.into() {
            Parameter::Name(name) => self.get_info(kind, stream_number, name, info),
            Parameter::Index(index) => self.get_indexed_info(kind, stream_number, index, info),
        }
    }

    /// Number of streams of `kind` in the opened file.
    pub fn count(&self, kind: StreamKind) -> Result<usize, MediaInfoError> {
        self.count_in(kind, ALL_STREAMS)
    }

    /// Number of parameters in stream `stream_number` of `kind`.
    ///
    /// Passing [`ALL_STREAMS`] counts streams instead, like
    /// [`count`](Session::count).
    pub fn count_in(&self, kind: StreamKind, stream_number: usize) -> Result<usize, MediaInfoError> {
        let (backend, handle) = self.live()?;
        // SAFETY: as in `close`.
        Ok(unsafe { backend.count_get(handle, kind, stream_number) })
    }

    /// Query an option.
    ///
    /// By convention an empty answer means "no" and anything else "yes"
    /// or the value.
    pub fn option(&self, option: &str) -> Result<String, MediaInfoError> {
        self.option_raw(option, "")
    }

    /// Set an option, returning the library's answer.
    pub fn set_option(&mut self, option: &str, value: &str) -> Result<String, MediaInfoError> {
        self.option_raw(option, value)
    }

    fn option_raw(&self, option: &str, value: &str) -> Result<String, MediaInfoError> {
        let (backend, handle) = self.live()?;
        // SAFETY: as in `close`.
        Ok(unsafe { backend.option(handle, option, value) })
    }

    /// Version string of the native library, e.g. `"MediaInfoLib - v24.01"`.
    pub fn version(&self) -> Result<String, MediaInfoError> {
        self.option("Info_Version")
    }

    /// Query an option without a session.
    ///
    /// Loads the shared library if needed and answers on a throwaway
    /// context that is deleted before returning.
    pub fn option_static(option: &str) -> Result<String, MediaInfoError> {
        Self::set_option_static(option, "")
    }

    /// Set an option without a session.
    ///
    /// Only options the library keeps process-wide outlive the throwaway
    /// context this runs on.
    pub fn set_option_static(option: &str, value: &str) -> Result<String, MediaInfoError> {
        let library = MediaInfoLibrary::shared()?;
        Self::option_static_with(library.as_ref(), option, value)
    }

    /// [`set_option_static`](Session::set_option_static) against any backend.
    pub fn option_static_with(
        backend: &dyn Backend,
        option: &str,
        value: &str,
    ) -> Result<String, MediaInfoError> {
        let handle = backend.create().ok_or(MediaInfoError::NullHandle)?;
        // SAFETY: the handle was just created and is deleted exactly once.
        let answer = unsafe { backend.option(handle, option, value) };
        // SAFETY: not used again after this call.
        unsafe { backend.delete(handle) };
        Ok(answer)
    }

    /// Typed summary of the opened file.
    ///
    /// See [`MediaMetadata`] for what is collected.
    pub fn metadata(&self) -> Result<MediaMetadata, MediaInfoError> {
        crate::metadata::read_metadata(self)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.handle.is_some() {
            log::debug!("Session dropped while holding its handle; releasing it");
            let _ = self.dispose();
        }
    }
}
