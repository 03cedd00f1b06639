//! Native library loading and the [`Backend`] seam.
//!
//! [`MediaInfoLibrary`] locates the MediaInfo shared library for the current
//! platform, preloads its `zen` dependency where the dynamic linker needs it,
//! and resolves the nine entry points once. Sessions never call the
//! library directly: they go through the [`Backend`] trait, which
//! `MediaInfoLibrary` implements and which tests can implement in memory.

use std::ffi::{OsStr, OsString, c_int, c_void};
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::path::Path;
use std::ptr::NonNull;
use std::sync::{Arc, OnceLock};

use libc::wchar_t;
use libloading::{Library, Symbol};

use crate::configuration::SessionConfig;
use crate::error::MediaInfoError;
use crate::kind::{InfoKind, StreamKind};
use crate::wide::{self, WideCString};

/// The native entry points a session needs.
///
/// Every method except [`create`](Backend::create) operates on a handle
/// previously returned by `create` on the same backend.
pub trait Backend: Send + Sync {
    /// Create a new analysis context. `None` if the library returned null.
    fn create(&self) -> Option<NonNull<c_void>>;

    /// Destroy a context.
    ///
    /// # Safety
    ///
    /// `handle` must be live and must not be used again afterwards.
    unsafe fn delete(&self, handle: NonNull<c_void>);

    /// Open a file. Returns 1 if the file was opened, 0 otherwise.
    ///
    /// # Safety
    ///
    /// `handle` must be live.
    unsafe fn open(&self, handle: NonNull<c_void>, path: &str) -> usize;

    /// Close the currently opened file.
    ///
    /// # Safety
    ///
    /// `handle` must be live.
    unsafe fn close(&self, handle: NonNull<c_void>);

    /// Full report of everything known about the opened file.
    ///
    /// # Safety
    ///
    /// `handle` must be live.
    unsafe fn inform(&self, handle: NonNull<c_void>) -> String;

    /// Look up a parameter by name.
    ///
    /// # Safety
    ///
    /// `handle` must be live.
    unsafe fn get(
        &self,
        handle: NonNull<c_void>,
        kind: StreamKind,
        stream_number: usize,
        parameter: &str,
        info: InfoKind,
        search: InfoKind,
    ) -> String;

    /// Look up a parameter by position.
    ///
    /// # Safety
    ///
    /// `handle` must be live.
    unsafe fn get_indexed(
        &self,
        handle: NonNull<c_void>,
        kind: StreamKind,
        stream_number: usize,
        parameter_index: usize,
        info: InfoKind,
    ) -> String;

    /// Count streams of a kind, or parameters within one stream.
    ///
    /// # Safety
    ///
    /// `handle` must be live.
    unsafe fn count_get(&self, handle: NonNull<c_void>, kind: StreamKind, stream_number: usize)
    -> usize;

    /// Query or set an option.
    ///
    /// # Safety
    ///
    /// `handle` must be live.
    unsafe fn option(&self, handle: NonNull<c_void>, option: &str, value: &str) -> String;
}

type NewFn = unsafe extern "system" fn() -> *mut c_void;
type DeleteFn = unsafe extern "system" fn(*mut c_void);
type OpenFn = unsafe extern "system" fn(*mut c_void, *const wchar_t) -> usize;
type CloseFn = unsafe extern "system" fn(*mut c_void);
type InformFn = unsafe extern "system" fn(*mut c_void, usize) -> *const wchar_t;
type GetFn = unsafe extern "system" fn(
    *mut c_void,
    c_int,
    usize,
    *const wchar_t,
    c_int,
    c_int,
) -> *const wchar_t;
type GetIndexedFn =
    unsafe extern "system" fn(*mut c_void, c_int, usize, usize, c_int) -> *const wchar_t;
type CountGetFn = unsafe extern "system" fn(*mut c_void, c_int, usize) -> usize;
type OptionFn =
    unsafe extern "system" fn(*mut c_void, *const wchar_t, *const wchar_t) -> *const wchar_t;

/// Resolved function pointers. Only valid while the owning [`Library`] is loaded.
#[derive(Clone, Copy)]
struct EntryPoints {
    new: NewFn,
    delete: DeleteFn,
    open: OpenFn,
    close: CloseFn,
    inform: InformFn,
    get: GetFn,
    get_indexed: GetIndexedFn,
    count_get: CountGetFn,
    option: OptionFn,
}

impl EntryPoints {
    fn resolve(library: &Library) -> Result<Self, MediaInfoError> {
        // SAFETY: each symbol is cast to the signature declared in the
        // library's public C header.
        unsafe {
            Ok(Self {
                new: resolve(library, "MediaInfo_New")?,
                delete: resolve(library, "MediaInfo_Delete")?,
                open: resolve(library, "MediaInfo_Open")?,
                close: resolve(library, "MediaInfo_Close")?,
                inform: resolve(library, "MediaInfo_Inform")?,
                get: resolve(library, "MediaInfo_Get")?,
                get_indexed: resolve(library, "MediaInfo_GetI")?,
                count_get: resolve(library, "MediaInfo_Count_Get")?,
                option: resolve(library, "MediaInfo_Option")?,
            })
        }
    }
}

unsafe fn resolve<T: Copy>(library: &Library, symbol: &'static str) -> Result<T, MediaInfoError> {
    let resolved: Symbol<'_, T> =
        unsafe { library.get(symbol.as_bytes()) }.map_err(|error| {
            MediaInfoError::MissingSymbol {
                symbol,
                reason: error.to_string(),
            }
        })?;
    Ok(*resolved)
}

/// The loaded MediaInfo shared library.
///
/// Cheap to share behind an [`Arc`]; every [`Session`](crate::Session)
/// created from it keeps it loaded.
pub struct MediaInfoLibrary {
    entry_points: EntryPoints,
    loaded_from: String,
    // Field order matters: the main library is unloaded before the
    // dependency it links against.
    _library: Library,
    _dependency: Option<Library>,
}

impl Debug for MediaInfoLibrary {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("MediaInfoLibrary")
            .field("loaded_from", &self.loaded_from)
            .field("has_dependency", &self._dependency.is_some())
            .finish_non_exhaustive()
    }
}

static SHARED: OnceLock<Arc<MediaInfoLibrary>> = OnceLock::new();

impl MediaInfoLibrary {
    /// Load the library as described by `config`.
    ///
    /// Each call performs a fresh load; the platform loader reference-counts
    /// the underlying object, so repeated loads are cheap.
    ///
    /// # Errors
    ///
    /// [`MediaInfoError::LibraryLoad`] if no candidate could be loaded and
    /// [`MediaInfoError::MissingSymbol`] if the loaded file is not a
    /// compatible MediaInfo build.
    pub fn load(config: &SessionConfig) -> Result<Self, MediaInfoError> {
        let search_directory = config
            .library_path
            .as_deref()
            .and_then(Path::parent)
            .filter(|directory| !directory.as_os_str().is_empty());

        let dependency = if config.preload_dependency {
            preload_dependency(search_directory)
        } else {
            None
        };

        let (library, loaded_from) = match &config.library_path {
            Some(path) => (open_library(path.as_os_str())?, path.display().to_string()),
            None => open_first(&library_candidates())?,
        };

        let entry_points = EntryPoints::resolve(&library)?;
        log::debug!("Loaded native library from {loaded_from}");

        Ok(Self {
            entry_points,
            loaded_from,
            _library: library,
            _dependency: dependency,
        })
    }

    /// The process-wide library, loaded on first use with
    /// [`SessionConfig::from_env`].
    ///
    /// Failures are not cached, so a library installed after a failed
    /// attempt is picked up by the next call.
    pub fn shared() -> Result<Arc<Self>, MediaInfoError> {
        if let Some(library) = SHARED.get() {
            return Ok(Arc::clone(library));
        }
        let library = Arc::new(Self::load(&SessionConfig::from_env())?);
        Ok(Arc::clone(SHARED.get_or_init(|| library)))
    }

    /// File name or path the library was loaded from.
    pub fn loaded_from(&self) -> &str {
        &self.loaded_from
    }
}

impl Backend for MediaInfoLibrary {
    fn create(&self) -> Option<NonNull<c_void>> {
        // SAFETY: `MediaInfo_New` takes no arguments.
        NonNull::new(unsafe { (self.entry_points.new)() })
    }

    unsafe fn delete(&self, handle: NonNull<c_void>) {
        unsafe { (self.entry_points.delete)(handle.as_ptr()) }
    }

    unsafe fn open(&self, handle: NonNull<c_void>, path: &str) -> usize {
        let path = WideCString::new(path);
        unsafe { (self.entry_points.open)(handle.as_ptr(), path.as_ptr()) }
    }

    unsafe fn close(&self, handle: NonNull<c_void>) {
        unsafe { (self.entry_points.close)(handle.as_ptr()) }
    }

    unsafe fn inform(&self, handle: NonNull<c_void>) -> String {
        unsafe { wide::from_ptr((self.entry_points.inform)(handle.as_ptr(), 0)) }
    }

    unsafe fn get(
        &self,
        handle: NonNull<c_void>,
        kind: StreamKind,
        stream_number: usize,
        parameter: &str,
        info: InfoKind,
        search: InfoKind,
    ) -> String {
        let parameter = WideCString::new(parameter);
        unsafe {
            wide::from_ptr((self.entry_points.get)(
                handle.as_ptr(),
                kind.as_raw(),
                stream_number,
                parameter.as_ptr(),
                info.as_raw(),
                search.as_raw(),
            ))
        }
    }

    unsafe fn get_indexed(
        &self,
        handle: NonNull<c_void>,
        kind: StreamKind,
        stream_number: usize,
        parameter_index: usize,
        info: InfoKind,
    ) -> String {
        unsafe {
            wide::from_ptr((self.entry_points.get_indexed)(
                handle.as_ptr(),
                kind.as_raw(),
                stream_number,
                parameter_index,
                info.as_raw(),
            ))
        }
    }

    unsafe fn count_get(
        &self,
        handle: NonNull<c_void>,
        kind: StreamKind,
        stream_number: usize,
    ) -> usize {
        unsafe { (self.entry_points.count_get)(handle.as_ptr(), kind.as_raw(), stream_number) }
    }

    unsafe fn option(&self, handle: NonNull<c_void>, option: &str, value: &str) -> String {
        let option = WideCString::new(option);
        let value = WideCString::new(value);
        unsafe {
            wide::from_ptr((self.entry_points.option)(
                handle.as_ptr(),
                option.as_ptr(),
                value.as_ptr(),
            ))
        }
    }
}

/// Base library name for this platform and pointer width.
pub(crate) fn base_library_name() -> &'static str {
    if cfg!(all(windows, target_pointer_width = "64")) {
        "mediainfo64"
    } else {
        "mediainfo"
    }
}

/// File names tried, in order, when no explicit path is configured.
pub(crate) fn library_candidates() -> Vec<OsString> {
    let mut candidates = vec![libloading::library_filename(base_library_name())];
    if cfg!(all(windows, target_pointer_width = "64")) {
        // The stock installer ships the 64-bit build under the plain name.
        candidates.push(OsString::from("MediaInfo.dll"));
    } else if cfg!(target_os = "macos") {
        candidates.push(OsString::from("libmediainfo.0.dylib"));
    } else if cfg!(unix) {
        candidates.push(OsString::from("libmediainfo.so.0"));
    }
    candidates
}

/// File names tried for the `zen` dependency.
pub(crate) fn dependency_candidates() -> Vec<OsString> {
    vec![
        libloading::library_filename("zen"),
        OsString::from("libzen.so.0"),
    ]
}

fn open_library(name: &OsStr) -> Result<Library, MediaInfoError> {
    // SAFETY: loading runs the library's initialisers; MediaInfo and ZenLib
    // have no initialisers with preconditions on the host process.
    unsafe { Library::new(name) }.map_err(|error| MediaInfoError::LibraryLoad {
        library: name.to_string_lossy().into_owned(),
        reason: error.to_string(),
    })
}

fn open_first(candidates: &[OsString]) -> Result<(Library, String), MediaInfoError> {
    let mut last_error = None;
    for candidate in candidates {
        match open_library(candidate) {
            Ok(library) => return Ok((library, candidate.to_string_lossy().into_owned())),
            Err(error) => {
                log::debug!("{error}");
                last_error = Some(error);
            }
        }
    }
    Err(last_error.unwrap_or_else(|| MediaInfoError::LibraryLoad {
        library: base_library_name().to_string(),
        reason: "no candidate library names".to_string(),
    }))
}

/// Load `zen` ahead of the main library so the dynamic linker finds it even
/// when it is not on the default search path.
fn preload_dependency(search_directory: Option<&Path>) -> Option<Library> {
    let mut candidates: Vec<OsString> = Vec::new();
    if let Some(directory) = search_directory {
        candidates.extend(
            dependency_candidates()
                .iter()
                .map(|name| directory.join(name).into_os_string()),
        );
    }
    candidates.extend(dependency_candidates());

    match open_first(&candidates) {
        Ok((library, loaded_from)) => {
            log::debug!("Preloaded dependency from {loaded_from}");
            Some(library)
        }
        Err(error) => {
            log::warn!("Error loading libzen: {error}");
            None
        }
    }
}
