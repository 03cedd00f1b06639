//! Session configuration.
//!
//! [`SessionConfig`] is a builder that controls where the native library is
//! loaded from and which options every new session starts with.
//!
//! # Example
//!
//! ```no_run
//! use mediainfo::{Session, SessionConfig};
//!
//! let config = SessionConfig::from_env()
//!     .with_library_path("/opt/mediainfo/lib/libmediainfo.so.0")
//!     .with_option("Complete", "1");
//!
//! let session = Session::try_from_config(&config)?;
//! # Ok::<(), mediainfo::MediaInfoError>(())
//! ```

use std::env;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::path::PathBuf;

/// Environment variable holding an explicit library path.
pub const LIBRARY_PATH_VARIABLE: &str = "MEDIAINFO_LIBRARY_PATH";

/// Environment variable that, when set to anything but `0` or an empty
/// string, disables preloading of the `zen` dependency.
pub const NO_PRELOAD_VARIABLE: &str = "MEDIAINFO_NO_PRELOAD";

/// Configuration for loading the native library and initialising sessions.
///
/// A default-constructed config searches the platform's standard library
/// names and preloads `zen` where the platform needs it.
#[derive(Clone)]
pub struct SessionConfig {
    /// Exact library file to load. `None` searches the default names.
    pub(crate) library_path: Option<PathBuf>,
    /// Whether to load the `zen` dependency before the main library.
    pub(crate) preload_dependency: bool,
    /// Options applied, in order, to every session right after construction.
    pub(crate) options: Vec<(String, String)>,
}

impl Debug for SessionConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("SessionConfig")
            .field("library_path", &self.library_path)
            .field("preload_dependency", &self.preload_dependency)
            .field("option_count", &self.options.len())
            .finish()
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionConfig {
    /// Create a configuration with platform defaults.
    pub fn new() -> Self {
        Self {
            library_path: None,
            preload_dependency: cfg!(not(any(windows, target_os = "macos"))),
            options: Vec::new(),
        }
    }

    /// Create a configuration with platform defaults, overridden by
    /// [`LIBRARY_PATH_VARIABLE`] and [`NO_PRELOAD_VARIABLE`].
    pub fn from_env() -> Self {
        let mut config = Self::new();

        if let Some(path) = env::var_os(LIBRARY_PATH_VARIABLE).filter(|path| !path.is_empty()) {
            config.library_path = Some(PathBuf::from(path));
        }

        if let Ok(value) = env::var(NO_PRELOAD_VARIABLE) {
            if !value.is_empty() && value != "0" {
                config.preload_dependency = false;
            }
        }

        config
    }

    /// Load this exact file instead of searching the default names.
    #[must_use]
    pub fn with_library_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.library_path = Some(path.into());
        self
    }

    /// Control whether the `zen` dependency is loaded first.
    ///
    /// Defaults to `true` on platforms other than Windows and macOS.
    #[must_use]
    pub fn with_preload_dependency(mut self, preload: bool) -> Self {
        self.preload_dependency = preload;
        self
    }

    /// Apply an option to every session created with this config.
    ///
    /// Options are applied in the order they were added.
    #[must_use]
    pub fn with_option(mut self, option: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.push((option.into(), value.into()));
        self
    }

    /// Explicit library path, if any.
    pub fn library_path(&self) -> Option<&PathBuf> {
        self.library_path.as_ref()
    }

    /// Options applied to every new session.
    pub fn options(&self) -> &[(String, String)] {
        &self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SessionConfig::new();
        assert!(config.library_path().is_none());
        assert!(config.options().is_empty());
        assert_eq!(
            config.preload_dependency,
            cfg!(not(any(windows, target_os = "macos")))
        );
    }

    #[test]
    fn options_keep_insertion_order() {
        let config = SessionConfig::new()
            .with_option("Complete", "1")
            .with_option("Inform", "JSON");
        assert_eq!(
            config.options(),
            &[
                ("Complete".to_string(), "1".to_string()),
                ("Inform".to_string(), "JSON".to_string()),
            ]
        );
    }

    #[test]
    fn debug_does_not_dump_options() {
        let config = SessionConfig::new()
            .with_preload_dependency(false)
            .with_option("Complete", "1");
        let debug = format!("{config:?}");
        assert!(debug.contains("SessionConfig"));
        assert!(debug.contains("preload_dependency: false"));
        assert!(debug.contains("option_count: 1"));
    }
}
