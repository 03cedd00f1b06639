//! SessionConfig and degraded-session tests.
//!
//! These point the loader at paths that cannot hold a real library, so they
//! behave the same whether or not MediaInfo is installed.

use std::ffi::OsString;
use std::path::Path;

use mediainfo::{
    LIBRARY_PATH_VARIABLE, MediaInfoError, MediaInfoLibrary, NO_PRELOAD_VARIABLE, Session,
    SessionConfig, SessionState, StreamKind,
};

fn unloadable_config() -> (tempfile::TempDir, SessionConfig) {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let path = directory.path().join("libmediainfo-missing.so");
    let config = SessionConfig::new()
        .with_library_path(&path)
        .with_preload_dependency(false);
    (directory, config)
}

#[test]
fn builder_sets_fields() {
    let config = SessionConfig::new()
        .with_library_path("/opt/lib/libmediainfo.so.0")
        .with_option("Complete", "1");

    assert_eq!(
        config.library_path().and_then(|path| path.to_str()),
        Some("/opt/lib/libmediainfo.so.0")
    );
    assert_eq!(config.options().len(), 1);
}

#[test]
fn explicit_missing_library_fails_to_load() {
    let (_directory, config) = unloadable_config();

    let result = MediaInfoLibrary::load(&config);
    assert!(matches!(result, Err(MediaInfoError::LibraryLoad { .. })));
}

#[test]
fn try_from_config_reports_load_failure() {
    let (_directory, config) = unloadable_config();

    let error = Session::try_from_config(&config).unwrap_err();
    let message = error.to_string();
    assert!(
        message.contains("Failed to load native library"),
        "Error message should mention the load failure: {message}"
    );
}

#[test]
fn from_config_degrades_instead_of_failing() {
    let (_directory, config) = unloadable_config();

    let mut session = Session::from_config(&config);
    assert!(!session.is_valid());
    assert_eq!(session.state(), SessionState::Invalid);

    assert!(matches!(
        session.dispose(),
        Err(MediaInfoError::InvalidState(_))
    ));
    assert!(matches!(
        session.open("input.mp4"),
        Err(MediaInfoError::InvalidState(_))
    ));
    assert!(matches!(
        session.get(StreamKind::General, 0, "Format"),
        Err(MediaInfoError::InvalidState(_))
    ));
    assert_eq!(session.state(), SessionState::Invalid);
}

#[test]
fn from_env_reads_library_location_and_preload() {
    // Single test so nothing else in this binary races on the environment.
    let saved: Vec<(&str, Option<OsString>)> = [LIBRARY_PATH_VARIABLE, NO_PRELOAD_VARIABLE]
        .into_iter()
        .map(|name| (name, std::env::var_os(name)))
        .collect();
    let set = |name: &str, value: Option<&str>| unsafe {
        match value {
            Some(value) => std::env::set_var(name, value),
            None => std::env::remove_var(name),
        }
    };
    let preload_of = |config: &SessionConfig| {
        format!("{config:?}").contains("preload_dependency: true")
    };
    let platform_preload = cfg!(not(any(windows, target_os = "macos")));

    set(LIBRARY_PATH_VARIABLE, None);
    set(NO_PRELOAD_VARIABLE, None);
    let config = SessionConfig::from_env();
    assert!(config.library_path().is_none());
    assert_eq!(preload_of(&config), platform_preload);
    assert!(config.options().is_empty(), "Options never come from the environment");

    set(LIBRARY_PATH_VARIABLE, Some("/opt/mediainfo/libmediainfo.so.0"));
    let config = SessionConfig::from_env();
    assert_eq!(
        config.library_path().map(|path| path.as_path()),
        Some(Path::new("/opt/mediainfo/libmediainfo.so.0"))
    );

    set(LIBRARY_PATH_VARIABLE, Some(""));
    assert!(
        SessionConfig::from_env().library_path().is_none(),
        "An empty path is ignored"
    );

    set(NO_PRELOAD_VARIABLE, Some("0"));
    assert_eq!(preload_of(&SessionConfig::from_env()), platform_preload);
    set(NO_PRELOAD_VARIABLE, Some(""));
    assert_eq!(preload_of(&SessionConfig::from_env()), platform_preload);
    set(NO_PRELOAD_VARIABLE, Some("1"));
    assert!(!preload_of(&SessionConfig::from_env()));
    set(NO_PRELOAD_VARIABLE, Some("yes"));
    assert!(!preload_of(&SessionConfig::from_env()));

    for (name, value) in saved {
        match value {
            Some(value) => unsafe { std::env::set_var(name, value) },
            None => set(name, None),
        }
    }
}

#[test]
fn garbage_library_file_fails_to_load() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let path = directory.path().join("libmediainfo.so");
    std::fs::write(&path, b"not a shared object").expect("Failed to write file");

    let config = SessionConfig::new()
        .with_library_path(&path)
        .with_preload_dependency(false);
    assert!(matches!(
        Session::try_from_config(&config),
        Err(MediaInfoError::LibraryLoad { .. })
    ));
}
