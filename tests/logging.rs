//! Log output of a session that cannot reach the native library.
//!
//! The logger is process-wide, so this binary holds a single test.

use std::sync::Mutex;

use log::{LevelFilter, Log, Metadata, Record};
use mediainfo::{Session, SessionConfig};

struct CapturingLogger {
    messages: Mutex<Vec<String>>,
}

impl Log for CapturingLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if record.target().starts_with("mediainfo") {
            self.messages.lock().unwrap().push(record.args().to_string());
        }
    }

    fn flush(&self) {}
}

static LOGGER: CapturingLogger = CapturingLogger {
    messages: Mutex::new(Vec::new()),
};

#[test]
fn degraded_session_logs_the_fallback_chain() {
    log::set_logger(&LOGGER).expect("Failed to install logger");
    log::set_max_level(LevelFilter::Debug);

    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let config = SessionConfig::new()
        .with_library_path(directory.path().join("libmediainfo-missing.so"))
        .with_preload_dependency(false);

    let session = Session::from_config(&config);
    assert!(!session.is_valid());

    let messages = LOGGER.messages.lock().unwrap().clone();
    let position = |needle: &str| {
        messages
            .iter()
            .position(|message| message.contains(needle))
            .unwrap_or_else(|| panic!("Missing {needle:?} in {messages:#?}"))
    };

    let error = position("Error loading MediaInfo library");
    let fallback = position("Falling back to the less accurate FFmpeg parsing method");
    assert!(error < fallback);
    assert_eq!(fallback, messages.len() - 1, "Fallback notice comes last");

    if cfg!(not(any(windows, target_os = "macos"))) {
        let hint = position("Make sure you have libmediainfo and libzen installed");
        assert!(error < hint && hint < fallback);
    }
}
