//! In-memory stand-in for the native library.
//!
//! `FakeBackend` implements [`Backend`] over a table of fake files so the
//! session lifecycle can be exercised without libmediainfo installed. It
//! records every handle it hands out and every handle it deletes.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::ffi::c_void;
use std::ptr::NonNull;
use std::sync::{Arc, Mutex};

use mediainfo::{ALL_STREAMS, Backend, InfoKind, StreamKind};

pub const VERSION: &str = "MediaInfoLib - v24.01";

/// Streams of one fake media file, in order.
#[derive(Debug, Clone, Default)]
pub struct FakeFile {
    streams: Vec<(StreamKind, Vec<(String, String)>)>,
}

impl FakeFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stream(mut self, kind: StreamKind, fields: &[(&str, &str)]) -> Self {
        let fields = fields
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        self.streams.push((kind, fields));
        self
    }

    fn nth(&self, kind: StreamKind, stream_number: usize) -> Option<&[(String, String)]> {
        self.streams
            .iter()
            .filter(|(stream_kind, _)| *stream_kind == kind)
            .nth(stream_number)
            .map(|(_, fields)| fields.as_slice())
    }

    fn count(&self, kind: StreamKind) -> usize {
        self.streams
            .iter()
            .filter(|(stream_kind, _)| *stream_kind == kind)
            .count()
    }
}

/// One video, one audio, one text and one chapter stream.
pub fn sample_video() -> FakeFile {
    FakeFile::new()
        .stream(
            StreamKind::General,
            &[
                ("Format", "MPEG-4"),
                ("Duration", "12345.000"),
                ("OverallBitRate", "1500000"),
                ("FileSize", "2048"),
                ("Title", "Sample"),
            ],
        )
        .stream(
            StreamKind::Video,
            &[
                ("Format", "AVC"),
                ("Width", "1920"),
                ("Height", "1080"),
                ("FrameRate", "29.970"),
                ("BitRate", "1200000"),
                ("BitDepth", "8"),
            ],
        )
        .stream(
            StreamKind::Audio,
            &[
                ("Format", "AAC"),
                ("Channels", "2"),
                ("SamplingRate", "48000 / 24000"),
                ("BitRate", "128000"),
                ("Language", "en"),
            ],
        )
        .stream(
            StreamKind::Text,
            &[("Format", "UTF-8"), ("Language", "fr")],
        )
        .stream(StreamKind::Chapters, &[("Total", "3")])
}

#[derive(Debug, Default)]
struct FakeState {
    next_handle: usize,
    live: HashSet<usize>,
    created: usize,
    deleted: usize,
    opened: HashMap<usize, String>,
    options: HashMap<String, String>,
    calls: Vec<String>,
}

#[derive(Debug, Default)]
pub struct FakeBackend {
    files: HashMap<String, FakeFile>,
    refuse_create: bool,
    state: Mutex<FakeState>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend whose `create` always returns null.
    pub fn refusing() -> Self {
        Self {
            refuse_create: true,
            ..Self::default()
        }
    }

    pub fn with_file(mut self, path: &str, file: FakeFile) -> Self {
        self.files.insert(path.to_string(), file);
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn live_handles(&self) -> usize {
        self.state.lock().unwrap().live.len()
    }

    pub fn created_count(&self) -> usize {
        self.state.lock().unwrap().created
    }

    pub fn deleted_count(&self) -> usize {
        self.state.lock().unwrap().deleted
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    fn key(handle: NonNull<c_void>) -> usize {
        handle.as_ptr() as usize
    }

    fn with_open_file<T>(
        &self,
        handle: NonNull<c_void>,
        default: T,
        f: impl FnOnce(&FakeFile) -> T,
    ) -> T {
        let state = self.state.lock().unwrap();
        assert!(
            state.live.contains(&Self::key(handle)),
            "native call on a handle that is not live"
        );
        match state
            .opened
            .get(&Self::key(handle))
            .and_then(|path| self.files.get(path))
        {
            Some(file) => f(file),
            None => default,
        }
    }

    fn record(&self, call: String) {
        self.state.lock().unwrap().calls.push(call);
    }
}

fn facet(name: &str, value: &str, info: InfoKind) -> String {
    match info {
        InfoKind::Name => name.to_string(),
        InfoKind::Text => value.to_string(),
        InfoKind::NameText => format!("{name} : {value}"),
        _ => String::new(),
    }
}

impl Backend for FakeBackend {
    fn create(&self) -> Option<NonNull<c_void>> {
        if self.refuse_create {
            return None;
        }
        let mut state = self.state.lock().unwrap();
        state.next_handle += 1;
        let key = 0x1000 * state.next_handle;
        state.live.insert(key);
        state.created += 1;
        NonNull::new(std::ptr::without_provenance_mut::<c_void>(key))
    }

    unsafe fn delete(&self, handle: NonNull<c_void>) {
        let mut state = self.state.lock().unwrap();
        assert!(
            state.live.remove(&Self::key(handle)),
            "handle deleted twice or never created"
        );
        state.opened.remove(&Self::key(handle));
        state.deleted += 1;
    }

    unsafe fn open(&self, handle: NonNull<c_void>, path: &str) -> usize {
        self.record(format!("open:{path}"));
        let mut state = self.state.lock().unwrap();
        assert!(state.live.contains(&Self::key(handle)));
        if self.files.contains_key(path) {
            state.opened.insert(Self::key(handle), path.to_string());
            1
        } else {
            0
        }
    }

    unsafe fn close(&self, handle: NonNull<c_void>) {
        self.record("close".to_string());
        let mut state = self.state.lock().unwrap();
        assert!(state.live.contains(&Self::key(handle)));
        state.opened.remove(&Self::key(handle));
    }

    unsafe fn inform(&self, handle: NonNull<c_void>) -> String {
        self.with_open_file(handle, String::new(), |file| {
            let mut report = String::new();
            for (kind, fields) in &file.streams {
                report.push_str(&format!("{kind}\n"));
                for (name, value) in fields {
                    report.push_str(&format!("{name:<32}: {value}\n"));
                }
                report.push('\n');
            }
            report
        })
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
        self.record(format!(
            "get:{kind}:{stream_number}:{parameter}:{info:?}:{search:?}"
        ));
        self.with_open_file(handle, String::new(), |file| {
            if search != InfoKind::Name {
                return String::new();
            }
            file.nth(kind, stream_number)
                .and_then(|fields| fields.iter().find(|(name, _)| name == parameter))
                .map(|(name, value)| facet(name, value, info))
                .unwrap_or_default()
        })
    }

    unsafe fn get_indexed(
        &self,
        handle: NonNull<c_void>,
        kind: StreamKind,
        stream_number: usize,
        parameter_index: usize,
        info: InfoKind,
    ) -> String {
        self.record(format!(
            "get_indexed:{kind}:{stream_number}:{parameter_index}:{info:?}"
        ));
        self.with_open_file(handle, String::new(), |file| {
            file.nth(kind, stream_number)
                .and_then(|fields| fields.get(parameter_index))
                .map(|(name, value)| facet(name, value, info))
                .unwrap_or_default()
        })
    }

    unsafe fn count_get(
        &self,
        handle: NonNull<c_void>,
        kind: StreamKind,
        stream_number: usize,
    ) -> usize {
        self.record(format!("count_get:{kind}:{stream_number}"));
        self.with_open_file(handle, 0, |file| {
            if stream_number == ALL_STREAMS {
                file.count(kind)
            } else {
                file.nth(kind, stream_number).map_or(0, |fields| fields.len())
            }
        })
    }

    unsafe fn option(&self, handle: NonNull<c_void>, option: &str, value: &str) -> String {
        self.record(format!("option:{option}={value}"));
        let mut state = self.state.lock().unwrap();
        assert!(state.live.contains(&Self::key(handle)));
        if option == "Info_Version" {
            return VERSION.to_string();
        }
        if value.is_empty() {
            state.options.get(option).cloned().unwrap_or_default()
        } else {
            state.options.insert(option.to_string(), value.to_string());
            String::new()
        }
    }
}
