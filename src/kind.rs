//! Stream kinds, info kinds and parameter references.
//!
//! The discriminants of [`StreamKind`] and [`InfoKind`] are part of the
//! native ABI: they are passed to the library as plain integers and must
//! match its own enumeration order exactly. They are written out explicitly
//! so that reordering or inserting a variant can never shift their meaning.

use std::ffi::c_int;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Stream number meaning "all streams of this kind".
///
/// Passed as the stream number to
/// [`Session::count_in`](crate::Session::count_in) it makes the native
/// library count streams instead of parameters. This is `(size_t)-1` on the
/// native side.
pub const ALL_STREAMS: usize = usize::MAX;

/// Logical grouping of metadata within a media file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum StreamKind {
    /// Container-level information.
    General = 0,
    /// Video tracks.
    Video = 1,
    /// Audio tracks.
    Audio = 2,
    /// Text (subtitle) tracks.
    Text = 3,
    /// Chapter lists.
    Chapters = 4,
    /// Still images.
    Image = 5,
    /// Menus (also used for chapters by newer library versions).
    Menu = 6,
}

impl StreamKind {
    /// Every stream kind, in native order.
    pub const ALL: [StreamKind; 7] = [
        StreamKind::General,
        StreamKind::Video,
        StreamKind::Audio,
        StreamKind::Text,
        StreamKind::Chapters,
        StreamKind::Image,
        StreamKind::Menu,
    ];

    /// The value passed across the native boundary.
    pub fn as_raw(self) -> c_int {
        self as c_int
    }

    /// Name as used by the native library in its reports.
    pub fn name(self) -> &'static str {
        match self {
            StreamKind::General => "General",
            StreamKind::Video => "Video",
            StreamKind::Audio => "Audio",
            StreamKind::Text => "Text",
            StreamKind::Chapters => "Chapters",
            StreamKind::Image => "Image",
            StreamKind::Menu => "Menu",
        }
    }
}

impl Display for StreamKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.name())
    }
}

impl FromStr for StreamKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "general" | "container" => Ok(StreamKind::General),
            "video" => Ok(StreamKind::Video),
            "audio" => Ok(StreamKind::Audio),
            "text" | "subtitle" | "subtitles" => Ok(StreamKind::Text),
            "chapters" | "chapter" => Ok(StreamKind::Chapters),
            "image" => Ok(StreamKind::Image),
            "menu" => Ok(StreamKind::Menu),
            _ => Err(format!("unknown stream kind: {value}")),
        }
    }
}

/// Which facet of a parameter to retrieve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(i32)]
pub enum InfoKind {
    /// Unique name of the parameter.
    Name = 0,
    /// Value of the parameter. This is the default.
    #[default]
    Text = 1,
    /// Unique name of the measure unit of the parameter.
    Measure = 2,
    /// Option flags of the parameter.
    Options = 3,
    /// Translated name of the parameter.
    NameText = 4,
    /// Translated name of the measure unit.
    MeasureText = 5,
    /// More information about the parameter.
    Info = 6,
    /// How the parameter is supported: N (no), B (beta), R (read only),
    /// W (read/write).
    HowTo = 7,
    /// Domain of this piece of information.
    Domain = 8,
}

impl InfoKind {
    /// The value passed across the native boundary.
    pub fn as_raw(self) -> c_int {
        self as c_int
    }
}

impl FromStr for InfoKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().replace('-', "_").as_str() {
            "name" => Ok(InfoKind::Name),
            "text" => Ok(InfoKind::Text),
            "measure" => Ok(InfoKind::Measure),
            "options" => Ok(InfoKind::Options),
            "name_text" => Ok(InfoKind::NameText),
            "measure_text" => Ok(InfoKind::MeasureText),
            "info" => Ok(InfoKind::Info),
            "howto" | "how_to" => Ok(InfoKind::HowTo),
            "domain" => Ok(InfoKind::Domain),
            _ => Err(format!("unknown info kind: {value}")),
        }
    }
}

/// Reference to one metadata field within a stream instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parameter<'a> {
    /// Symbolic name, e.g. `"Width"` or `"Format"`.
    Name(&'a str),
    /// Zero-based position within the stream.
    Index(usize),
}

impl<'a> From<&'a str> for Parameter<'a> {
    fn from(name: &'a str) -> Self {
        Parameter::Name(name)
    }
}

impl From<usize> for Parameter<'_> {
    fn from(index: usize) -> Self {
        Parameter::Index(index)
    }
}
