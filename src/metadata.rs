//! Media metadata types.
//!
//! This module defines the typed summary returned by
//! [`Session::metadata`](crate::Session::metadata) and
//! [`MediaProbe::probe`](crate::MediaProbe::probe). It is assembled purely
//! from parameter lookups on an open session; numeric fields that are
//! missing or unparseable come back as `None` (or zero for the dimensions
//! and rates, which the validation report then flags).

use std::collections::BTreeMap;
use std::time::Duration;

use crate::error::MediaInfoError;
use crate::kind::StreamKind;
use crate::session::Session;
use crate::validation::{ValidationReport, validate_metadata};

/// Container-level fields copied into [`MediaMetadata::tags`] when present.
pub const TAG_FIELDS: &[&str] = &[
    "Title",
    "Movie",
    "Album",
    "Performer",
    "Track",
    "Genre",
    "Recorded_Date",
    "Encoded_Date",
    "Comment",
    "Copyright",
    "Encoded_Application",
    "Encoded_Library",
];

/// Which inspection method produced a [`MediaMetadata`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataSource {
    /// The native MediaInfo library.
    MediaInfo,
    /// The FFmpeg fallback.
    Ffmpeg,
}

/// Complete metadata for a media file.
///
/// # Example
///
/// ```no_run
/// use mediainfo::Session;
///
/// let mut session = Session::try_new()?;
/// session.open("input.mkv")?;
/// let metadata = session.metadata()?;
/// println!("Format: {}", metadata.format);
/// println!("Duration: {:?}", metadata.duration);
/// for video in &metadata.video {
///     println!("Video: {}x{} [{}]", video.width, video.height, video.codec);
/// }
/// # Ok::<(), mediainfo::MediaInfoError>(())
/// ```
#[derive(Debug, Clone)]
#[must_use]
pub struct MediaMetadata {
    /// Container format (e.g. `"MPEG-4"`, `"Matroska"`).
    pub format: String,
    /// Total duration, if known.
    pub duration: Option<Duration>,
    /// Overall bit rate in bits per second.
    pub overall_bit_rate: Option<u64>,
    /// File size in bytes.
    pub file_size: Option<u64>,
    /// Container tags such as title, album or encoder.
    pub tags: BTreeMap<String, String>,
    /// One entry per video stream, in stream order.
    pub video: Vec<VideoMetadata>,
    /// One entry per audio stream, in stream order.
    pub audio: Vec<AudioMetadata>,
    /// One entry per text (subtitle) stream, in stream order.
    pub text: Vec<TextMetadata>,
    /// Number of chapter streams.
    pub chapter_count: usize,
    /// Number of image streams.
    pub image_count: usize,
    /// Number of menu streams.
    pub menu_count: usize,
    /// Inspection method that produced this summary.
    pub source: MetadataSource,
}

/// Metadata for a video stream.
#[derive(Debug, Clone)]
#[must_use]
pub struct VideoMetadata {
    /// Zero-based position among the video streams.
    pub track_index: usize,
    /// Codec or format name (e.g. `"AVC"`, `"HEVC"`).
    pub codec: String,
    /// Frame width in pixels, zero if unknown.
    pub width: u32,
    /// Frame height in pixels, zero if unknown.
    pub height: u32,
    /// Frames per second, zero if unknown.
    pub frame_rate: f64,
    /// Bit rate in bits per second.
    pub bit_rate: Option<u64>,
    /// Bits per sample.
    pub bit_depth: Option<u32>,
}

/// Metadata for an audio stream.
#[derive(Debug, Clone)]
#[must_use]
pub struct AudioMetadata {
    /// Zero-based position among the audio streams.
    pub track_index: usize,
    /// Codec or format name (e.g. `"AAC"`, `"FLAC"`).
    pub codec: String,
    /// Number of channels, zero if unknown.
    pub channels: u16,
    /// Sample rate in hertz, zero if unknown.
    pub sample_rate: u32,
    /// Bit rate in bits per second.
    pub bit_rate: Option<u64>,
    /// Language tag, if any.
    pub language: Option<String>,
}

/// Metadata for a text (subtitle) stream.
#[derive(Debug, Clone)]
#[must_use]
pub struct TextMetadata {
    /// Zero-based position among the text streams.
    pub track_index: usize,
    /// Codec or format name (e.g. `"UTF-8"`, `"PGS"`).
    pub codec: String,
    /// Language tag, if any.
    pub language: Option<String>,
}

impl MediaMetadata {
    /// The first video stream, if any.
    pub fn primary_video(&self) -> Option<&VideoMetadata> {
        self.video.first()
    }

    /// The first audio stream, if any.
    pub fn primary_audio(&self) -> Option<&AudioMetadata> {
        self.audio.first()
    }

    /// Run the validation checks on this summary.
    pub fn validate(&self) -> ValidationReport {
        validate_metadata(self)
    }
}

/// Build a [`MediaMetadata`] from the file currently open in `session`.
pub(crate) fn read_metadata(session: &Session) -> Result<MediaMetadata, MediaInfoError> {
    let general = |parameter: &str| session.get(StreamKind::General, 0, parameter);

    let format = general("Format")?;
    let duration = parse_number(&general("Duration")?)
        .filter(|milliseconds| *milliseconds >= 0.0)
        .map(|milliseconds| Duration::from_micros((milliseconds * 1000.0).round() as u64));
    let overall_bit_rate = parse_unsigned(&general("OverallBitRate")?);
    let file_size = parse_unsigned(&general("FileSize")?);

    let mut tags = BTreeMap::new();
    for &field in TAG_FIELDS {
        let value = general(field)?;
        if !value.is_empty() {
            tags.insert(field.to_string(), value);
        }
    }

    let video = (0..session.count(StreamKind::Video)?)
        .map(|track_index| -> Result<VideoMetadata, MediaInfoError> {
            let get = |parameter: &str| session.get(StreamKind::Video, track_index, parameter);
            Ok(VideoMetadata {
                track_index,
                codec: get("Format")?,
                width: parse_unsigned(&get("Width")?).unwrap_or(0) as u32,
                height: parse_unsigned(&get("Height")?).unwrap_or(0) as u32,
                frame_rate: parse_number(&get("FrameRate")?).unwrap_or(0.0),
                bit_rate: parse_unsigned(&get("BitRate")?),
                bit_depth: parse_unsigned(&get("BitDepth")?).map(|depth| depth as u32),
            })
        })
        .collect::<Result<Vec<_>, MediaInfoError>>()?;

    let audio = (0..session.count(StreamKind::Audio)?)
        .map(|track_index| -> Result<AudioMetadata, MediaInfoError> {
            let get = |parameter: &str| session.get(StreamKind::Audio, track_index, parameter);
            Ok(AudioMetadata {
                track_index,
                codec: get("Format")?,
                channels: parse_unsigned(&get("Channels")?).unwrap_or(0) as u16,
                sample_rate: parse_unsigned(&get("SamplingRate")?).unwrap_or(0) as u32,
                bit_rate: parse_unsigned(&get("BitRate")?),
                language: non_empty(get("Language")?),
            })
        })
        .collect::<Result<Vec<_>, MediaInfoError>>()?;

    let text = (0..session.count(StreamKind::Text)?)
        .map(|track_index| -> Result<TextMetadata, MediaInfoError> {
            let get = |parameter: &str| session.get(StreamKind::Text, track_index, parameter);
            Ok(TextMetadata {
                track_index,
                codec: get("Format")?,
                language: non_empty(get("Language")?),
            })
        })
        .collect::<Result<Vec<_>, MediaInfoError>>()?;

    let metadata = MediaMetadata {
        format,
        duration,
        overall_bit_rate,
        file_size,
        tags,
        video,
        audio,
        text,
        chapter_count: session.count(StreamKind::Chapters)?,
        image_count: session.count(StreamKind::Image)?,
        menu_count: session.count(StreamKind::Menu)?,
        source: MetadataSource::MediaInfo,
    };

    log::debug!(
        "Collected metadata (format={}, video_streams={}, audio_streams={}, text_streams={})",
        metadata.format,
        metadata.video.len(),
        metadata.audio.len(),
        metadata.text.len(),
    );

    Ok(metadata)
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

/// Parse the first number of a value.
///
/// Multi-valued fields are reported as `"48000 / 44100"`; the first value
/// describes the main substream.
fn parse_number(value: &str) -> Option<f64> {
    value
        .split('/')
        .next()
        .and_then(|first| first.split_whitespace().next())
        .and_then(|token| token.parse::<f64>().ok())
        .filter(|number| number.is_finite())
}

fn parse_unsigned(value: &str) -> Option<u64> {
    parse_number(value)
        .filter(|number| *number >= 0.0)
        .map(|number| number.round() as u64)
}
