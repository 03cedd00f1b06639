//! FFmpeg-based fallback inspection.
//!
//! Used by [`MediaProbe`](crate::MediaProbe) when the native MediaInfo
//! library cannot be loaded. FFmpeg's view of a file is less detailed (no
//! bit depth for most codecs, short demuxer names instead of format names),
//! but it fills the same [`MediaMetadata`] shape so callers do not need to
//! care which method produced it.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use ffmpeg_next::{
    codec::context::Context as CodecContext, format::stream::Disposition, media::Type,
};

use crate::error::MediaInfoError;
use crate::metadata::{AudioMetadata, MediaMetadata, MetadataSource, TextMetadata, VideoMetadata};

/// Probe `path` with FFmpeg's demuxer.
///
/// # Errors
///
/// [`MediaInfoError::FileOpen`] if FFmpeg cannot initialise or open the
/// file, [`MediaInfoError::FfmpegError`] if a stream's codec parameters
/// cannot be read.
pub fn probe_with_ffmpeg<P: AsRef<Path>>(path: P) -> Result<MediaMetadata, MediaInfoError> {
    let path = path.as_ref();

    ffmpeg_next::init().map_err(|error| MediaInfoError::FileOpen {
        path: path.to_path_buf(),
        reason: format!("FFmpeg initialisation failed: {error}"),
    })?;

    let input_context =
        ffmpeg_next::format::input(&path).map_err(|error| MediaInfoError::FileOpen {
            path: path.to_path_buf(),
            reason: error.to_string(),
        })?;

    let duration_microseconds = input_context.duration();
    let duration = (duration_microseconds > 0)
        .then(|| Duration::from_micros(duration_microseconds as u64));

    let bit_rate = input_context.bit_rate();
    let overall_bit_rate = (bit_rate > 0).then_some(bit_rate as u64);

    let tags: BTreeMap<String, String> = input_context
        .metadata()
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();

    let mut video = Vec::new();
    let mut audio = Vec::new();
    let mut text = Vec::new();
    let mut image_count = 0;

    for stream in input_context.streams() {
        let medium = stream.parameters().medium();
        let language = stream.metadata().get("language").map(|value| value.to_string());

        match medium {
            Type::Video if stream.disposition().contains(Disposition::ATTACHED_PIC) => {
                image_count += 1;
            }
            Type::Video => {
                let context = CodecContext::from_parameters(stream.parameters())?;
                let codec = context.id().name().to_string();
                let decoder = context.decoder().video()?;

                let rate = stream.avg_frame_rate();
                let frame_rate = if rate.denominator() != 0 {
                    rate.numerator() as f64 / rate.denominator() as f64
                } else {
                    0.0
                };

                video.push(VideoMetadata {
                    track_index: video.len(),
                    codec,
                    width: decoder.width(),
                    height: decoder.height(),
                    frame_rate,
                    bit_rate: (decoder.bit_rate() > 0).then_some(decoder.bit_rate() as u64),
                    bit_depth: None,
                });
            }
            Type::Audio => {
                let context = CodecContext::from_parameters(stream.parameters())?;
                let codec = context.id().name().to_string();
                let decoder = context.decoder().audio()?;

                audio.push(AudioMetadata {
                    track_index: audio.len(),
                    codec,
                    channels: decoder.channels(),
                    sample_rate: decoder.rate(),
                    bit_rate: (decoder.bit_rate() > 0).then_some(decoder.bit_rate() as u64),
                    language,
                });
            }
            Type::Subtitle => {
                let codec = CodecContext::from_parameters(stream.parameters())
                    .ok()
                    .map(|context| context.id().name().to_string())
                    .filter(|name| !name.is_empty())
                    .unwrap_or_else(|| "unknown".to_string());

                text.push(TextMetadata {
                    track_index: text.len(),
                    codec,
                    language,
                });
            }
            _ => {}
        }
    }

    let metadata = MediaMetadata {
        format: input_context.format().name().to_string(),
        duration,
        overall_bit_rate,
        file_size: std::fs::metadata(path).ok().map(|entry| entry.len()),
        tags,
        video,
        audio,
        text,
        chapter_count: input_context.nb_chapters() as usize,
        image_count,
        menu_count: 0,
        source: MetadataSource::Ffmpeg,
    };

    log::info!(
        "Probed {} with FFmpeg (format={}, video_streams={}, audio_streams={}, text_streams={})",
        path.display(),
        metadata.format,
        metadata.video.len(),
        metadata.audio.len(),
        metadata.text.len(),
    );

    Ok(metadata)
}
