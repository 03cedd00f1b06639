//! Metadata validation.
//!
//! Provides [`MediaMetadata::validate`](crate::MediaMetadata::validate) which
//! inspects a metadata summary and returns a [`ValidationReport`] describing
//! its structure and any potential issues.
//!
//! # Example
//!
//! ```no_run
//! use mediainfo::MediaProbe;
//!
//! let metadata = MediaProbe::probe("input.mp4")?;
//! let report = metadata.validate();
//! if report.is_valid() {
//!     println!("File looks sane");
//! } else {
//!     for error in &report.errors {
//!         println!("Error: {error}");
//!     }
//! }
//! # Ok::<(), mediainfo::MediaInfoError>(())
//! ```

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::time::Duration;

use crate::metadata::MediaMetadata;

/// Summary of metadata validation.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// Informational notices (not problems).
    pub info: Vec<String>,
    /// Non-fatal issues.
    pub warnings: Vec<String>,
    /// Structural problems.
    pub errors: Vec<String>,
}

impl ValidationReport {
    /// Returns `true` if no errors were found. Warnings do not count.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Total number of entries (info + warnings + errors).
    pub fn issue_count(&self) -> usize {
        self.info.len() + self.warnings.len() + self.errors.len()
    }
}

impl Display for ValidationReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        for item in &self.info {
            writeln!(f, "[INFO] {item}")?;
        }
        for item in &self.warnings {
            writeln!(f, "[WARN] {item}")?;
        }
        for item in &self.errors {
            writeln!(f, "[ERROR] {item}")?;
        }
        if self.issue_count() == 0 {
            writeln!(f, "No issues found.")?;
        }
        Ok(())
    }
}

pub(crate) fn validate_metadata(metadata: &MediaMetadata) -> ValidationReport {
    let mut report = ValidationReport::default();

    // ── Stream presence ────────────────────────────────────────────
    if metadata.video.is_empty() && metadata.audio.is_empty() && metadata.image_count == 0 {
        report
            .errors
            .push("File contains no video, audio or image streams".to_string());
    }

    if metadata.format.is_empty() {
        report
            .warnings
            .push("Container format was not recognised".to_string());
    } else {
        report.info.push(format!(
            "Container: {} ({:?})",
            metadata.format, metadata.source
        ));
    }

    // ── Duration ───────────────────────────────────────────────────
    match metadata.duration {
        None if !metadata.video.is_empty() || !metadata.audio.is_empty() => {
            report.warnings.push("Media duration is unknown".to_string());
        }
        Some(duration) if duration == Duration::ZERO => {
            report.warnings.push("Media duration is zero".to_string());
        }
        _ => {}
    }

    // ── Video ──────────────────────────────────────────────────────
    for video in &metadata.video {
        if video.width == 0 || video.height == 0 {
            report.errors.push(format!(
                "Video track {}: invalid dimensions {}×{}",
                video.track_index, video.width, video.height,
            ));
        }

        if video.frame_rate <= 0.0 {
            report.warnings.push(format!(
                "Video track {}: frame rate is unknown or variable",
                video.track_index,
            ));
        } else if video.frame_rate > 240.0 {
            report.warnings.push(format!(
                "Video track {}: unusually high frame rate ({:.1} fps)",
                video.track_index, video.frame_rate,
            ));
        }

        report.info.push(format!(
            "Video: {} {}×{} @ {:.3} fps",
            video.codec, video.width, video.height, video.frame_rate,
        ));
    }

    // ── Audio ──────────────────────────────────────────────────────
    for audio in &metadata.audio {
        if audio.sample_rate == 0 {
            report.errors.push(format!(
                "Audio track {}: sample rate is zero",
                audio.track_index
            ));
        }

        if audio.channels == 0 {
            report.errors.push(format!(
                "Audio track {}: channel count is zero",
                audio.track_index
            ));
        }

        report.info.push(format!(
            "Audio: {} {}Hz {}ch",
            audio.codec, audio.sample_rate, audio.channels,
        ));
    }

    // ── Text and chapters ──────────────────────────────────────────
    for text in &metadata.text {
        let language = text.language.as_deref().unwrap_or("unknown language");
        report
            .info
            .push(format!("Text: {} ({language})", text.codec));
    }

    if metadata.chapter_count > 0 || metadata.menu_count > 0 {
        report.info.push(format!(
            "{} chapter stream(s), {} menu stream(s)",
            metadata.chapter_count, metadata.menu_count,
        ));
    }

    report
}
