//! Frame clock utilities.
//!
//! Marker times are stored as fractional seconds but every export is cut on a
//! frame grid. This module provides utilities for:
//! - Snapping times down to the frame that contains them
//! - Converting between seconds and frame indices
//! - Formatting durations for display

/// A frame grid at a fixed frame rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameClock {
    fps: f64,
}

impl FrameClock {
    /// Create a clock for the given frame rate.
    ///
    /// Returns `None` when `fps` is not a positive finite number.
    pub fn new(fps: f64) -> Option<Self> {
        (fps.is_finite() && fps > 0.0).then_some(Self { fps })
    }

    /// Frames per second.
    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Duration of a single frame in seconds.
    pub fn frame_duration(&self) -> f64 {
        1.0 / self.fps
    }

    /// Index of the frame containing `secs`.
    pub fn frame_index(&self, secs: f64) -> i64 {
        (secs * self.fps).floor() as i64
    }

    /// Start time of the frame containing `secs`.
    pub fn snap_down(&self, secs: f64) -> f64 {
        (secs * self.fps).floor() / self.fps
    }

    /// Number of frames in a frame-aligned duration. Rounds, so durations
    /// stored to the millisecond still count their last frame.
    pub fn frame_count(&self, duration_secs: f64) -> u64 {
        (duration_secs * self.fps).round().max(0.0) as u64
    }
}

/// Current wall-clock time as an RFC 3339 string.
pub fn timestamp_now() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Format seconds as `H:MM:SS.fff` with leading zero groups and trailing
/// fractional zeros removed (`5`, `1:05.25`, `1:02:05`).
pub fn format_hhmmss_trimmed(secs: f64) -> String {
    let negative = secs < 0.0;
    let millis_total = (secs.abs() * 1000.0).round() as u64;
    let hours = millis_total / 3_600_000;
    let minutes = (millis_total / 60_000) % 60;
    let seconds = (millis_total / 1000) % 60;
    let millis = millis_total % 1000;

    let mut out = String::new();
    if negative && millis_total > 0 {
        out.push('-');
    }
    if hours > 0 {
        out.push_str(&format!("{hours}:{minutes:02}:{seconds:02}"));
    } else if minutes > 0 {
        out.push_str(&format!("{minutes}:{seconds:02}"));
    } else {
        out.push_str(&seconds.to_string());
    }
    if millis > 0 {
        let frac = format!("{millis:03}");
        out.push('.');
        out.push_str(frac.trim_end_matches('0'));
    }
    out
}
