//! Exact output duration of a sped-up clip.
//!
//! Speed is linear in source time within each segment, so the output time
//! spent on a segment is the integral of `1 / speed`, which has a closed form:
//! `(1/m) * ln|m*t + b|` for a slope `m`, or `duration / speed` when flat.
//!
//! Two frame-grid corrections match how the exporter trims input:
//! - the first decoded frame is the first one at or after the pair start, so
//!   every segment is shifted back by that delay (`start_trim`)
//! - the last decoded frame is the last one strictly before the pair end

use clipmarks_common::FrameClock;
use clipmarks_model::SpeedMap;

use crate::error::TimingError;

/// Frame counts this close to an integer are treated as sitting on the grid.
const GRID_EPSILON: f64 = 1e-9;

/// Source distance below which the pair end counts as frame-aligned.
const END_ALIGN_EPSILON: f64 = 1e-10;

/// Output contribution of a single speed-map segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentTiming {
    pub index: usize,
    /// Source span of the segment in seconds.
    pub input_start: f64,
    pub input_end: f64,
    /// Integration bounds after the start shift and last-frame correction.
    pub sect_start: f64,
    pub sect_end: f64,
    pub start_speed: f64,
    pub end_speed: f64,
    /// Output seconds this segment adds (0 for skipped segments).
    pub output: f64,
    pub skipped: bool,
}

/// Full result of an output-duration computation.
#[derive(Debug, Clone, PartialEq)]
pub struct DurationBreakdown {
    pub fps: f64,
    /// Delay from the pair start to the first frame at or after it.
    pub start_trim: f64,
    pub segments: Vec<SegmentTiming>,
    /// Sum of the segment integrals before frame snapping.
    pub raw_total: f64,
    /// Final duration, snapped to the frame grid with the held last frame.
    pub output_duration: f64,
}

/// Computes output durations at a fixed frame rate.
#[derive(Debug, Clone, Copy)]
pub struct OutputDurationEngine {
    clock: FrameClock,
}

impl OutputDurationEngine {
    /// Create an engine. Rejects non-positive or non-finite frame rates.
    pub fn new(fps: f64) -> Result<Self, TimingError> {
        let clock = FrameClock::new(fps).ok_or(TimingError::InvalidFps { fps })?;
        Ok(Self { clock })
    }

    pub fn fps(&self) -> f64 {
        self.clock.fps()
    }

    /// Output duration of `map` in seconds, rounded to milliseconds.
    pub fn output_duration(&self, map: &SpeedMap) -> f64 {
        self.breakdown(map).output_duration
    }

    /// Output duration together with the per-segment contributions.
    pub fn breakdown(&self, map: &SpeedMap) -> DurationBreakdown {
        let fps = self.clock.fps();
        let frame_dur = self.clock.frame_duration();
        let start = map.start();
        let start_trim = snap_ceil(start * fps) / fps - start;
        let last_index = map.len() - 2;

        let mut segments = Vec::with_capacity(map.len() - 1);
        let mut raw_total = 0.0;

        for (index, (left, right)) in map.segments().enumerate() {
            let sect_start = left.x - start - start_trim;
            let sect_end = if index == last_index {
                let last_frame = last_frame_time(right.x, fps, frame_dur);
                round_to(last_frame - start - start_trim, 6)
            } else {
                right.x - start - start_trim
            };

            let sect_duration = sect_end - sect_start;
            let mut timing = SegmentTiming {
                index,
                input_start: left.x,
                input_end: right.x,
                sect_start,
                sect_end,
                start_speed: left.y,
                end_speed: right.y,
                output: 0.0,
                skipped: false,
            };

            if sect_duration == 0.0 {
                timing.skipped = true;
                tracing::debug!(index, "Skipping zero-length speed segment");
                segments.push(timing);
                continue;
            }

            let m = (right.y - left.y) / sect_duration;
            let b = left.y - m * sect_start;
            timing.output = if m == 0.0 {
                sect_duration / left.y
            } else {
                (1.0 / m) * ((m * sect_end + b).abs().ln() - (m * sect_start + b).abs().ln())
            };
            raw_total += timing.output;

            tracing::debug!(
                index,
                sect_start,
                sect_end,
                start_speed = left.y,
                end_speed = right.y,
                output = timing.output,
                "Speed segment timing"
            );
            segments.push(timing);
        }

        let snapped = (raw_total * fps).round() / fps;
        let output_duration = round_to(snapped + frame_dur, 3);

        DurationBreakdown {
            fps,
            start_trim,
            segments,
            raw_total,
            output_duration,
        }
    }
}

/// Output duration of `map` at `fps`.
pub fn compute_output_duration(map: &SpeedMap, fps: f64) -> Result<f64, TimingError> {
    Ok(OutputDurationEngine::new(fps)?.output_duration(map))
}

/// Time of the last frame that starts strictly before `end`.
fn last_frame_time(end: f64, fps: f64, frame_dur: f64) -> f64 {
    let frames = end * fps;
    let nearest = frames.round();
    if (frames - nearest).abs() < GRID_EPSILON {
        return nearest / fps - frame_dur;
    }
    let last = frames.floor() / fps;
    if end - last < END_ALIGN_EPSILON {
        last - frame_dur
    } else {
        last
    }
}

/// `ceil`, except that values within `GRID_EPSILON` of an integer snap to it.
fn snap_ceil(frames: f64) -> f64 {
    let nearest = frames.round();
    if (frames - nearest).abs() < GRID_EPSILON {
        nearest
    } else {
        frames.ceil()
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipmarks_model::SpeedPoint;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_rejects_invalid_fps() {
        let map = SpeedMap::constant(0.0, 1.0, 1.0).unwrap();
        assert!(compute_output_duration(&map, 0.0).is_err());
        assert!(compute_output_duration(&map, -24.0).is_err());
        assert!(compute_output_duration(&map, f64::INFINITY).is_err());
        assert!(compute_output_duration(&map, f64::NAN).is_err());
    }

    #[test]
    fn test_constant_speed_off_grid() {
        // 10.01s at 30fps: the last frame starts at 10.0s.
        let map = SpeedMap::constant(0.0, 10.01, 1.0).unwrap();
        let duration = compute_output_duration(&map, 30.0).unwrap();
        assert!(approx(duration, 10.0 + 1.0 / 30.0), "got {duration}");

        let map = SpeedMap::constant(0.0, 10.01, 2.0).unwrap();
        let duration = compute_output_duration(&map, 30.0).unwrap();
        assert!(approx(duration, 5.0 + 1.0 / 30.0), "got {duration}");
    }

    #[test]
    fn test_grid_aligned_end_drops_boundary_frame() {
        // A frame starting exactly at the end time is not part of the clip.
        let map = SpeedMap::constant(0.0, 10.0, 1.0).unwrap();
        let duration = compute_output_duration(&map, 30.0).unwrap();
        assert!(approx(duration, 10.0), "got {duration}");
    }

    #[test]
    fn test_start_trim_shifts_segments() {
        let engine = OutputDurationEngine::new(30.0).unwrap();
        let map = SpeedMap::constant(1.01, 3.01, 1.0).unwrap();
        let breakdown = engine.breakdown(&map);
        assert!((breakdown.start_trim - (31.0 / 30.0 - 1.01)).abs() < 1e-9);
        assert!(breakdown.segments[0].sect_start < 0.0);

        let aligned = SpeedMap::constant(1.0, 3.01, 1.0).unwrap();
        assert!(engine.breakdown(&aligned).start_trim.abs() < 1e-12);
    }

    #[test]
    fn test_ramp_integral() {
        // The ramp is integrated up to the last frame before 10s.
        let map = SpeedMap::new(vec![SpeedPoint::new(0.0, 1.0), SpeedPoint::new(10.0, 2.0)])
            .unwrap();
        let breakdown = OutputDurationEngine::new(60.0).unwrap().breakdown(&map);
        let last_frame: f64 = 10.0 - 1.0 / 60.0;
        let m = 1.0 / last_frame;
        let expected_raw = (1.0 / m) * ((m * last_frame + 1.0).ln() - 1.0f64.ln());
        assert!((breakdown.raw_total - expected_raw).abs() < 1e-6);
        assert_eq!(breakdown.segments.len(), 1);
    }

    #[test]
    fn test_zero_length_segment_is_skipped() {
        let map = SpeedMap::new(vec![
            SpeedPoint::new(0.0, 1.0),
            SpeedPoint::new(4.0, 2.0),
            SpeedPoint::new(4.0, 1.0),
            SpeedPoint::new(8.01, 1.0),
        ])
        .unwrap();
        let breakdown = OutputDurationEngine::new(30.0).unwrap().breakdown(&map);
        assert!(breakdown.segments[1].skipped);
        assert_eq!(breakdown.segments[1].output, 0.0);
        assert!(breakdown.output_duration.is_finite());
    }

    #[test]
    fn test_slower_segment_lengthens_output() {
        let fast = SpeedMap::constant(0.0, 4.01, 1.0).unwrap();
        let slow = SpeedMap::constant(0.0, 4.01, 0.5).unwrap();
        let engine = OutputDurationEngine::new(24.0).unwrap();
        assert!(engine.output_duration(&slow) > engine.output_duration(&fast));
        assert!(approx(engine.output_duration(&slow), 8.0 + 1.0 / 24.0));
    }

    #[test]
    fn test_snap_ceil_tolerates_float_noise() {
        assert_eq!(snap_ceil(30.000_000_000_01), 30.0);
        assert_eq!(snap_ceil(29.999_999_999_99), 30.0);
        assert_eq!(snap_ceil(30.2), 31.0);
    }
}
