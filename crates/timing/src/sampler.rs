//! Instantaneous speed lookup for preview playback.

use clipmarks_model::SpeedMap;

use crate::easing::{ease, EasingMode};

/// Speed returned when `time` falls outside every segment.
pub const MISS_SPEED: f64 = 1.0;

/// Sampling parameters shared across preview ticks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedSampler {
    pub easing: EasingMode,
    /// Round speeds to the nearest multiple of this value (0 disables).
    pub round_multiple: f64,
    /// Decimal places kept after rounding to `round_multiple`.
    pub round_precision: u32,
}

impl Default for SpeedSampler {
    fn default() -> Self {
        Self {
            easing: EasingMode::Linear,
            round_multiple: 0.0,
            round_precision: 2,
        }
    }
}

impl SpeedSampler {
    pub fn new(easing: EasingMode, round_multiple: f64, round_precision: u32) -> Self {
        Self {
            easing,
            round_multiple,
            round_precision,
        }
    }

    pub fn sample(&self, map: &SpeedMap, time: f64) -> f64 {
        sample(
            map,
            time,
            self.easing,
            self.round_multiple,
            self.round_precision,
        )
    }
}

/// Speed of `map` at source time `time`.
///
/// Scans for the first segment containing `time`, eases progress through it
/// and interpolates the speed. A time outside the map samples as `1.0`.
pub fn sample(
    map: &SpeedMap,
    time: f64,
    mode: EasingMode,
    round_multiple: f64,
    round_precision: u32,
) -> f64 {
    if map.is_uniform_pair() {
        return map.first().y;
    }

    let Some((left, right)) = map
        .segments()
        .find(|(left, right)| left.x <= time && time <= right.x)
    else {
        return MISS_SPEED;
    };

    if left.y == right.y {
        return left.y;
    }

    let progress = (time - left.x) / (right.x - left.x);
    let eased = ease(mode, progress);
    // Weighted form so that eased = 0 and eased = 1 land exactly on the points.
    let mut raw = left.y * (1.0 - eased) + right.y * eased;
    if !raw.is_finite() || raw == 0.0 {
        raw = right.y;
    }

    if round_multiple > 0.0 {
        round_value(raw, round_multiple, round_precision)
    } else {
        raw
    }
}

/// Round to the nearest multiple of `multiple`, then to `precision` decimals.
pub fn round_value(value: f64, multiple: f64, precision: u32) -> f64 {
    let snapped = (value / multiple).round() * multiple;
    let scale = 10f64.powi(precision as i32);
    (snapped * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipmarks_model::SpeedPoint;

    fn peak() -> SpeedMap {
        SpeedMap::new(vec![
            SpeedPoint::new(0.0, 1.0),
            SpeedPoint::new(5.0, 2.0),
            SpeedPoint::new(10.0, 1.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_constant_map_everywhere() {
        let map = SpeedMap::constant(0.0, 10.0, 1.0).unwrap();
        for t in [-1.0, 0.0, 3.3, 10.0, 11.0] {
            assert_eq!(sample(&map, t, EasingMode::Linear, 0.05, 2), 1.0);
        }
    }

    #[test]
    fn test_linear_midpoint() {
        let map = peak();
        assert_eq!(sample(&map, 2.5, EasingMode::Linear, 0.0, 2), 1.5);
        assert_eq!(sample(&map, 2.5, EasingMode::Linear, 0.05, 2), 1.5);
        assert_eq!(sample(&map, 7.5, EasingMode::Linear, 0.0, 2), 1.5);
    }

    #[test]
    fn test_degenerate_segment_falls_back_to_right_speed() {
        let map = SpeedMap::new(vec![
            SpeedPoint::new(4.0, 2.0),
            SpeedPoint::new(4.0, 1.0),
            SpeedPoint::new(8.0, 1.0),
        ])
        .unwrap();
        assert_eq!(sample(&map, 4.0, EasingMode::Linear, 0.0, 2), 1.0);
        assert_eq!(sample(&map, 4.0, EasingMode::CubicInOut, 0.05, 2), 1.0);
        assert_eq!(sample(&map, 6.0, EasingMode::Linear, 0.0, 2), 1.0);
    }

    #[test]
    fn test_boundaries_are_exact() {
        let map = peak();
        for mode in [EasingMode::Linear, EasingMode::CubicInOut] {
            assert_eq!(sample(&map, 0.0, mode, 0.0, 2), 1.0);
            assert_eq!(sample(&map, 5.0, mode, 0.0, 2), 2.0);
            assert_eq!(sample(&map, 10.0, mode, 0.0, 2), 1.0);
        }
    }

    #[test]
    fn test_miss_returns_one() {
        let map = SpeedMap::new(vec![
            SpeedPoint::new(2.0, 0.5),
            SpeedPoint::new(4.0, 0.25),
        ])
        .unwrap();
        assert_eq!(sample(&map, 1.0, EasingMode::Linear, 0.0, 2), MISS_SPEED);
        assert_eq!(sample(&map, 4.5, EasingMode::Linear, 0.0, 2), MISS_SPEED);
    }

    #[test]
    fn test_cubic_eases_slower_near_start() {
        let map = peak();
        let linear = sample(&map, 1.0, EasingMode::Linear, 0.0, 2);
        let cubic = sample(&map, 1.0, EasingMode::CubicInOut, 0.0, 2);
        assert!(cubic < linear);
        assert!((cubic - 1.032).abs() < 1e-9);
    }

    #[test]
    fn test_rounding_to_multiple() {
        let map = peak();
        // Raw 1.26 rounds to 1.25 at a 0.05 multiple.
        let speed = sample(&map, 1.3, EasingMode::Linear, 0.05, 2);
        assert_eq!(speed, 1.25);
        assert_eq!(round_value(0.333_333, 0.1, 2), 0.3);
        assert_eq!(round_value(1.0, 0.25, 2), 1.0);
    }

    #[test]
    fn test_sampler_struct_matches_function() {
        let sampler = SpeedSampler::new(EasingMode::CubicInOut, 0.05, 2);
        let map = peak();
        assert_eq!(
            sampler.sample(&map, 3.0),
            sample(&map, 3.0, EasingMode::CubicInOut, 0.05, 2)
        );
    }
}
