//! Per-pair timing summary used for export and display.

use std::borrow::Cow;

use clipmarks_model::{LoopMode, MarkerPair, ResolvedSettings, SpeedMap};

use crate::error::TimingError;
use crate::output_duration::OutputDurationEngine;

/// Shortest cross-fade the exporter will apply, in seconds.
pub const MIN_FADE_DURATION: f64 = 0.1;

/// Longest cross-fade as a share of the clip's output duration.
pub const MAX_FADE_SHARE: f64 = 0.4;

/// Timing of one marker pair after its settings are resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct PairTiming {
    pub speed_maps_enabled: bool,
    /// Whether the export applies a variable speed filter.
    pub is_variable_speed: bool,
    /// Duration of the forward clip.
    pub output_duration: f64,
    pub loop_mode: LoopMode,
    /// Cross-fade actually applied, for [`LoopMode::Fade`].
    pub fade_duration: Option<f64>,
    /// Length of the exported clip including its loop treatment.
    pub looped_duration: f64,
}

impl PairTiming {
    pub fn compute(
        pair: &MarkerPair,
        resolved: &ResolvedSettings,
        engine: &OutputDurationEngine,
    ) -> Result<Self, TimingError> {
        let map = effective_speed_map(pair, resolved.enable_speed_maps)?;
        let output_duration = engine.output_duration(&map);
        let frame_dur = 1.0 / engine.fps();

        let (looped_duration, fade_duration) = match resolved.loop_mode {
            LoopMode::None => (output_duration, None),
            LoopMode::Fwrev => {
                let reverse = engine.output_duration(&map.reversed());
                let total = output_duration + reverse - 2.0 * frame_dur;
                (round_millis(total), None)
            }
            LoopMode::Fade => {
                let fade = effective_fade(resolved.fade_duration, output_duration);
                (round_millis(output_duration - fade), Some(fade))
            }
        };

        let is_variable_speed = resolved.enable_speed_maps
            && map.is_variable_speed()
            && resolved.loop_mode != LoopMode::Fwrev;

        tracing::debug!(
            output_duration,
            looped_duration,
            loop_mode = ?resolved.loop_mode,
            is_variable_speed,
            "Computed pair timing"
        );

        Ok(Self {
            speed_maps_enabled: resolved.enable_speed_maps,
            is_variable_speed,
            output_duration,
            loop_mode: resolved.loop_mode,
            fade_duration,
            looped_duration,
        })
    }
}

/// The map the exporter uses: the pair's own map, or a constant map at the
/// pair speed when speed maps are disabled.
pub fn effective_speed_map(
    pair: &MarkerPair,
    speed_maps_enabled: bool,
) -> Result<Cow<'_, SpeedMap>, TimingError> {
    if speed_maps_enabled {
        Ok(Cow::Borrowed(pair.speed_map()))
    } else {
        let map = SpeedMap::constant(pair.start(), pair.end(), pair.speed())?;
        Ok(Cow::Owned(map))
    }
}

/// Clamp a requested fade to `[0.1, 0.4 * duration]`; the lower bound wins.
pub fn effective_fade(requested: f64, output_duration: f64) -> f64 {
    MIN_FADE_DURATION.max(requested.min(MAX_FADE_SHARE * output_duration))
}

fn round_millis(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipmarks_model::{Crop, EncodeOptions, Settings, SpeedPoint};

    fn ramp_pair() -> MarkerPair {
        let map = SpeedMap::new(vec![
            SpeedPoint::new(0.0, 1.0),
            SpeedPoint::new(5.0, 2.0),
            SpeedPoint::new(10.01, 2.0),
        ])
        .unwrap();
        MarkerPair::with_speed_map(map, Crop::FULL)
    }

    fn resolve(pair: &MarkerPair, overrides: EncodeOptions) -> ResolvedSettings {
        let mut pair = pair.clone();
        pair.overrides = overrides;
        ResolvedSettings::resolve(&pair, &Settings::default(), None)
    }

    #[test]
    fn test_no_loop_matches_forward_duration() {
        let engine = OutputDurationEngine::new(30.0).unwrap();
        let pair = ramp_pair();
        let timing = PairTiming::compute(&pair, &resolve(&pair, Default::default()), &engine).unwrap();
        assert!(timing.is_variable_speed);
        assert_eq!(timing.looped_duration, timing.output_duration);
        assert_eq!(timing.output_duration, engine.output_duration(pair.speed_map()));
    }

    #[test]
    fn test_disabled_speed_maps_use_pair_speed() {
        let engine = OutputDurationEngine::new(30.0).unwrap();
        let pair = ramp_pair();
        let overrides = EncodeOptions {
            enable_speed_maps: Some(false),
            ..Default::default()
        };
        let timing = PairTiming::compute(&pair, &resolve(&pair, overrides), &engine).unwrap();
        assert!(!timing.is_variable_speed);
        assert!((timing.output_duration - (10.0 + 1.0 / 30.0)).abs() < 1e-3);
    }

    #[test]
    fn test_fwrev_adds_reverse_leg() {
        let engine = OutputDurationEngine::new(30.0).unwrap();
        let pair = MarkerPair::new(0.0, 4.01, 1.0, Crop::FULL).unwrap();
        let overrides = EncodeOptions {
            loop_mode: Some(LoopMode::Fwrev),
            ..Default::default()
        };
        let timing = PairTiming::compute(&pair, &resolve(&pair, overrides), &engine).unwrap();
        let expected = 2.0 * timing.output_duration - 2.0 / 30.0;
        assert!((timing.looped_duration - expected).abs() < 1e-3);
        assert!(!timing.is_variable_speed);
    }

    #[test]
    fn test_fade_is_clamped() {
        assert_eq!(effective_fade(0.5, 10.0), 0.5);
        assert_eq!(effective_fade(5.0, 10.0), 4.0);
        assert_eq!(effective_fade(0.01, 10.0), 0.1);
        // The lower bound wins over the share cap on very short clips.
        assert_eq!(effective_fade(0.5, 0.1), 0.1);

        let engine = OutputDurationEngine::new(30.0).unwrap();
        let pair = MarkerPair::new(0.0, 4.01, 1.0, Crop::FULL).unwrap();
        let overrides = EncodeOptions {
            loop_mode: Some(LoopMode::Fade),
            fade_duration: Some(1.0),
            ..Default::default()
        };
        let timing = PairTiming::compute(&pair, &resolve(&pair, overrides), &engine).unwrap();
        assert_eq!(timing.fade_duration, Some(1.0));
        assert!((timing.looped_duration - (timing.output_duration - 1.0)).abs() < 1e-9);
    }
}
