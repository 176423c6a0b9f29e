//! Global settings and per-pair overrides.
//!
//! Every overridable key is an `Option`: `None` means "inherit". A value is
//! resolved as pair override → global setting → built-in default.

use serde::{Deserialize, Serialize};

use crate::crop::{Crop, CropResolution};
use crate::marker_pair::MarkerPair;

/// Speed-map easing rounding used when neither the pair nor the settings set one.
pub const DEFAULT_ROUND_SPEED_MAP_EASING: f64 = 0.05;

/// Cross-fade duration used when neither the pair nor the settings set one.
pub const DEFAULT_FADE_DURATION: f64 = 0.5;

/// Special looping applied to an exported clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LoopMode {
    #[default]
    None,
    /// Forward then reverse (ping-pong).
    Fwrev,
    /// Cross-fade the clip end into its start.
    Fade,
}

/// A filter preset such as denoise or video stabilization.
///
/// Only `enabled` and `desc` are interpreted here; preset parameters are kept
/// verbatim for the export side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterPreset {
    pub enabled: bool,
    pub desc: String,
    #[serde(flatten)]
    pub params: serde_json::Map<String, serde_json::Value>,
}

impl FilterPreset {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            desc: "Disabled".to_string(),
            params: serde_json::Map::new(),
        }
    }
}

/// Encode and preview options that a marker pair may override.
///
/// The same shape is used for the global defaults in [`Settings`] and for each
/// pair's `overrides`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodeOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_prefix: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gamma: Option<f64>,

    /// Encoder speed/quality trade-off (0-5).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encode_speed: Option<u8>,

    /// Constant rate factor (0-63).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crf: Option<u8>,

    /// Target max bitrate in kbps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_max_bitrate: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub two_pass: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expand_color_range: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub denoise: Option<FilterPreset>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_stabilization: Option<FilterPreset>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_speed_maps: Option<bool>,

    /// Multiple that preview speeds are rounded to (0 disables rounding).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round_speed_map_easing: Option<f64>,

    #[serde(default, rename = "loop", skip_serializing_if = "Option::is_none")]
    pub loop_mode: Option<LoopMode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fade_duration: Option<f64>,
}

impl EncodeOptions {
    /// Layer `self` over `fallback`: every key set here wins, the rest inherit.
    pub fn layered_over(&self, fallback: &EncodeOptions) -> EncodeOptions {
        EncodeOptions {
            title_prefix: self
                .title_prefix
                .clone()
                .or_else(|| fallback.title_prefix.clone()),
            gamma: self.gamma.or(fallback.gamma),
            encode_speed: self.encode_speed.or(fallback.encode_speed),
            crf: self.crf.or(fallback.crf),
            target_max_bitrate: self.target_max_bitrate.or(fallback.target_max_bitrate),
            two_pass: self.two_pass.or(fallback.two_pass),
            audio: self.audio.or(fallback.audio),
            expand_color_range: self.expand_color_range.or(fallback.expand_color_range),
            denoise: self.denoise.clone().or_else(|| fallback.denoise.clone()),
            video_stabilization: self
                .video_stabilization
                .clone()
                .or_else(|| fallback.video_stabilization.clone()),
            enable_speed_maps: self.enable_speed_maps.or(fallback.enable_speed_maps),
            round_speed_map_easing: non_negative(self.round_speed_map_easing)
                .or(non_negative(fallback.round_speed_map_easing)),
            loop_mode: self.loop_mode.or(fallback.loop_mode),
            fade_duration: self.fade_duration.or(fallback.fade_duration),
        }
    }

    /// True when no key is set.
    pub fn is_empty(&self) -> bool {
        *self == EncodeOptions::default()
    }
}

fn non_negative(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v >= 0.0)
}

/// Global settings for one editing session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default, rename = "videoID", skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_suffix: Option<String>,

    #[serde(default)]
    pub is_vertical_video: bool,

    /// Speed given to newly created marker pairs.
    #[serde(default = "default_new_marker_speed")]
    pub new_marker_speed: f64,

    /// Crop given to newly created marker pairs.
    #[serde(default)]
    pub new_marker_crop: Crop,

    #[serde(default = "default_crop_res_width")]
    pub crop_res_width: u32,

    #[serde(default = "default_crop_res_height")]
    pub crop_res_height: u32,

    /// Merge list, e.g. `"1,3-5;7"`.
    #[serde(default)]
    pub marker_pair_merge_list: String,

    /// Global encode defaults.
    #[serde(flatten)]
    pub encode: EncodeOptions,

    /// Keys this crate does not interpret, preserved on save.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_new_marker_speed() -> f64 {
    1.0
}

fn default_crop_res_width() -> u32 {
    CropResolution::LANDSCAPE.width
}

fn default_crop_res_height() -> u32 {
    CropResolution::LANDSCAPE.height
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            video_id: None,
            video_title: None,
            title_suffix: None,
            is_vertical_video: false,
            new_marker_speed: default_new_marker_speed(),
            new_marker_crop: Crop::FULL,
            crop_res_width: default_crop_res_width(),
            crop_res_height: default_crop_res_height(),
            marker_pair_merge_list: String::new(),
            encode: EncodeOptions::default(),
            extra: serde_json::Map::new(),
        }
    }
}

impl Settings {
    /// Settings for a video, choosing the crop resolution by orientation.
    pub fn for_video(video_id: impl Into<String>, vertical: bool) -> Self {
        let video_id = video_id.into();
        let res = if vertical {
            CropResolution::PORTRAIT
        } else {
            CropResolution::LANDSCAPE
        };
        Self {
            title_suffix: Some(format!("[{video_id}]")),
            video_id: Some(video_id),
            is_vertical_video: vertical,
            crop_res_width: res.width,
            crop_res_height: res.height,
            ..Self::default()
        }
    }

    pub fn crop_resolution(&self) -> CropResolution {
        CropResolution::new(self.crop_res_width, self.crop_res_height)
    }

    pub fn set_crop_resolution(&mut self, res: CropResolution) {
        self.crop_res_width = res.width;
        self.crop_res_height = res.height;
    }

    /// Whether speed maps drive playback for `overrides` (default: enabled).
    pub fn speed_maps_enabled(&self, overrides: &EncodeOptions) -> bool {
        overrides
            .enable_speed_maps
            .or(self.encode.enable_speed_maps)
            .unwrap_or(true)
    }

    /// Rounding multiple for preview speeds under `overrides`.
    pub fn round_speed_map_easing(&self, overrides: &EncodeOptions) -> f64 {
        non_negative(overrides.round_speed_map_easing)
            .or(non_negative(self.encode.round_speed_map_easing))
            .unwrap_or(DEFAULT_ROUND_SPEED_MAP_EASING)
    }
}

/// Encoder defaults derived from a source bitrate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeDefaults {
    pub crf: u8,
    /// Target max bitrate in kbps (0 = unconstrained).
    pub auto_target_max_bitrate: u32,
    pub encode_speed: u8,
    pub two_pass: bool,
}

impl EncodeDefaults {
    /// Pick defaults for a video bitrate in kbps (`None` when unknown).
    pub fn for_bitrate(video_kbps: Option<f64>) -> Self {
        let Some(kbps) = video_kbps.filter(|b| b.is_finite() && *b >= 0.0) else {
            return Self {
                crf: 30,
                auto_target_max_bitrate: 0,
                encode_speed: 2,
                two_pass: false,
            };
        };

        let (crf, factor, encode_speed) = if kbps <= 4000.0 {
            (20, 1.6, 2)
        } else if kbps <= 6000.0 {
            (22, 1.5, 3)
        } else if kbps <= 10000.0 {
            (24, 1.4, 4)
        } else if kbps <= 15000.0 {
            (26, 1.3, 5)
        } else if kbps <= 20000.0 {
            (30, 1.2, 5)
        } else {
            (35, 1.1, 5)
        };

        Self {
            crf,
            auto_target_max_bitrate: (factor * kbps) as u32,
            encode_speed,
            two_pass: false,
        }
    }
}

/// Every overridable key after resolution for one marker pair.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSettings {
    pub title_prefix: Option<String>,
    pub gamma: f64,
    pub encode_speed: u8,
    pub crf: u8,
    pub target_max_bitrate: u32,
    pub two_pass: bool,
    pub audio: bool,
    pub expand_color_range: bool,
    pub denoise: FilterPreset,
    pub video_stabilization: FilterPreset,
    pub enable_speed_maps: bool,
    pub round_speed_map_easing: f64,
    pub loop_mode: LoopMode,
    pub fade_duration: f64,
    /// Share of the full frame covered by the pair's crop.
    pub bitrate_crop_factor: f64,
}

impl ResolvedSettings {
    /// Resolve `pair`'s options against `settings`.
    ///
    /// `source_kbps` is the source video bitrate, scaled by the crop area before
    /// the bitrate table is consulted.
    pub fn resolve(pair: &MarkerPair, settings: &Settings, source_kbps: Option<f64>) -> Self {
        let res = settings.crop_resolution();
        let bitrate_crop_factor = pair.crop.area_fraction(res);
        let defaults = EncodeDefaults::for_bitrate(source_kbps.map(|b| b * bitrate_crop_factor));
        let merged = pair.overrides.layered_over(&settings.encode);

        let target_max_bitrate = match merged.target_max_bitrate {
            Some(target) => {
                EncodeDefaults::for_bitrate(Some(target as f64 * bitrate_crop_factor))
                    .auto_target_max_bitrate
            }
            None => defaults.auto_target_max_bitrate,
        };

        Self {
            title_prefix: merged.title_prefix,
            gamma: merged.gamma.unwrap_or(1.0),
            encode_speed: merged.encode_speed.unwrap_or(defaults.encode_speed),
            crf: merged.crf.unwrap_or(defaults.crf),
            target_max_bitrate,
            two_pass: merged.two_pass.unwrap_or(defaults.two_pass),
            audio: merged.audio.unwrap_or(false),
            expand_color_range: merged.expand_color_range.unwrap_or(false),
            denoise: merged.denoise.unwrap_or_else(FilterPreset::disabled),
            video_stabilization: merged
                .video_stabilization
                .unwrap_or_else(FilterPreset::disabled),
            enable_speed_maps: merged.enable_speed_maps.unwrap_or(true),
            round_speed_map_easing: merged
                .round_speed_map_easing
                .unwrap_or(DEFAULT_ROUND_SPEED_MAP_EASING),
            loop_mode: merged.loop_mode.unwrap_or_default(),
            fade_duration: merged.fade_duration.unwrap_or(DEFAULT_FADE_DURATION),
            bitrate_crop_factor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_wins_over_global() {
        let global = EncodeOptions {
            crf: Some(30),
            audio: Some(true),
            ..Default::default()
        };
        let pair = EncodeOptions {
            crf: Some(18),
            ..Default::default()
        };
        let merged = pair.layered_over(&global);
        assert_eq!(merged.crf, Some(18));
        assert_eq!(merged.audio, Some(true));
        assert_eq!(merged.gamma, None);
    }

    #[test]
    fn test_explicit_false_is_not_absent() {
        let settings = Settings {
            encode: EncodeOptions {
                enable_speed_maps: Some(true),
                ..Default::default()
            },
            ..Default::default()
        };
        let overrides = EncodeOptions {
            enable_speed_maps: Some(false),
            ..Default::default()
        };
        assert!(!settings.speed_maps_enabled(&overrides));
        assert!(settings.speed_maps_enabled(&EncodeOptions::default()));
        assert!(Settings::default().speed_maps_enabled(&EncodeOptions::default()));
    }

    #[test]
    fn test_negative_round_easing_counts_as_absent() {
        let settings = Settings {
            encode: EncodeOptions {
                round_speed_map_easing: Some(0.1),
                ..Default::default()
            },
            ..Default::default()
        };
        let negative = EncodeOptions {
            round_speed_map_easing: Some(-1.0),
            ..Default::default()
        };
        assert_eq!(settings.round_speed_map_easing(&negative), 0.1);

        let zero = EncodeOptions {
            round_speed_map_easing: Some(0.0),
            ..Default::default()
        };
        assert_eq!(settings.round_speed_map_easing(&zero), 0.0);

        assert_eq!(
            Settings::default().round_speed_map_easing(&EncodeOptions::default()),
            DEFAULT_ROUND_SPEED_MAP_EASING
        );
    }

    #[test]
    fn test_bitrate_table() {
        let unknown = EncodeDefaults::for_bitrate(None);
        assert_eq!((unknown.crf, unknown.auto_target_max_bitrate), (30, 0));

        let low = EncodeDefaults::for_bitrate(Some(2500.0));
        assert_eq!((low.crf, low.auto_target_max_bitrate, low.encode_speed), (20, 4000, 2));

        let high = EncodeDefaults::for_bitrate(Some(30000.0));
        assert_eq!((high.crf, high.auto_target_max_bitrate, high.encode_speed), (35, 33000, 5));
    }

    #[test]
    fn test_settings_json_shape() {
        let raw = r#"{
            "videoID": "abc123",
            "newMarkerSpeed": 0.5,
            "newMarkerCrop": "0:0:iw:ih",
            "cropResWidth": 1280,
            "cropResHeight": 720,
            "markerPairMergeList": "1-2",
            "crf": 24,
            "loop": "fade",
            "somethingElse": [1, 2]
        }"#;
        let settings: Settings = serde_json::from_str(raw).unwrap();
        assert_eq!(settings.video_id.as_deref(), Some("abc123"));
        assert_eq!(settings.new_marker_speed, 0.5);
        assert_eq!(settings.crop_resolution(), CropResolution::new(1280, 720));
        assert_eq!(settings.encode.crf, Some(24));
        assert_eq!(settings.encode.loop_mode, Some(LoopMode::Fade));
        assert!(settings.extra.contains_key("somethingElse"));

        let value = serde_json::to_value(&settings).unwrap();
        assert_eq!(value["crf"], 24);
        assert_eq!(value["somethingElse"], serde_json::json!([1, 2]));
        assert!(value.get("gamma").is_none());
    }

    #[test]
    fn test_for_video_picks_orientation() {
        let vertical = Settings::for_video("xyz", true);
        assert_eq!(vertical.crop_resolution(), CropResolution::PORTRAIT);
        assert_eq!(vertical.title_suffix.as_deref(), Some("[xyz]"));
    }

    #[test]
    fn test_filter_preset_keeps_params() {
        let raw = r#"{"enabled":true,"desc":"Weak","lumaSpatial":2}"#;
        let preset: FilterPreset = serde_json::from_str(raw).unwrap();
        assert!(preset.enabled);
        assert_eq!(preset.params["lumaSpatial"], 2);
    }
}
