//! Explicit editor session state shared by preview ticks.

use clipmarks_common::AppConfig;
use clipmarks_timing::EasingMode;

/// Transient editing state: what is selected, which previews run, and the
/// last playback rate handed to the player.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorSession {
    /// Index of the pair open in the pair editor.
    pub selected_pair: Option<usize>,
    pub speed_ducking: bool,
    pub marker_looping: bool,
    /// Rate most recently applied by the speed-ducking tick.
    pub prev_rate: f64,
    pub easing: EasingMode,
    /// Decimal places kept when rounding preview speeds.
    pub round_precision: u32,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self {
            selected_pair: None,
            speed_ducking: false,
            marker_looping: false,
            prev_rate: 1.0,
            easing: EasingMode::Linear,
            round_precision: 2,
        }
    }
}

impl EditorSession {
    /// Session seeded from the preview section of the app config.
    pub fn from_config(config: &AppConfig) -> Self {
        let easing = config.preview.easing.parse().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "Unknown preview easing in config, using linear");
            EasingMode::Linear
        });
        Self {
            easing,
            round_precision: config.preview.round_precision,
            ..Self::default()
        }
    }

    /// Flip speed ducking. Returns the new state.
    pub fn toggle_speed_ducking(&mut self) -> bool {
        self.speed_ducking = !self.speed_ducking;
        tracing::info!(enabled = self.speed_ducking, "Auto speed ducking toggled");
        self.speed_ducking
    }

    /// Flip marker looping. Returns the new state.
    pub fn toggle_marker_looping(&mut self) -> bool {
        self.marker_looping = !self.marker_looping;
        tracing::info!(enabled = self.marker_looping, "Auto marker looping toggled");
        self.marker_looping
    }

    pub fn toggle_easing(&mut self) -> EasingMode {
        self.easing = self.easing.toggled();
        self.easing
    }

    pub fn select(&mut self, index: usize) {
        self.selected_pair = Some(index);
    }

    pub fn deselect(&mut self) {
        self.selected_pair = None;
    }

    /// Keep the selection pointing at the same pair after `removed` is deleted.
    pub fn on_pair_removed(&mut self, removed: usize) {
        self.selected_pair = match self.selected_pair {
            Some(selected) if selected == removed => None,
            Some(selected) if selected > removed => Some(selected - 1),
            other => other,
        };
    }

    /// Keep the selection pointing at the same pair after a reorder.
    pub fn on_pair_moved(&mut self, from: usize, to: usize) {
        self.selected_pair = self.selected_pair.map(|selected| {
            if selected == from {
                to
            } else if from < selected && selected <= to {
                selected - 1
            } else if to <= selected && selected < from {
                selected + 1
            } else {
                selected
            }
        });
    }
}
