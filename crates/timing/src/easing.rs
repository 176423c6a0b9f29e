//! Easing curves applied to progress through a speed-map segment.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TimingError;

/// How speed changes between two control points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EasingMode {
    /// Straight-line interpolation.
    #[default]
    #[serde(rename = "linear")]
    Linear,
    /// Symmetric cubic ease: slow at both ends, fast through the middle.
    #[serde(rename = "cubicInOut")]
    CubicInOut,
}

impl EasingMode {
    /// The other mode. Used by the preview easing toggle.
    pub fn toggled(self) -> Self {
        match self {
            Self::Linear => Self::CubicInOut,
            Self::CubicInOut => Self::Linear,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::CubicInOut => "cubicInOut",
        }
    }
}

impl fmt::Display for EasingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EasingMode {
    type Err = TimingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "linear" => Ok(Self::Linear),
            "cubicInOut" | "cubic-in-out" | "cubic" => Ok(Self::CubicInOut),
            other => Err(TimingError::UnknownEasing {
                name: other.to_string(),
            }),
        }
    }
}

/// Map progress `t` in `[0, 1]` to eased progress.
pub fn ease(mode: EasingMode, t: f64) -> f64 {
    match mode {
        EasingMode::Linear => t,
        EasingMode::CubicInOut => cubic_in_out(t),
    }
}

fn cubic_in_out(t: f64) -> f64 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        let u = 2.0 * t - 2.0;
        u * u * u / 2.0 + 1.0
    }
}
