//! Crop regions in crop-resolution pixel units.
//!
//! Crops persist as `"x:y:w:h"` strings. Width and height may be the symbolic
//! `iw` / `ih`, meaning "the full input width/height", which survives changes
//! of crop resolution untouched.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Reference resolution that crop coordinates are expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CropResolution {
    pub width: u32,
    pub height: u32,
}

impl CropResolution {
    pub const LANDSCAPE: CropResolution = CropResolution {
        width: 1920,
        height: 1080,
    };

    pub const PORTRAIT: CropResolution = CropResolution {
        width: 1080,
        height: 1920,
    };

    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Total pixel area.
    pub fn area(&self) -> f64 {
        self.width as f64 * self.height as f64
    }
}

impl Default for CropResolution {
    fn default() -> Self {
        Self::LANDSCAPE
    }
}

impl FromStr for CropResolution {
    type Err = ModelError;

    /// Parse `"1920x1080"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ModelError::InvalidCropResolution {
            input: s.to_string(),
        };
        let (w, h) = s.trim().split_once('x').ok_or_else(invalid)?;
        let width: u32 = w.trim().parse().map_err(|_| invalid())?;
        let height: u32 = h.trim().parse().map_err(|_| invalid())?;
        if width == 0 || height == 0 {
            return Err(invalid());
        }
        Ok(Self { width, height })
    }
}

impl fmt::Display for CropResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Width or height of a crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CropExtent {
    /// Explicit size in pixels.
    Px(u32),
    /// The full input width (`iw`) or height (`ih`).
    Full,
}

impl CropExtent {
    fn resolve(self, full: u32) -> u32 {
        match self {
            Self::Px(px) => px,
            Self::Full => full,
        }
    }
}

/// A crop rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Crop {
    pub x: u32,
    pub y: u32,
    pub w: CropExtent,
    pub h: CropExtent,
}

impl Crop {
    /// `0:0:iw:ih`.
    pub const FULL: Crop = Crop {
        x: 0,
        y: 0,
        w: CropExtent::Full,
        h: CropExtent::Full,
    };

    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self {
            x,
            y,
            w: CropExtent::Px(w),
            h: CropExtent::Px(h),
        }
    }

    /// Concrete `[x, y, w, h]` with `iw`/`ih` replaced by the resolution.
    pub fn resolve(&self, res: CropResolution) -> [u32; 4] {
        [
            self.x,
            self.y,
            self.w.resolve(res.width),
            self.h.resolve(res.height),
        ]
    }

    /// Keep the rectangle inside the crop resolution.
    ///
    /// The offset is pulled back first so an explicit size is preserved where
    /// possible; sizes are then trimmed to what is left.
    pub fn clamped(&self, res: CropResolution) -> Self {
        let [_, _, w, h] = self.resolve(res);
        let x = self.x.min(res.width.saturating_sub(w.min(res.width)));
        let y = self.y.min(res.height.saturating_sub(h.min(res.height)));
        let w = match self.w {
            CropExtent::Px(px) => CropExtent::Px(px.min(res.width - x)),
            CropExtent::Full => CropExtent::Full,
        };
        let h = match self.h {
            CropExtent::Px(px) => CropExtent::Px(px.min(res.height - y)),
            CropExtent::Full => CropExtent::Full,
        };
        Self { x, y, w, h }
    }

    /// Scale numeric components, rounding to whole pixels. `iw`/`ih` stay symbolic.
    pub fn rescaled(&self, scale_x: f64, scale_y: f64) -> Self {
        let scale = |v: u32, s: f64| (v as f64 * s).round().max(0.0) as u32;
        Self {
            x: scale(self.x, scale_x),
            y: scale(self.y, scale_y),
            w: match self.w {
                CropExtent::Px(px) => CropExtent::Px(scale(px, scale_x)),
                CropExtent::Full => CropExtent::Full,
            },
            h: match self.h {
                CropExtent::Px(px) => CropExtent::Px(scale(px, scale_y)),
                CropExtent::Full => CropExtent::Full,
            },
        }
    }

    /// Fraction of the full frame covered by the crop, in `[0, 1]`.
    pub fn area_fraction(&self, res: CropResolution) -> f64 {
        let [_, _, w, h] = self.resolve(res);
        if res.area() <= 0.0 {
            return 0.0;
        }
        ((w as f64 * h as f64) / res.area()).clamp(0.0, 1.0)
    }
}

impl Default for Crop {
    fn default() -> Self {
        Self::FULL
    }
}

impl FromStr for Crop {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |message: &str| ModelError::InvalidCrop {
            input: s.to_string(),
            message: message.to_string(),
        };
        let parts: Vec<&str> = s.trim().split(':').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(invalid("expected four ':'-separated components"));
        }

        let number = |part: &str, name: &str| {
            part.parse::<u32>()
                .map_err(|_| invalid(&format!("{name} must be a whole number of pixels")))
        };
        let extent = |part: &str, symbol: &str, name: &str| {
            if part == symbol {
                Ok(CropExtent::Full)
            } else {
                number(part, name).map(CropExtent::Px)
            }
        };

        Ok(Self {
            x: number(parts[0], "x")?,
            y: number(parts[1], "y")?,
            w: extent(parts[2], "iw", "width")?,
            h: extent(parts[3], "ih", "height")?,
        })
    }
}

impl TryFrom<String> for Crop {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Crop> for String {
    fn from(crop: Crop) -> Self {
        crop.to_string()
    }
}

impl fmt::Display for Crop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:", self.x, self.y)?;
        match self.w {
            CropExtent::Px(px) => write!(f, "{px}:")?,
            CropExtent::Full => f.write_str("iw:")?,
        }
        match self.h {
            CropExtent::Px(px) => write!(f, "{px}"),
            CropExtent::Full => f.write_str("ih"),
        }
    }
}
