//! Clipmarks Marker Model
//!
//! Defines the core data contracts for clip marking:
//! - **Speed maps:** Piecewise speed curves over a marker pair's time span
//! - **Marker pairs:** Start/end marks with crop, speed, and per-pair overrides
//! - **Settings:** Global defaults that per-pair overrides may shadow
//! - **Markers file:** The persisted JSON document tying it all together
//!
//! All times are fractional seconds on the source video's timeline.

pub mod crop;
pub mod error;
pub mod marker_pair;
pub mod markers_file;
pub mod settings;
pub mod speed_map;

pub use crop::*;
pub use error::*;
pub use marker_pair::*;
pub use markers_file::*;
pub use settings::*;
pub use speed_map::*;
