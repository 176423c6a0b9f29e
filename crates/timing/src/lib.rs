//! Clipmarks Timing: the variable-speed engine
//!
//! Turns marker-pair speed maps into playback and export values:
//! - **Easing:** Progress curves between speed points
//! - **Sampling:** Instantaneous preview speed at a source time
//! - **Output duration:** Exact length of the sped-up clip on a frame grid
//! - **Pair timing:** Per-pair summaries including loop modes
//!
//! This crate is pure computation with no I/O and no editor state.
//! All inputs are data; all outputs are data.

pub mod easing;
pub mod error;
pub mod output_duration;
pub mod pair_timing;
pub mod sampler;

pub use easing::{ease, EasingMode};
pub use error::TimingError;
pub use output_duration::{compute_output_duration, DurationBreakdown, OutputDurationEngine, SegmentTiming};
pub use pair_timing::{effective_fade, effective_speed_map, PairTiming};
pub use sampler::{sample, SpeedSampler};
