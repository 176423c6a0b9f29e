//! Sample a pair's speed at a source time.

use std::path::PathBuf;

use anyhow::Context;
use clipmarks_common::{AppConfig, FrameClock};
use clipmarks_editor::MarkerPairStore;
use clipmarks_timing::{EasingMode, SpeedSampler};

pub fn run(
    path: PathBuf,
    pair_number: usize,
    time: f64,
    easing: Option<String>,
    round: Option<f64>,
    config: &AppConfig,
) -> anyhow::Result<()> {
    let file = super::load_markers(&path)?;
    let store = MarkerPairStore::from_markers_file(&file, config.default_fps)?;
    let pair = store.pair(pair_index(pair_number)?)?;

    let easing: EasingMode = easing
        .as_deref()
        .unwrap_or(config.preview.easing.as_str())
        .parse()
        .context("Invalid easing")?;
    let round_multiple =
        round.unwrap_or_else(|| file.settings.round_speed_map_easing(&pair.overrides));
    let sampler = SpeedSampler::new(easing, round_multiple, config.preview.round_precision);

    if !pair.contains(time) {
        tracing::warn!(
            time,
            start = pair.start(),
            end = pair.end(),
            "Sample time is outside the marker pair"
        );
    }

    let speed = sampler.sample(pair.speed_map(), time);
    let frame = FrameClock::new(store.fps())
        .map(|clock| clock.frame_index(time))
        .unwrap_or_default();
    println!(
        "Pair {pair_number} at {time}s (frame {frame}): speed {speed} ({easing}, round {round_multiple})"
    );

    Ok(())
}

/// 0-based index of a 1-based pair number.
fn pair_index(pair_number: usize) -> anyhow::Result<usize> {
    pair_number
        .checked_sub(1)
        .context("Marker pair numbers start at 1")
}
