//! Compute exact output durations.

use std::path::PathBuf;

use anyhow::Context;
use clipmarks_common::{format_hhmmss_trimmed, FrameClock};
use clipmarks_editor::MarkerPairStore;
use clipmarks_model::{LoopMode, ResolvedSettings, Settings};
use clipmarks_timing::{effective_speed_map, OutputDurationEngine, PairTiming};

pub fn run(path: PathBuf, fps: f64, breakdown: bool, write: bool) -> anyhow::Result<()> {
    let mut file = super::load_markers(&path)?;
    let engine = OutputDurationEngine::new(fps)?;
    let clock = FrameClock::new(fps).context("Invalid frame rate")?;
    let store = MarkerPairStore::from_markers_file(&file, fps)?;

    println!("Output durations at {fps}fps:");
    let timings = pair_timings(&store, &file.settings, &engine)?;
    let mut total = 0.0;
    for (i, (pair, timing)) in store.pairs().iter().zip(&timings).enumerate() {
        total += timing.looped_duration;

        let loop_note = match timing.loop_mode {
            LoopMode::None => String::new(),
            LoopMode::Fwrev => format!("  fwrev -> {}s", timing.looped_duration),
            LoopMode::Fade => format!(
                "  fade {}s -> {}s",
                timing.fade_duration.unwrap_or_default(),
                timing.looped_duration
            ),
        };
        println!(
            "  {:>3}. {}s ({} frames, naive {:.3}s){}{}",
            i + 1,
            timing.output_duration,
            clock.frame_count(timing.output_duration),
            pair.naive_output_duration(),
            if timing.is_variable_speed { "  variable" } else { "" },
            loop_note
        );

        if breakdown {
            let map = effective_speed_map(pair, timing.speed_maps_enabled)?;
            let detail = engine.breakdown(&map);
            println!("       start trim {:.6}s", detail.start_trim);
            for seg in &detail.segments {
                if seg.skipped {
                    println!("       seg {}: skipped", seg.index);
                    continue;
                }
                println!(
                    "       seg {}: [{:.6}, {:.6}] speed {} -> {}  +{:.6}s",
                    seg.index, seg.sect_start, seg.sect_end, seg.start_speed, seg.end_speed, seg.output
                );
            }
            println!("       raw {:.6}s", detail.raw_total);
        }
    }
    println!("Total: {}", format_hhmmss_trimmed(total));

    if write {
        store.write_to(&mut file);
        file.save(&path)
            .with_context(|| format!("Failed to save markers file {}", path.display()))?;
        println!("\nUpdated {}", path.display());
    }

    Ok(())
}

/// Timing of every pair as exported, after its settings are resolved.
fn pair_timings(
    store: &MarkerPairStore,
    settings: &Settings,
    engine: &OutputDurationEngine,
) -> anyhow::Result<Vec<PairTiming>> {
    store
        .pairs()
        .iter()
        .map(|pair| -> anyhow::Result<PairTiming> {
            let resolved = ResolvedSettings::resolve(pair, settings, None);
            Ok(PairTiming::compute(pair, &resolved, engine)?)
        })
        .collect()
}
