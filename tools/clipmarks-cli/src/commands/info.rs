//! Show markers file information.

use std::path::PathBuf;

use clipmarks_common::{format_hhmmss_trimmed, AppConfig};
use clipmarks_editor::merge_list;

pub fn run(path: PathBuf, config: &AppConfig) -> anyhow::Result<()> {
    let file = super::load_markers(&path)?;
    let settings = &file.settings;

    println!("Markers: {}", path.display());
    println!("  Version: {}", file.version.as_deref().unwrap_or("-"));
    if let Some(ref modified) = file.modified {
        println!("  Modified: {modified}");
    }
    println!();

    println!("Video:");
    println!("  ID: {}", settings.video_id.as_deref().unwrap_or("-"));
    if let Some(ref title) = settings.video_title {
        println!("  Title: {title}");
    }
    println!("  Vertical: {}", settings.is_vertical_video);
    println!("  Crop resolution: {}", settings.crop_resolution());
    println!();

    println!("Defaults:");
    println!("  New marker speed: {}", settings.new_marker_speed);
    println!("  New marker crop: {}", settings.new_marker_crop);
    println!(
        "  Speed maps: {}",
        if settings.encode.enable_speed_maps.unwrap_or(true) {
            "enabled"
        } else {
            "disabled"
        }
    );
    println!("  Preview easing: {}", config.preview.easing);
    println!();

    println!("Marker pairs ({}):", file.marker_pairs.len());
    for (i, pair) in file.marker_pairs.iter().enumerate() {
        println!(
            "  {:>3}. {} - {}  speed {}{}  crop {}  out {}s",
            i + 1,
            format_hhmmss_trimmed(pair.start()),
            format_hhmmss_trimmed(pair.end()),
            pair.speed(),
            if pair.is_variable_speed() {
                format!(" (map, {} points)", pair.speed_map().len())
            } else {
                String::new()
            },
            pair.crop,
            pair.output_duration
        );
        if !pair.overrides.is_empty() {
            let overrides = serde_json::to_string(&pair.overrides)?;
            println!("       overrides {overrides}");
        }
    }

    if !settings.marker_pair_merge_list.is_empty() {
        println!();
        println!("Merge list: {}", settings.marker_pair_merge_list);
        for (source, numbers) in merge_list::expand(&settings.marker_pair_merge_list) {
            println!("  [{source}] -> {numbers:?}");
        }
    }

    Ok(())
}
