//! Validate a markers file.

use std::path::PathBuf;

use clipmarks_common::AppConfig;
use clipmarks_editor::{merge_list, MarkerPairStore};
use clipmarks_model::MarkersFile;

pub fn run(path: PathBuf, config: &AppConfig) -> anyhow::Result<()> {
    println!("Validating markers at: {}", path.display());

    let file = super::load_markers(&path)?;
    println!("  Marker pairs: {}", file.marker_pairs.len());

    let issues = collect_issues(&file, config.default_fps)?;
    if issues.is_empty() {
        println!("\nMarkers file is valid.");
    } else {
        println!("\nValidation issues:");
        for issue in &issues {
            println!("  - {issue}");
        }
        println!("\n{} issue(s) found.", issues.len());
    }

    Ok(())
}

/// Problems a loadable file can still have.
fn collect_issues(file: &MarkersFile, fps: f64) -> anyhow::Result<Vec<String>> {
    let mut issues = Vec::new();
    let res = file.settings.crop_resolution();

    for (i, pair) in file.marker_pairs.iter().enumerate() {
        let number = i + 1;
        if let Err(e) = pair.speed_map().validate() {
            issues.push(format!("pair {number}: {e}"));
        }
        if pair.crop.clamped(res) != pair.crop {
            issues.push(format!(
                "pair {number}: crop {} exceeds the {res} crop resolution",
                pair.crop
            ));
        }
        if let (Some(start), Some(end)) = (pair.speed_map_loop.start, pair.speed_map_loop.end) {
            if start >= end || start < pair.start() || end > pair.end() {
                issues.push(format!(
                    "pair {number}: speed map loop {start}-{end} is outside the pair"
                ));
            }
        }
    }

    let store = MarkerPairStore::from_markers_file(file, fps)?;
    for (i, (loaded, computed)) in file.marker_pairs.iter().zip(store.pairs()).enumerate() {
        if (loaded.output_duration - computed.output_duration).abs() > 1e-9 {
            issues.push(format!(
                "pair {}: stored output duration {} differs from {} at {fps}fps",
                i + 1,
                loaded.output_duration,
                computed.output_duration
            ));
        }
    }

    for group in merge_list::parse(&file.settings.marker_pair_merge_list) {
        for entry in &group.entries {
            if entry.highest() > file.marker_pairs.len() {
                issues.push(format!(
                    "merge group [{}] references missing pair {}",
                    group.source,
                    entry.highest()
                ));
            }
        }
    }

    Ok(issues)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARKERS: &str = r#"{
        "videoID": "abc",
        "cropResWidth": 1920,
        "cropResHeight": 1080,
        "markerPairMergeList": "1-3",
        "markerPairs": [
            { "start": 1, "end": 3, "crop": "0:0:iw:ih", "speed": 1, "outputDuration": 2 },
            { "start": 4, "end": 6, "crop": "0:0:4000:ih", "speed": 1, "outputDuration": 1 }
        ]
    }"#;

    #[test]
    fn test_reports_crop_duration_and_merge_issues() {
        let file = MarkersFile::from_json_str(MARKERS).unwrap();
        let issues = collect_issues(&file, 30.0).unwrap();
        assert_eq!(issues.len(), 3, "{issues:?}");
        assert!(issues[0].starts_with("pair 2: crop"));
        assert!(issues[1].contains("stored output duration 1"));
        assert!(issues[2].contains("missing pair 3"));
    }
}
