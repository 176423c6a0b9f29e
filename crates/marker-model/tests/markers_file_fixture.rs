use std::path::PathBuf;

use clipmarks_model::{Crop, LoopMode, MarkersFile, SpeedPoint};

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("fixtures")
        .join("sample-markers.json")
}

#[test]
fn fixture_loads_with_settings_and_pairs() {
    let file = MarkersFile::load(fixture_path()).expect("fixture markers should load");

    assert_eq!(file.version.as_deref(), Some("0.0.84"));
    assert_eq!(file.settings.video_id.as_deref(), Some("dQw4w9WgXcQ"));
    assert_eq!(file.settings.marker_pair_merge_list, "1-2;3,4");
    assert_eq!(file.settings.encode.audio, Some(true));
    assert_eq!(file.marker_pairs.len(), 4);

    let ramp = &file.marker_pairs[2];
    assert!(ramp.is_variable_speed());
    assert_eq!(ramp.crop, Crop::new(100, 50, 960, 540));
    assert_eq!(ramp.overrides.loop_mode, Some(LoopMode::Fwrev));
    assert_eq!(ramp.speed_map().points()[1], SpeedPoint::new(15.0, 2.0));
    assert_eq!(ramp.speed_map_loop.active_range(ramp.start(), ramp.end()), Some((12.0, 14.0)));

    let slow = &file.marker_pairs[3];
    assert!(!slow.is_variable_speed());
    assert_eq!(slow.speed(), 0.5);
    assert_eq!(slow.overrides.enable_speed_maps, Some(false));
    assert_eq!(slow.overrides.crf, Some(18));
}

#[test]
fn fixture_survives_save_and_reload() {
    let mut file = MarkersFile::load(fixture_path()).unwrap();

    let dir = std::env::temp_dir().join("clipmarks_test_markers_roundtrip");
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(file.default_file_name());

    file.save(&path).unwrap();
    assert!(file.modified.is_some());

    let reloaded = MarkersFile::load(&path).unwrap();
    assert_eq!(reloaded.settings, file.settings);
    assert_eq!(reloaded.marker_pairs.len(), file.marker_pairs.len());
    for (a, b) in reloaded.marker_pairs.iter().zip(&file.marker_pairs) {
        assert_eq!(a.speed_map(), b.speed_map());
        assert_eq!(a.crop, b.crop);
        assert_eq!(a.overrides, b.overrides);
    }

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(saved["markerPairs"][3]["number"], 4);
    assert!(saved["markerPairs"][0].get("speedMap").is_none());
    assert!(saved.get("markers").is_none());

    let _ = std::fs::remove_dir_all(&dir);
}
