//! Expand and time a merge list.

use std::path::PathBuf;

use clipmarks_common::format_hhmmss_trimmed;
use clipmarks_editor::merge_list;

pub fn run(path: PathBuf, list: Option<String>) -> anyhow::Result<()> {
    let file = super::load_markers(&path)?;
    let list = list.unwrap_or_else(|| file.settings.marker_pair_merge_list.clone());

    if list.trim().is_empty() {
        println!("No merge list.");
        return Ok(());
    }

    println!("Merge list: {list}");
    for group in merge_list::parse(&list) {
        let numbers = group.numbers();
        if numbers.is_empty() {
            continue;
        }
        let duration = group.naive_duration(&file.marker_pairs);
        println!(
            "  [{}] pairs {numbers:?}  ~{}",
            group.source,
            format_hhmmss_trimmed(duration)
        );
    }

    let durations = merge_list::durations(&list, &file.marker_pairs);
    println!("Durations: {}", merge_list::format_durations(&durations));

    Ok(())
}
