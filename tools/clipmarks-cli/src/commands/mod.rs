pub mod durations;
pub mod info;
pub mod merge;
pub mod sample;
pub mod validate;

use std::path::Path;

use anyhow::Context;
use clipmarks_model::MarkersFile;

/// Load a markers file with the path in the error chain.
pub(crate) fn load_markers(path: &Path) -> anyhow::Result<MarkersFile> {
    MarkersFile::load(path)
        .with_context(|| format!("Failed to load markers file {}", path.display()))
}
