//! The persisted markers document.
//!
//! Global settings sit flattened at the top level next to `version` and the
//! `markerPairs` array. Older documents used `markers` for the array; both are
//! accepted on input and `markerPairs` wins when both are present.

use std::path::Path;

use serde::{Deserialize, Serialize, Serializer};

use crate::error::ModelError;
use crate::marker_pair::MarkerPair;
use crate::settings::Settings;

/// Version string written into saved documents.
pub const FORMAT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Settings plus every marker pair of one editing session.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawMarkersFile")]
pub struct MarkersFile {
    pub version: Option<String>,
    /// RFC 3339 time of the last save.
    pub modified: Option<String>,
    pub settings: Settings,
    pub marker_pairs: Vec<MarkerPair>,
}

impl MarkersFile {
    pub fn new(settings: Settings) -> Self {
        Self {
            version: None,
            modified: None,
            settings,
            marker_pairs: Vec::new(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load a markers document from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| ModelError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let file = Self::from_json_str(&json).map_err(|e| ModelError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        tracing::info!(
            path = %path.display(),
            pairs = file.marker_pairs.len(),
            "Loaded markers"
        );
        Ok(file)
    }

    /// Write the document to disk, stamping the format version and save time.
    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<(), ModelError> {
        let path = path.as_ref();
        self.version = Some(FORMAT_VERSION.to_string());
        self.modified = Some(clipmarks_common::timestamp_now());

        let json = self.to_json_string().map_err(|e| ModelError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        std::fs::write(path, json).map_err(|e| ModelError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;

        tracing::info!(
            path = %path.display(),
            pairs = self.marker_pairs.len(),
            "Saved markers"
        );
        Ok(())
    }

    /// Default file name for this session: `<titleSuffix>.json`.
    pub fn default_file_name(&self) -> String {
        let stem = self
            .settings
            .title_suffix
            .as_deref()
            .or(self.settings.video_id.as_deref())
            .unwrap_or("markers");
        format!("{stem}.json")
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMarkersFile {
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    modified: Option<String>,
    #[serde(default)]
    marker_pairs: Option<Vec<MarkerPair>>,
    #[serde(default)]
    markers: Option<Vec<MarkerPair>>,
    #[serde(flatten)]
    settings: Settings,
}

impl TryFrom<RawMarkersFile> for MarkersFile {
    type Error = ModelError;

    fn try_from(raw: RawMarkersFile) -> Result<Self, Self::Error> {
        let marker_pairs = raw
            .marker_pairs
            .or(raw.markers)
            .ok_or(ModelError::MissingMarkerPairs)?;
        Ok(Self {
            version: raw.version,
            modified: raw.modified,
            settings: raw.settings,
            marker_pairs,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MarkersFileOut<'a> {
    #[serde(flatten)]
    settings: &'a Settings,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    modified: Option<&'a str>,
    marker_pairs: Vec<NumberedPair<'a>>,
}

/// A pair tagged with its 1-based position.
#[derive(Serialize)]
struct NumberedPair<'a> {
    number: usize,
    #[serde(flatten)]
    pair: &'a MarkerPair,
}

impl Serialize for MarkersFile {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        MarkersFileOut {
            settings: &self.settings,
            version: self.version.as_deref(),
            modified: self.modified.as_deref(),
            marker_pairs: self
                .marker_pairs
                .iter()
                .enumerate()
                .map(|(i, pair)| NumberedPair {
                    number: i + 1,
                    pair,
                })
                .collect(),
        }
        .serialize(serializer)
    }
}
