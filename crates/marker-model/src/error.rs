//! Errors raised by the marker model.

use std::path::PathBuf;

use clipmarks_common::ClipmarksError;

use crate::speed_map::MarkerSide;

/// Errors that can occur when building or editing marker data.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Start marker cannot be placed after end marker (start {time:.3}s, end {end:.3}s)")]
    StartAfterEnd { time: f64, end: f64 },

    #[error("End marker cannot be placed before start marker (end {time:.3}s, start {start:.3}s)")]
    EndBeforeStart { time: f64, start: f64 },

    #[error("Invalid speed map: {message}")]
    InvalidSpeedMap { message: String },

    #[error("Invalid speed {speed}: speeds must be positive and finite")]
    InvalidSpeed { speed: f64 },

    #[error("Invalid crop '{input}': {message}")]
    InvalidCrop { input: String, message: String },

    #[error("Invalid crop resolution '{input}'")]
    InvalidCropResolution { input: String },

    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Could not find markers or markerPairs field")]
    MissingMarkerPairs,
}

impl ModelError {
    /// Ordering violation for a boundary move on the given side.
    pub fn ordering(side: MarkerSide, time: f64, start: f64, end: f64) -> Self {
        match side {
            MarkerSide::Start => Self::StartAfterEnd { time, end },
            MarkerSide::End => Self::EndBeforeStart { time, start },
        }
    }

    pub fn invalid_speed_map(msg: impl Into<String>) -> Self {
        Self::InvalidSpeedMap {
            message: msg.into(),
        }
    }

    /// Whether this error is a rejected marker move rather than bad data.
    pub fn is_ordering_violation(&self) -> bool {
        matches!(
            self,
            Self::StartAfterEnd { .. } | Self::EndBeforeStart { .. }
        )
    }
}

impl From<ModelError> for ClipmarksError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::IoError { source, .. } => ClipmarksError::Io(source),
            ModelError::ParseError { source, .. } => ClipmarksError::Json(source),
            other => ClipmarksError::model(other.to_string()),
        }
    }
}
