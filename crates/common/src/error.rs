//! Error types shared across Clipmarks crates.

use std::path::PathBuf;

/// Top-level error type for Clipmarks operations.
#[derive(Debug, thiserror::Error)]
pub enum ClipmarksError {
    #[error("Marker model error: {message}")]
    Model { message: String },

    #[error("Timing error: {message}")]
    Timing { message: String },

    #[error("Editor error: {message}")]
    Editor { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type alias using ClipmarksError.
pub type ClipmarksResult<T> = Result<T, ClipmarksError>;

impl ClipmarksError {
    pub fn model(msg: impl Into<String>) -> Self {
        Self::Model {
            message: msg.into(),
        }
    }

    pub fn timing(msg: impl Into<String>) -> Self {
        Self::Timing {
            message: msg.into(),
        }
    }

    pub fn editor(msg: impl Into<String>) -> Self {
        Self::Editor {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }
}
