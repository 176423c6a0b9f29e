//! Timing errors.

use clipmarks_common::ClipmarksError;

#[derive(Debug, thiserror::Error)]
pub enum TimingError {
    #[error("Invalid frame rate {fps}: fps must be positive and finite")]
    InvalidFps { fps: f64 },

    #[error("Invalid easing mode '{name}' (expected 'linear' or 'cubicInOut')")]
    UnknownEasing { name: String },

    #[error(transparent)]
    Model(#[from] clipmarks_model::ModelError),
}

impl From<TimingError> for ClipmarksError {
    fn from(err: TimingError) -> Self {
        ClipmarksError::timing(err.to_string())
    }
}
