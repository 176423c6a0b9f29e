//! Editor errors.

use clipmarks_common::ClipmarksError;
use clipmarks_model::ModelError;
use clipmarks_timing::TimingError;

#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("Marker pair {number} does not exist ({len} pairs)")]
    PairOutOfRange { number: usize, len: usize },

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Timing(#[from] TimingError),
}

impl EditorError {
    /// Error for a 0-based `index` into a store of `len` pairs.
    pub fn out_of_range(index: usize, len: usize) -> Self {
        Self::PairOutOfRange {
            number: index + 1,
            len,
        }
    }

    /// Whether this is a rejected marker move that the host should show to the user.
    pub fn is_ordering_violation(&self) -> bool {
        matches!(self, Self::Model(err) if err.is_ordering_violation())
    }
}

impl From<EditorError> for ClipmarksError {
    fn from(err: EditorError) -> Self {
        match err {
            EditorError::Model(err) => err.into(),
            EditorError::Timing(err) => err.into(),
            other => ClipmarksError::editor(other.to_string()),
        }
    }
}
