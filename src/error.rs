//! Error taxonomy for the editing engine
//!
//! Every fallible engine operation returns one of these kinds. A failed call
//! never leaves the session's mask partially mutated.

/// Errors reported by segmentation, region detection and mask editing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    /// Zero-sized buffers, unsupported channel counts, out-of-range
    /// parameters or coordinates outside the image.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The segmentation back-end could not produce a mask. This is not the
    /// same as a mask that marks everything as background.
    #[error("segmentation unavailable: {0}")]
    SegmentationUnavailable(String),

    /// A mask was applied against an image of a different size.
    #[error("dimension mismatch: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },
}

impl EditError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        EditError::InvalidInput(message.into())
    }
}

impl From<EditError> for String {
    fn from(error: EditError) -> Self {
        error.to_string()
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EditError>;
