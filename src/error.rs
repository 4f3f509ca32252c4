//! Error types for papertriage.

use std::path::PathBuf;

/// Errors that can occur while classifying a document.
///
/// Short input is not an error: it is answered directly with
/// [`Label::NotResearch`](crate::Label::NotResearch) and never reaches the
/// model.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The classifier or tokenizer artifact could not be loaded.
    #[error("model unavailable at {}: {reason}", path.display())]
    ModelUnavailable {
        /// The artifact directory that was probed.
        path: PathBuf,
        /// What was missing or malformed.
        reason: String,
    },

    /// A document file could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        /// The file that was read.
        path: PathBuf,
        /// The underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The tokenizer rejected the input.
    #[error("tokenization failed: {0}")]
    Tokenization(String),

    /// The forward pass failed on a loaded model.
    #[error("inference failed: {0}")]
    Inference(String),

    /// Window too small to hold the boundary markers and any content.
    #[error("invalid window size: {window} (must be > 4)")]
    InvalidWindow {
        /// The rejected window size.
        window: usize,
    },

    /// Overlap outside `[2, window - 2)`.
    #[error("overlap {overlap} out of range for window {window} (need 2 <= overlap < window - 2)")]
    InvalidOverlap {
        /// The window size.
        window: usize,
        /// The rejected overlap.
        overlap: usize,
    },

    /// A scorer produced something that is not a five-class distribution.
    #[error("invalid probability vector: {0}")]
    InvalidProbabilities(String),

    /// Configuration could not be read or parsed.
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Shorthand for [`Error::ModelUnavailable`].
    pub fn model_unavailable(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::ModelUnavailable {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error means no model could be loaded.
    #[must_use]
    pub fn is_model_unavailable(&self) -> bool {
        matches!(self, Self::ModelUnavailable { .. })
    }
}

/// Result type for papertriage operations.
pub type Result<T> = std::result::Result<T, Error>;
