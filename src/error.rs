//! Custom error types for pixelprep.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the pixelprep library.
#[derive(Error, Debug)]
pub enum Error {
    /// An operator was configured with values it cannot work with, or was
    /// handed data that contradicts its configuration.
    #[error("invalid argument for {stage}: {reason}")]
    InvalidArgument { stage: String, reason: String },

    /// The input uses an encoding the operator cannot handle (e.g. alpha channels).
    #[error("unsupported operation in {stage}: {reason}")]
    UnsupportedOperation { stage: String, reason: String },

    /// The pipeline cannot determine its output shape.
    #[error("invalid pipeline state: {reason}")]
    InvalidState { reason: String },

    /// Failed to load an image file.
    #[error("failed to load image from {path}: {source}")]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Failed to decode an in-memory image.
    #[error("failed to decode image: {source}")]
    ImageDecode {
        #[source]
        source: image::ImageError,
    },

    /// Failed to save an image file.
    #[error("failed to save image to {path}: {source}")]
    ImageSave {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Pipeline configuration could not be parsed.
    #[error("invalid pipeline configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn invalid_argument(stage: &str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            stage: stage.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unsupported(stage: &str, reason: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            stage: stage.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for pixelprep operations.
pub type Result<T> = std::result::Result<T, Error>;
