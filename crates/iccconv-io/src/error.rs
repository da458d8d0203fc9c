//! Error types for codec operations.

use std::io;
use thiserror::Error;

/// Codec error.
#[derive(Debug, Error)]
pub enum IoError {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Unsupported container format.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Decoding error.
    #[error("decode error: {0}")]
    DecodeError(String),

    /// Encoding error.
    #[error("encode error: {0}")]
    EncodeError(String),

    /// Unsupported bit depth.
    #[error("unsupported bit depth: {0}")]
    UnsupportedBitDepth(String),

    /// The pixel layout cannot be stored in the requested container.
    #[error("{format} pixels cannot be written as {container}")]
    UnsupportedLayout {
        /// Pixel layout name.
        format: String,
        /// Container name.
        container: String,
    },
}

/// Result type for codec operations.
pub type IoResult<T> = Result<T, IoError>;
