//! ICC error types.

use iccconv_core::{ColorSpaceKind, Error};
use thiserror::Error;

/// Result type for ICC operations.
pub type IccResult<T> = Result<T, IccError>;

/// Errors that can occur during ICC operations.
#[derive(Debug, Error)]
pub enum IccError {
    /// Failed to load profile from file.
    #[error("failed to load profile: {0}")]
    LoadFailed(String),

    /// Failed to create profile.
    #[error("failed to create profile: {0}")]
    CreateFailed(String),

    /// Failed to create or run a transform.
    #[error("transform failed: {0}")]
    TransformFailed(String),

    /// Invalid profile data.
    #[error("invalid profile data: {0}")]
    InvalidProfile(String),

    /// Profile colorspace does not match what the caller needs.
    #[error("color space mismatch: expected {expected}, got {actual}")]
    ColorSpaceMismatch {
        /// Expected color space.
        expected: ColorSpaceKind,
        /// Actual color space.
        actual: ColorSpaceKind,
    },

    /// A name did not match any known intent or standard profile.
    #[error("unknown {kind} '{name}'")]
    UnknownName {
        /// What was being looked up.
        kind: &'static str,
        /// The name given.
        name: String,
    },

    /// The profile or session was already disposed.
    #[error("{0} used after dispose")]
    Released(&'static str),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<IccError> for Error {
    fn from(err: IccError) -> Self {
        match err {
            IccError::LoadFailed(_)
            | IccError::CreateFailed(_)
            | IccError::InvalidProfile(_) => Error::InvalidProfileData(err.to_string()),
            IccError::TransformFailed(msg) => Error::TransformEngine(msg),
            IccError::ColorSpaceMismatch { .. }
            | IccError::UnknownName { .. }
            | IccError::Released(_) => {
                Error::InvalidArgument(err.to_string())
            }
            IccError::Io(e) => Error::Io(e),
        }
    }
}
