//! Error types for the transform pipeline.
//!
//! # Overview
//!
//! The [`Error`] enum covers every failure the pipeline reports to callers:
//! - Profile problems (malformed ICC data, wrong colorspace for a slot)
//! - Raster layouts the resolver cannot place
//! - Color engine refusals
//! - Codec failures on either side of the transform
//!
//! Crate-local errors (`IccError` in `iccconv-icc`, `IoError` in `iccconv-io`)
//! are converted into this type at the orchestration boundary.
//!
//! # Usage
//!
//! ```rust
//! use iccconv_core::{Error, Result};
//!
//! fn check_bands(bands: u32) -> Result<()> {
//!     if bands == 0 {
//!         return Err(Error::invalid_argument("raster has no bands"));
//!     }
//!     Ok(())
//! }
//! ```

use crate::{ColorSpaceKind, ContainerKind};
use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while resolving, converting, or coding an image.
///
/// # Categories
///
/// - **Profile errors**: [`InvalidProfileData`](Error::InvalidProfileData),
///   [`UnsupportedDestinationProfile`](Error::UnsupportedDestinationProfile)
/// - **Layout errors**: [`UnsupportedRasterFormat`](Error::UnsupportedRasterFormat),
///   [`UnsupportedColorModel`](Error::UnsupportedColorModel)
/// - **Engine errors**: [`TransformEngine`](Error::TransformEngine)
/// - **Codec errors**: [`Decoding`](Error::Decoding), [`Encoding`](Error::Encoding)
/// - **Caller errors**: [`InvalidArgument`](Error::InvalidArgument), [`Io`](Error::Io)
#[derive(Debug, Error)]
pub enum Error {
    /// ICC bytes or an ICC file could not be parsed into a profile.
    #[error("invalid profile data: {0}")]
    InvalidProfileData(String),

    /// No pixel format exists for this band count and container.
    ///
    /// # Example
    ///
    /// ```rust
    /// use iccconv_core::{ContainerKind, Error};
    ///
    /// let err = Error::unsupported_raster_format(2, ContainerKind::Png);
    /// assert!(err.to_string().contains("2 band"));
    /// ```
    #[error("unsupported raster format: {bands} band(s) in {container} container")]
    UnsupportedRasterFormat {
        /// Band count of the decoded raster
        bands: u32,
        /// Container the raster came from
        container: ContainerKind,
    },

    /// The decoded image uses a color model the pipeline does not handle
    /// (palette images).
    #[error("unsupported color model: {0}")]
    UnsupportedColorModel(String),

    /// The destination profile is neither RGB nor Gray.
    #[error("unsupported destination profile colorspace: {0}")]
    UnsupportedDestinationProfile(ColorSpaceKind),

    /// The color engine refused to build or run a transform.
    #[error("color engine error: {0}")]
    TransformEngine(String),

    /// The codec failed to decode the source image.
    #[error("decoding failed: {0}")]
    Decoding(String),

    /// The codec failed to encode the output image.
    #[error("encoding failed: {0}")]
    Encoding(String),

    /// A caller-supplied value is out of range or inconsistent.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// I/O error outside the codec (profile files, config files).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Creates an [`Error::InvalidProfileData`] error.
    #[inline]
    pub fn invalid_profile(msg: impl Into<String>) -> Self {
        Self::InvalidProfileData(msg.into())
    }

    /// Creates an [`Error::UnsupportedRasterFormat`] error.
    #[inline]
    pub fn unsupported_raster_format(bands: u32, container: ContainerKind) -> Self {
        Self::UnsupportedRasterFormat { bands, container }
    }

    /// Creates an [`Error::InvalidArgument`] error.
    #[inline]
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Creates an [`Error::TransformEngine`] error.
    #[inline]
    pub fn engine(msg: impl Into<String>) -> Self {
        Self::TransformEngine(msg.into())
    }

    /// Returns `true` if the input image or destination cannot be handled
    /// at all, as opposed to failing midway.
    #[inline]
    pub fn is_unsupported(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedRasterFormat { .. }
                | Self::UnsupportedColorModel(_)
                | Self::UnsupportedDestinationProfile(_)
        )
    }

    /// Returns `true` if this is a codec error.
    #[inline]
    pub fn is_codec_error(&self) -> bool {
        matches!(self, Self::Decoding(_) | Self::Encoding(_))
    }

    /// Returns `true` if this is a profile data error.
    #[inline]
    pub fn is_profile_error(&self) -> bool {
        matches!(self, Self::InvalidProfileData(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_raster_format() {
        let err = Error::unsupported_raster_format(5, ContainerKind::Jpeg);
        let msg = err.to_string();
        assert!(msg.contains('5'));
        assert!(msg.contains("JPEG"));
        assert!(err.is_unsupported());
        assert!(!err.is_codec_error());
    }

    #[test]
    fn test_destination_profile() {
        let err = Error::UnsupportedDestinationProfile(ColorSpaceKind::Cmyk);
        assert!(err.to_string().contains("CMYK"));
        assert!(err.is_unsupported());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "profile.icc");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_predicates() {
        assert!(Error::Decoding("truncated".into()).is_codec_error());
        assert!(Error::invalid_profile("bad header").is_profile_error());
        assert!(!Error::invalid_argument("quality").is_profile_error());
    }
}
