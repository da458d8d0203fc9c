//! # iccconv-icc
//!
//! ICC color profiles and 8-bit transform sessions, built on Little CMS 2.
//!
//! # Features
//!
//! - Load profiles from files or embedded ICC bytes
//! - Standard profiles: Gray D50 gamma 2.2, sRGB, Adobe RGB (1998), Coated FOGRA39
//!   (the last two synthesized when their bundled files are absent)
//! - Explicit, idempotent disposal on top of RAII release
//! - Transform sessions over every 8-bit layout in [`PixelFormat`](iccconv_core::PixelFormat)
//!
//! # Example
//!
//! ```rust
//! use iccconv_core::PixelFormat;
//! use iccconv_icc::{ColorProfile, Intent, TransformContext, TransformFlags, TransformSession};
//!
//! let srgb = ColorProfile::srgb();
//! let gray = ColorProfile::gray(2.2).unwrap();
//!
//! let session = TransformSession::new(&TransformContext {
//!     source: &srgb,
//!     source_format: PixelFormat::Rgb8,
//!     destination: &gray,
//!     destination_format: PixelFormat::Gray8,
//!     intent: Intent::RelativeColorimetric,
//!     flags: TransformFlags::default(),
//! })
//! .unwrap();
//!
//! let mut out = [0u8; 2];
//! session.transform(&[255, 255, 255, 0, 0, 0], &mut out, 2).unwrap();
//! assert!(out[0] > 250 && out[1] < 5);
//! ```
//!
//! # Thread Safety
//!
//! Profiles and sessions are not shared between threads. Build one session
//! per worker if parallel conversion is needed.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod cmyk;
mod error;
mod format;
mod profile;
mod standard;
mod transform;

pub use error::{IccError, IccResult};
pub use profile::ColorProfile;
pub use standard::{ProfileResources, StandardProfile};
pub use transform::{TransformContext, TransformSession};

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Rendering intent for color transformations.
///
/// Determines how out-of-gamut colors are handled during conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Intent {
    /// Compresses the whole source gamut into the destination.
    ///
    /// Best for photographic images.
    Perceptual,

    /// Maps in-gamut colors exactly, relative to the media white.
    ///
    /// Out-of-gamut colors are clipped to the nearest in-gamut color.
    #[default]
    RelativeColorimetric,

    /// Maintains saturation at the expense of accuracy.
    Saturation,

    /// Like relative colorimetric but without white point adaptation.
    AbsoluteColorimetric,
}

impl From<Intent> for lcms2::Intent {
    fn from(intent: Intent) -> Self {
        match intent {
            Intent::Perceptual => lcms2::Intent::Perceptual,
            Intent::RelativeColorimetric => lcms2::Intent::RelativeColorimetric,
            Intent::Saturation => lcms2::Intent::Saturation,
            Intent::AbsoluteColorimetric => lcms2::Intent::AbsoluteColorimetric,
        }
    }
}

impl FromStr for Intent {
    type Err = IccError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "perceptual" | "p" => Ok(Intent::Perceptual),
            "relative" | "relative-colorimetric" | "r" => Ok(Intent::RelativeColorimetric),
            "saturation" | "s" => Ok(Intent::Saturation),
            "absolute" | "absolute-colorimetric" | "a" => Ok(Intent::AbsoluteColorimetric),
            _ => Err(IccError::UnknownName {
                kind: "rendering intent",
                name: s.to_string(),
            }),
        }
    }
}

/// Transform behaviour switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformFlags {
    /// Scale the source black point onto the destination black point.
    pub black_point_compensation: bool,
}

impl TransformFlags {
    /// No flags set.
    pub const NONE: Self = Self {
        black_point_compensation: false,
    };

    /// Black-point compensation on.
    pub const BLACK_POINT_COMPENSATION: Self = Self {
        black_point_compensation: true,
    };

    pub(crate) fn to_lcms(self) -> lcms2::Flags {
        let mut flags = lcms2::Flags::default();
        if self.black_point_compensation {
            flags = flags | lcms2::Flags::BLACKPOINT_COMPENSATION;
        }
        flags
    }
}

impl Default for TransformFlags {
    fn default() -> Self {
        Self::BLACK_POINT_COMPENSATION
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_parse() {
        assert_eq!("perceptual".parse::<Intent>().unwrap(), Intent::Perceptual);
        assert_eq!("Relative".parse::<Intent>().unwrap(), Intent::RelativeColorimetric);
        assert_eq!(
            "absolute-colorimetric".parse::<Intent>().unwrap(),
            Intent::AbsoluteColorimetric
        );
        assert!("vivid".parse::<Intent>().is_err());
    }

    #[test]
    fn test_defaults() {
        assert_eq!(Intent::default(), Intent::RelativeColorimetric);
        assert!(TransformFlags::default().black_point_compensation);
        assert!(!TransformFlags::NONE.black_point_compensation);
    }
}
