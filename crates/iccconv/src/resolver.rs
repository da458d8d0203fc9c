//! Pixel format resolution.
//!
//! Maps a decoded raster (band count, container and its color markers) to
//! the layout handed to the color engine, the preprocessing it needs first,
//! and the default-profile slot used when no profile is embedded.
//!
//! | Bands | Container                      | Format          | Preprocess    | Slot |
//! |-------|--------------------------------|-----------------|---------------|------|
//! | 1     | any                            | `Gray8`         | -             | Gray |
//! | 3     | PNG                            | `Bgr8`          | -             | RGB  |
//! | 3     | JPEG, no APP14 or YCbCr        | `Rgb8`          | YCbCr -> RGB  | RGB  |
//! | 3     | JPEG, APP14 Unknown or YCCK    | `Rgb8`          | -             | RGB  |
//! | 3     | other                          | `Rgb8`          | -             | RGB  |
//! | 4     | PNG                            | `Abgr8`         | -             | RGB  |
//! | 4     | JPEG, APP14 Unknown or none    | `Cmyk8Inverted` | -             | CMYK |
//! | 4     | JPEG, APP14 YCCK               | `Cmyk8`         | YCCK -> CMYK  | CMYK |
//! | 4     | JPEG, APP14 YCbCr              | unsupported     |               |      |
//! | 4     | other                          | `Cmyk8Inverted` | -             | CMYK |
//!
//! Indexed images are rejected before the band count is looked at.

use iccconv_core::{AdobeTransform, ColorSpaceKind, Container, ContainerKind, Error, PixelFormat, Result};
use std::fmt;
use tracing::debug;

/// Which default profile applies to a raster without its own profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileSlot {
    /// Single-channel rasters.
    Gray,
    /// Three-channel (and RGBA) rasters.
    Rgb,
    /// Four-channel ink rasters.
    Cmyk,
}

impl ProfileSlot {
    /// All slots.
    pub const ALL: [ProfileSlot; 3] = [ProfileSlot::Gray, ProfileSlot::Rgb, ProfileSlot::Cmyk];

    /// Colorspace a profile must have to fill this slot.
    pub const fn color_space(self) -> ColorSpaceKind {
        match self {
            ProfileSlot::Gray => ColorSpaceKind::Gray,
            ProfileSlot::Rgb => ColorSpaceKind::Rgb,
            ProfileSlot::Cmyk => ColorSpaceKind::Cmyk,
        }
    }
}

impl fmt::Display for ProfileSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.color_space(), f)
    }
}

/// In-place sample conversion required before the color engine runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preprocess {
    /// Samples are already in the resolved layout.
    None,
    /// JFIF YCbCr to RGB.
    YcbcrToRgb,
    /// Adobe YCCK to CMYK.
    YcckToCmyk {
        /// Input was encoded from Adobe-inverted CMYK.
        inverted: bool,
    },
}

/// Outcome of [`resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// Layout the color engine reads after preprocessing.
    pub format: PixelFormat,
    /// Conversion applied to the raw samples first.
    pub preprocess: Preprocess,
    /// Default profile slot.
    pub slot: ProfileSlot,
}

impl Resolution {
    const fn new(format: PixelFormat, preprocess: Preprocess, slot: ProfileSlot) -> Self {
        Self {
            format,
            preprocess,
            slot,
        }
    }
}

/// Closed classification of the resolver inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RasterClass {
    Indexed,
    Gray,
    PngColor,
    JpegColor(Option<AdobeTransform>),
    OtherColor,
    PngColorAlpha,
    JpegFourBand(Option<AdobeTransform>),
    OtherFourBand,
    Unsupported { bands: u32, container: ContainerKind },
}

impl RasterClass {
    fn classify(bands: u32, container: &Container, indexed: bool) -> Self {
        if indexed {
            return RasterClass::Indexed;
        }
        match (bands, container) {
            (1, _) => RasterClass::Gray,
            (3, Container::Png) => RasterClass::PngColor,
            (3, Container::Jpeg(markers)) => RasterClass::JpegColor(markers.adobe),
            (3, Container::Other) => RasterClass::OtherColor,
            (4, Container::Png) => RasterClass::PngColorAlpha,
            (4, Container::Jpeg(markers)) => RasterClass::JpegFourBand(markers.adobe),
            (4, Container::Other) => RasterClass::OtherFourBand,
            (bands, container) => RasterClass::Unsupported {
                bands,
                container: container.kind(),
            },
        }
    }
}

/// Resolves the engine layout for a decoded raster.
///
/// # Errors
///
/// - [`Error::UnsupportedColorModel`] for indexed rasters
/// - [`Error::UnsupportedRasterFormat`] for band counts other than 1, 3, 4,
///   and for four-band JPEGs flagged as YCbCr
///
/// # Example
///
/// ```rust
/// use iccconv::{resolve, Preprocess, ProfileSlot};
/// use iccconv_core::{Container, JpegMarkers, PixelFormat};
///
/// let jfif = resolve(3, &Container::Jpeg(JpegMarkers::default()), false).unwrap();
/// assert_eq!(jfif.format, PixelFormat::Rgb8);
/// assert_eq!(jfif.preprocess, Preprocess::YcbcrToRgb);
/// assert_eq!(jfif.slot, ProfileSlot::Rgb);
/// ```
pub fn resolve(bands: u32, container: &Container, indexed: bool) -> Result<Resolution> {
    use PixelFormat::*;

    let class = RasterClass::classify(bands, container, indexed);
    let resolution = match class {
        RasterClass::Indexed => {
            return Err(Error::UnsupportedColorModel(format!(
                "indexed color in {} container",
                container.kind()
            )));
        }
        RasterClass::Gray => Resolution::new(Gray8, Preprocess::None, ProfileSlot::Gray),
        RasterClass::PngColor => Resolution::new(Bgr8, Preprocess::None, ProfileSlot::Rgb),
        RasterClass::JpegColor(None | Some(AdobeTransform::YCbCr)) => {
            Resolution::new(Rgb8, Preprocess::YcbcrToRgb, ProfileSlot::Rgb)
        }
        RasterClass::JpegColor(Some(AdobeTransform::Unknown | AdobeTransform::Ycck)) | RasterClass::OtherColor => {
            Resolution::new(Rgb8, Preprocess::None, ProfileSlot::Rgb)
        }
        RasterClass::PngColorAlpha => Resolution::new(Abgr8, Preprocess::None, ProfileSlot::Rgb),
        RasterClass::JpegFourBand(None | Some(AdobeTransform::Unknown)) | RasterClass::OtherFourBand => {
            Resolution::new(Cmyk8Inverted, Preprocess::None, ProfileSlot::Cmyk)
        }
        RasterClass::JpegFourBand(Some(AdobeTransform::Ycck)) => Resolution::new(
            Cmyk8,
            Preprocess::YcckToCmyk { inverted: true },
            ProfileSlot::Cmyk,
        ),
        RasterClass::JpegFourBand(Some(AdobeTransform::YCbCr)) => {
            return Err(Error::unsupported_raster_format(bands, ContainerKind::Jpeg));
        }
        RasterClass::Unsupported { bands, container } => {
            return Err(Error::unsupported_raster_format(bands, container));
        }
    };

    debug!(
        bands,
        container = %container.kind(),
        format = %resolution.format,
        preprocess = ?resolution.preprocess,
        slot = %resolution.slot,
        "Resolved pixel format"
    );
    Ok(resolution)
}
