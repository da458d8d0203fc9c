//! Container metadata captured at decode time.
//!
//! [`ImageMetadata`] is a read-only snapshot: the codec fills it once, the
//! resolver and profile policy only read it.

use std::fmt;

/// Adobe APP14 color-transform value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdobeTransform {
    /// 0: components stored as-is (RGB or inverted CMYK).
    Unknown,
    /// 1: three components stored as YCbCr.
    YCbCr,
    /// 2: four components stored as YCCK.
    Ycck,
}

impl AdobeTransform {
    /// Maps the transform byte of an APP14 segment.
    ///
    /// Values outside 0..=2 are treated as [`AdobeTransform::Unknown`].
    pub fn from_byte(value: u8) -> Self {
        match value {
            1 => AdobeTransform::YCbCr,
            2 => AdobeTransform::Ycck,
            _ => AdobeTransform::Unknown,
        }
    }
}

/// EXIF `ColorSpace` hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExifColorSpace {
    /// `ColorSpace = 1`.
    Srgb,
    /// `ColorSpace = 2`, or uncalibrated with interoperability index `R03`.
    AdobeRgb,
    /// `ColorSpace = 0xFFFF` without an Adobe RGB interoperability index.
    Uncalibrated,
    /// Any other value.
    Other(u16),
}

/// JPEG-specific markers relevant to color interpretation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JpegMarkers {
    /// Adobe APP14 transform, `None` when the marker is absent.
    pub adobe: Option<AdobeTransform>,
    /// EXIF colorspace hint, `None` when no EXIF block or no tag.
    pub exif_color_space: Option<ExifColorSpace>,
}

/// Source container, with the markers only that container can carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Container {
    /// JPEG / JFIF.
    Jpeg(JpegMarkers),
    /// PNG.
    Png,
    /// Any other container; rasters are supplied by the caller.
    Other,
}

impl Container {
    /// Container family without markers.
    pub fn kind(&self) -> ContainerKind {
        match self {
            Container::Jpeg(_) => ContainerKind::Jpeg,
            Container::Png => ContainerKind::Png,
            Container::Other => ContainerKind::Other,
        }
    }

    /// JPEG markers, if this is a JPEG.
    pub fn jpeg_markers(&self) -> Option<&JpegMarkers> {
        match self {
            Container::Jpeg(markers) => Some(markers),
            _ => None,
        }
    }
}

/// Container family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    /// JPEG.
    Jpeg,
    /// PNG.
    Png,
    /// Anything else.
    Other,
}

impl ContainerKind {
    /// Output container for a destination path: `png` (any case) selects PNG,
    /// everything else JPEG.
    ///
    /// # Example
    ///
    /// ```rust
    /// use iccconv_core::ContainerKind;
    ///
    /// assert_eq!(ContainerKind::for_output("out.PNG"), ContainerKind::Png);
    /// assert_eq!(ContainerKind::for_output("out.tif"), ContainerKind::Jpeg);
    /// ```
    pub fn for_output<P: AsRef<std::path::Path>>(path: P) -> Self {
        let is_png = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("png"));
        if is_png {
            ContainerKind::Png
        } else {
            ContainerKind::Jpeg
        }
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ContainerKind::Jpeg => "JPEG",
            ContainerKind::Png => "PNG",
            ContainerKind::Other => "other",
        };
        f.write_str(name)
    }
}

/// Facts about a decoded image that drive format and profile resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageMetadata {
    /// Source container and its markers.
    pub container: Container,
    /// Bands per pixel in the decoded raster.
    pub bands: u32,
    /// Whether one of the bands is alpha.
    pub transparent: bool,
    /// Whether the raster holds palette indices.
    pub indexed: bool,
    /// Horizontal resolution in dots per inch, if recorded.
    pub dpi: Option<f64>,
    /// Embedded ICC profile bytes, reassembled.
    pub icc_profile: Option<Vec<u8>>,
}

impl ImageMetadata {
    /// Metadata with no markers, no profile, and no resolution.
    pub fn new(container: Container, bands: u32) -> Self {
        Self {
            container,
            bands,
            transparent: false,
            indexed: false,
            dpi: None,
            icc_profile: None,
        }
    }
}
