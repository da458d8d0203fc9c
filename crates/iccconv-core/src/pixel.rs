//! Pixel layouts and colorspace families.

use std::fmt;

/// Colorspace family of a profile or pixel layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorSpaceKind {
    /// Single luminance channel.
    Gray,
    /// Additive three-channel RGB.
    Rgb,
    /// Subtractive four-channel CMYK.
    Cmyk,
    /// Anything else (Lab, XYZ, n-color).
    Other,
}

impl fmt::Display for ColorSpaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColorSpaceKind::Gray => "Gray",
            ColorSpaceKind::Rgb => "RGB",
            ColorSpaceKind::Cmyk => "CMYK",
            ColorSpaceKind::Other => "other",
        };
        f.write_str(name)
    }
}

/// Byte layout of one interleaved 8-bit pixel as the color engine sees it.
///
/// Not stored with a [`RasterBuffer`](crate::RasterBuffer): the same bytes
/// can be read as `Rgb8` or `Bgr8` depending on where they came from.
///
/// | Format          | Bytes | Order                  |
/// |-----------------|-------|------------------------|
/// | `Gray8`         | 1     | Y                      |
/// | `Rgb8`          | 3     | R G B                  |
/// | `Bgr8`          | 3     | B G R                  |
/// | `Abgr8`         | 4     | A B G R                |
/// | `Cmyk8`         | 4     | C M Y K (255 = ink)    |
/// | `Cmyk8Inverted` | 4     | C M Y K (0 = ink)      |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// 8-bit grayscale.
    Gray8,
    /// 8-bit RGB.
    Rgb8,
    /// 8-bit RGB stored blue first.
    Bgr8,
    /// 8-bit RGB with a leading alpha byte, stored alpha, blue, green, red.
    Abgr8,
    /// 8-bit CMYK.
    Cmyk8,
    /// 8-bit CMYK with every channel inverted (Adobe convention).
    Cmyk8Inverted,
}

impl PixelFormat {
    /// Bytes per pixel.
    #[inline]
    pub const fn bands(self) -> u32 {
        match self {
            PixelFormat::Gray8 => 1,
            PixelFormat::Rgb8 | PixelFormat::Bgr8 => 3,
            PixelFormat::Abgr8 | PixelFormat::Cmyk8 | PixelFormat::Cmyk8Inverted => 4,
        }
    }

    /// Whether one of the bands is alpha.
    #[inline]
    pub const fn has_alpha(self) -> bool {
        matches!(self, PixelFormat::Abgr8)
    }

    /// Byte offset of the alpha band inside a pixel, if any.
    #[inline]
    pub const fn alpha_offset(self) -> Option<usize> {
        match self {
            PixelFormat::Abgr8 => Some(0),
            _ => None,
        }
    }

    /// Colorspace family carried by the color bands.
    #[inline]
    pub const fn color_space(self) -> ColorSpaceKind {
        match self {
            PixelFormat::Gray8 => ColorSpaceKind::Gray,
            PixelFormat::Rgb8 | PixelFormat::Bgr8 | PixelFormat::Abgr8 => ColorSpaceKind::Rgb,
            PixelFormat::Cmyk8 | PixelFormat::Cmyk8Inverted => ColorSpaceKind::Cmyk,
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PixelFormat::Gray8 => "GRAY_8",
            PixelFormat::Rgb8 => "RGB_8",
            PixelFormat::Bgr8 => "BGR_8",
            PixelFormat::Abgr8 => "ABGR_8",
            PixelFormat::Cmyk8 => "CMYK_8",
            PixelFormat::Cmyk8Inverted => "CMYK_8_REV",
        };
        f.write_str(name)
    }
}
