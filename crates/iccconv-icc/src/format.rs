//! Mapping of pipeline pixel layouts onto Little CMS pixel types.

use iccconv_core::PixelFormat;

/// Little CMS pixel type for an 8-bit interleaved layout.
pub(crate) fn lcms_format(format: PixelFormat) -> lcms2::PixelFormat {
    match format {
        PixelFormat::Gray8 => lcms2::PixelFormat::GRAY_8,
        PixelFormat::Rgb8 => lcms2::PixelFormat::RGB_8,
        PixelFormat::Bgr8 => lcms2::PixelFormat::BGR_8,
        PixelFormat::Abgr8 => lcms2::PixelFormat::ABGR_8,
        PixelFormat::Cmyk8 => lcms2::PixelFormat::CMYK_8,
        PixelFormat::Cmyk8Inverted => lcms2::PixelFormat::CMYK_8_REV,
    }
}
