//! PNG format support.
//!
//! Samples are normalized to 8 bits and handed out in reversed channel
//! order (`BGR`, `ABGR`), matching the layouts the transform pipeline
//! declares for PNG sources. The writer accepts the same layouts and
//! restores PNG's RGB(A) order.
//!
//! # Example
//!
//! ```rust,ignore
//! use iccconv_io::png;
//!
//! let decoded = png::read("input.png")?;
//! assert!(decoded.metadata.transparent == (decoded.raster.bands() == 4));
//! ```

use crate::{DecodedImage, IoError, IoResult};
use iccconv_core::{Container, ImageMetadata, PixelFormat, RasterBuffer};
use std::borrow::Cow;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, trace};

const METERS_PER_INCH: f64 = 0.0254;

/// Reads a PNG file from the given path.
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<DecodedImage> {
    let data = std::fs::read(path.as_ref())?;
    read_from_memory(&data)
}

/// Reads a PNG from a byte slice.
///
/// Palette images are expanded to RGB(A) and flagged `indexed`; 16-bit
/// samples are stripped to 8 bits; `tRNS` transparency becomes an alpha band.
pub fn read_from_memory(data: &[u8]) -> IoResult<DecodedImage> {
    trace!(len = data.len(), "png::read_from_memory");

    let mut decoder = png::Decoder::new(Cursor::new(data));
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder
        .read_info()
        .map_err(|e: png::DecodingError| IoError::DecodeError(e.to_string()))?;

    let (indexed, icc_profile, dpi) = {
        let info = reader.info();
        let dpi = info
            .pixel_dims
            .as_ref()
            .filter(|d| d.unit == png::Unit::Meter && d.xppu > 0)
            .map(|d| d.xppu as f64 * METERS_PER_INCH);
        (
            info.color_type == png::ColorType::Indexed,
            info.icc_profile.as_ref().map(|p| p.to_vec()),
            dpi,
        )
    };

    let buf_size = reader
        .output_buffer_size()
        .ok_or_else(|| IoError::DecodeError("cannot determine output buffer size".into()))?;
    let mut buf = vec![0u8; buf_size];
    let frame = reader
        .next_frame(&mut buf)
        .map_err(|e: png::DecodingError| IoError::DecodeError(e.to_string()))?;
    buf.truncate(frame.buffer_size());

    if frame.bit_depth != png::BitDepth::Eight {
        return Err(IoError::UnsupportedBitDepth(format!("{:?}", frame.bit_depth)));
    }

    let (bands, transparent) = match frame.color_type {
        png::ColorType::Grayscale => (1, false),
        png::ColorType::GrayscaleAlpha => (2, true),
        png::ColorType::Rgb => {
            for px in buf.chunks_exact_mut(3) {
                px.swap(0, 2);
            }
            (3, false)
        }
        png::ColorType::Rgba => {
            for px in buf.chunks_exact_mut(4) {
                px.reverse();
            }
            (4, true)
        }
        png::ColorType::Indexed => {
            return Err(IoError::DecodeError("palette was not expanded".into()));
        }
    };

    let raster = RasterBuffer::new(frame.width, frame.height, bands, buf)
        .map_err(|e| IoError::DecodeError(e.to_string()))?;

    debug!(
        width = frame.width,
        height = frame.height,
        bands,
        transparent,
        indexed,
        icc = icc_profile.as_ref().map(|p| p.len()),
        "Decoded PNG"
    );

    let mut metadata = ImageMetadata::new(Container::Png, bands);
    metadata.transparent = transparent;
    metadata.indexed = indexed;
    metadata.dpi = dpi;
    metadata.icc_profile = icc_profile;

    Ok(DecodedImage { raster, metadata })
}

/// Encodes `raster` (laid out as `format`) to PNG bytes.
///
/// Accepts `Gray8`, `Rgb8`, `Bgr8` and `Abgr8`.
pub fn write_to_memory(
    raster: &RasterBuffer,
    format: PixelFormat,
    icc_profile: Option<&[u8]>,
    dpi: Option<f64>,
) -> IoResult<Vec<u8>> {
    trace!(format = %format, "png::write_to_memory");

    let (color_type, data): (png::ColorType, Cow<'_, [u8]>) = match format {
        PixelFormat::Gray8 => (png::ColorType::Grayscale, Cow::Borrowed(raster.as_bytes())),
        PixelFormat::Rgb8 => (png::ColorType::Rgb, Cow::Borrowed(raster.as_bytes())),
        PixelFormat::Bgr8 => {
            let mut rgb = raster.as_bytes().to_vec();
            for px in rgb.chunks_exact_mut(3) {
                px.swap(0, 2);
            }
            (png::ColorType::Rgb, Cow::Owned(rgb))
        }
        PixelFormat::Abgr8 => {
            let mut rgba = raster.as_bytes().to_vec();
            for px in rgba.chunks_exact_mut(4) {
                px.reverse();
            }
            (png::ColorType::Rgba, Cow::Owned(rgba))
        }
        PixelFormat::Cmyk8 | PixelFormat::Cmyk8Inverted => {
            return Err(IoError::UnsupportedLayout {
                format: format.to_string(),
                container: "PNG".into(),
            });
        }
    };

    let mut info = png::Info::with_size(raster.width(), raster.height());
    info.color_type = color_type;
    info.bit_depth = png::BitDepth::Eight;
    info.icc_profile = icc_profile.map(Cow::Borrowed);
    info.pixel_dims = dpi.filter(|d| *d > 0.0).map(|d| {
        let ppm = (d / METERS_PER_INCH).round() as u32;
        png::PixelDimensions {
            xppu: ppm,
            yppu: ppm,
            unit: png::Unit::Meter,
        }
    });

    let mut buffer = Vec::new();
    {
        let encoder = png::Encoder::with_info(&mut buffer, info)
            .map_err(|e| IoError::EncodeError(e.to_string()))?;
        let mut writer = encoder
            .write_header()
            .map_err(|e| IoError::EncodeError(e.to_string()))?;
        writer
            .write_image_data(&data)
            .map_err(|e| IoError::EncodeError(e.to_string()))?;
        writer
            .finish()
            .map_err(|e| IoError::EncodeError(e.to_string()))?;
    }

    Ok(buffer)
}
