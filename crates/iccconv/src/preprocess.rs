//! In-place YCbCr and YCCK conversion.
//!
//! The JPEG codec hands back samples exactly as stored. Before the color
//! engine sees them, JFIF YCbCr is converted to RGB and Adobe YCCK to CMYK
//! with the full-range JFIF equations:
//!
//! ```text
//! R = Y + 1.402   (Cr - 128)
//! G = Y - 0.34414 (Cb - 128) - 0.71414 (Cr - 128)
//! B = Y + 1.772   (Cb - 128)
//! ```
//!
//! Results are rounded half away from zero and saturated to `0..=255`.
//! Pixels are independent, so work is split across rayon workers.

use crate::Preprocess;
use iccconv_core::{Error, RasterBuffer, Result};
use rayon::prelude::*;
use tracing::{debug, trace};

/// Pixels per rayon work item.
const PIXELS_PER_TASK: usize = 4096;

#[inline]
fn clip(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

#[inline]
fn ycc_to_rgb(y: u8, cb: u8, cr: u8) -> [u8; 3] {
    let y = y as f32;
    let cb = cb as f32 - 128.0;
    let cr = cr as f32 - 128.0;
    [
        clip(y + 1.402 * cr),
        clip(y - 0.34414 * cb - 0.71414 * cr),
        clip(y + 1.772 * cb),
    ]
}

fn check_whole_pixels(buffer: &[u8], bands: usize, what: &str) -> Result<()> {
    if buffer.len() % bands != 0 {
        return Err(Error::invalid_argument(format!(
            "{what} buffer of {} bytes is not a whole number of {bands}-byte pixels",
            buffer.len()
        )));
    }
    Ok(())
}

/// Converts interleaved YCbCr samples to RGB in place.
///
/// # Errors
///
/// [`Error::InvalidArgument`] if `buffer.len()` is not a multiple of 3.
///
/// # Example
///
/// ```rust
/// use iccconv::preprocess::ycbcr_to_rgb;
///
/// let mut px = [255, 128, 128, 0, 128, 128];
/// ycbcr_to_rgb(&mut px).unwrap();
/// assert_eq!(px, [255, 255, 255, 0, 0, 0]);
/// ```
pub fn ycbcr_to_rgb(buffer: &mut [u8]) -> Result<()> {
    trace!(len = buffer.len(), "ycbcr_to_rgb");
    check_whole_pixels(buffer, 3, "YCbCr")?;

    buffer
        .par_chunks_mut(3 * PIXELS_PER_TASK)
        .for_each(|chunk| {
            for px in chunk.chunks_exact_mut(3) {
                let rgb = ycc_to_rgb(px[0], px[1], px[2]);
                px.copy_from_slice(&rgb);
            }
        });
    Ok(())
}

/// Converts interleaved YCCK samples to CMYK in place.
///
/// With `inverted`, the YCC part was encoded from Adobe-inverted ink
/// values: the derived components are the ink values and K is flipped.
/// Otherwise the derived components are complemented and K is kept.
///
/// # Errors
///
/// [`Error::InvalidArgument`] if `buffer.len()` is not a multiple of 4.
pub fn ycck_to_cmyk(buffer: &mut [u8], inverted: bool) -> Result<()> {
    trace!(len = buffer.len(), inverted, "ycck_to_cmyk");
    check_whole_pixels(buffer, 4, "YCCK")?;

    buffer
        .par_chunks_mut(4 * PIXELS_PER_TASK)
        .for_each(|chunk| {
            for px in chunk.chunks_exact_mut(4) {
                let [r, g, b] = ycc_to_rgb(px[0], px[1], px[2]);
                if inverted {
                    px.copy_from_slice(&[r, g, b, 255 - px[3]]);
                } else {
                    px[..3].copy_from_slice(&[255 - r, 255 - g, 255 - b]);
                }
            }
        });
    Ok(())
}

/// Applies the preprocessing picked by the resolver to a raster.
///
/// # Errors
///
/// [`Error::InvalidArgument`] if the raster's band count does not match the
/// conversion.
pub fn apply(preprocess: Preprocess, raster: &mut RasterBuffer) -> Result<()> {
    let expected = match preprocess {
        Preprocess::None => return Ok(()),
        Preprocess::YcbcrToRgb => 3,
        Preprocess::YcckToCmyk { .. } => 4,
    };
    if raster.bands() != expected {
        return Err(Error::invalid_argument(format!(
            "{preprocess:?} needs {expected} bands, raster has {}",
            raster.bands()
        )));
    }

    debug!(?preprocess, pixels = raster.pixel_count(), "Preprocessing raster");
    match preprocess {
        Preprocess::YcbcrToRgb => ycbcr_to_rgb(raster.as_bytes_mut()),
        Preprocess::YcckToCmyk { inverted } => ycck_to_cmyk(raster.as_bytes_mut(), inverted),
        Preprocess::None => Ok(()),
    }
}
