//! Interleaved 8-bit raster buffer.

use crate::{Error, Result};

/// Decoded pixel samples: `width * height` pixels of `bands` bytes each,
/// row-major, no row padding.
///
/// # Example
///
/// ```rust
/// use iccconv_core::RasterBuffer;
///
/// let raster = RasterBuffer::new(2, 1, 3, vec![0, 0, 0, 255, 255, 255]).unwrap();
/// assert_eq!(raster.pixel_count(), 2);
/// assert_eq!(raster.row(0), &[0, 0, 0, 255, 255, 255]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterBuffer {
    width: u32,
    height: u32,
    bands: u32,
    data: Vec<u8>,
}

impl RasterBuffer {
    /// Wraps existing samples.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `bands` is zero or `data.len()` is not
    /// `width * height * bands`.
    pub fn new(width: u32, height: u32, bands: u32, data: Vec<u8>) -> Result<Self> {
        if bands == 0 {
            return Err(Error::invalid_argument("raster must have at least one band"));
        }
        let expected = Self::byte_len(width, height, bands)?;
        if data.len() != expected {
            return Err(Error::invalid_argument(format!(
                "raster {}x{}x{} needs {} bytes, got {}",
                width,
                height,
                bands,
                expected,
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            bands,
            data,
        })
    }

    /// Allocates a zero-filled raster.
    pub fn zeroed(width: u32, height: u32, bands: u32) -> Result<Self> {
        let len = Self::byte_len(width, height, bands)?;
        Self::new(width, height, bands, vec![0; len])
    }

    fn byte_len(width: u32, height: u32, bands: u32) -> Result<usize> {
        (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(bands as usize))
            .ok_or_else(|| {
                Error::invalid_argument(format!("raster {}x{}x{} overflows", width, height, bands))
            })
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per pixel.
    #[inline]
    pub fn bands(&self) -> u32 {
        self.bands
    }

    /// Total pixel count.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Bytes per row.
    #[inline]
    pub fn row_stride(&self) -> usize {
        self.width as usize * self.bands as usize
    }

    /// Samples of row `y`.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row(&self, y: u32) -> &[u8] {
        let stride = self.row_stride();
        let start = y as usize * stride;
        &self.data[start..start + stride]
    }

    /// Iterates over rows.
    pub fn rows(&self) -> std::slice::ChunksExact<'_, u8> {
        self.data.chunks_exact(self.row_stride().max(1))
    }

    /// Iterates mutably over rows.
    pub fn rows_mut(&mut self) -> std::slice::ChunksExactMut<'_, u8> {
        let stride = self.row_stride().max(1);
        self.data.chunks_exact_mut(stride)
    }

    /// All samples.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// All samples, mutable.
    #[inline]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}
