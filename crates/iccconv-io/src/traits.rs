//! Codec trait used by the transform orchestrator.
//!
//! The orchestrator never touches container formats directly: it decodes
//! and encodes through an [`ImageCodec`], so tests and embedders can swap in
//! their own implementation.

use crate::IoResult;
use iccconv_core::{ContainerKind, ImageMetadata, PixelFormat, RasterBuffer};
use std::path::Path;

/// A decoded image: raw samples plus the metadata needed to interpret them.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    /// Raw component samples, no codec color conversion applied.
    pub raster: RasterBuffer,
    /// Container facts captured while decoding.
    pub metadata: ImageMetadata,
}

/// Everything needed to encode one output image.
#[derive(Debug, Clone, Copy)]
pub struct EncodeRequest<'a> {
    /// Samples to write.
    pub raster: &'a RasterBuffer,
    /// Layout of `raster`.
    pub format: PixelFormat,
    /// Output container.
    pub container: ContainerKind,
    /// ICC profile to embed.
    pub icc_profile: Option<&'a [u8]>,
    /// Resolution to record, in dots per inch.
    pub dpi: Option<f64>,
    /// JPEG quality, 1-100. Ignored for PNG.
    pub jpeg_quality: u8,
}

/// Decoder/encoder pair for the containers the pipeline reads and writes.
///
/// # Example
///
/// ```rust,ignore
/// use iccconv_io::{FileCodec, ImageCodec};
///
/// let decoded = FileCodec.decode("photo.jpg".as_ref())?;
/// println!("{} bands", decoded.raster.bands());
/// ```
pub trait ImageCodec {
    /// Decodes an image from memory.
    fn decode_bytes(&self, data: &[u8]) -> IoResult<DecodedImage>;

    /// Encodes an image to memory.
    fn encode_to_memory(&self, request: &EncodeRequest<'_>) -> IoResult<Vec<u8>>;

    /// Decodes an image file.
    fn decode(&self, path: &Path) -> IoResult<DecodedImage> {
        let data = std::fs::read(path)?;
        self.decode_bytes(&data)
    }

    /// Encodes an image file.
    fn encode(&self, request: &EncodeRequest<'_>, path: &Path) -> IoResult<()> {
        let data = self.encode_to_memory(request)?;
        std::fs::write(path, data)?;
        Ok(())
    }
}
