//! Default [`ImageCodec`] backed by the JPEG and PNG modules.

use crate::jpeg::{JpegReader, JpegWriter};
use crate::{png, DecodedImage, EncodeRequest, Format, ImageCodec, IoError, IoResult};
use iccconv_core::ContainerKind;

/// Decodes by magic bytes, encodes by the requested container.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileCodec;

impl ImageCodec for FileCodec {
    fn decode_bytes(&self, data: &[u8]) -> IoResult<DecodedImage> {
        match Format::from_bytes(data) {
            Format::Jpeg => JpegReader::new().read_from_memory(data),
            Format::Png => png::read_from_memory(data),
            Format::Unknown => Err(IoError::UnsupportedFormat(
                "not a JPEG or PNG stream".into(),
            )),
        }
    }

    fn encode_to_memory(&self, request: &EncodeRequest<'_>) -> IoResult<Vec<u8>> {
        match request.container {
            ContainerKind::Jpeg => JpegWriter::write_request(request),
            ContainerKind::Png => {
                png::write_to_memory(request.raster, request.format, request.icc_profile, request.dpi)
            }
            ContainerKind::Other => Err(IoError::UnsupportedFormat(request.container.to_string())),
        }
    }
}
