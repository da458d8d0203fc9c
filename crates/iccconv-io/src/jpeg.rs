//! JPEG format support.
//!
//! Reads JPEG files as raw component samples and writes color-managed
//! JPEG output.
//!
//! # Overview
//!
//! Color interpretation of a JPEG depends on markers the decoder would
//! normally consume silently, so this reader:
//! - Bypasses the decoder's own color conversion: three-component files come
//!   back interleaved as stored (usually YCbCr), four-component files as
//!   stored (CMYK or YCCK)
//! - Parses the Adobe APP14 transform byte, the EXIF `ColorSpace` tag, the
//!   JFIF density and the (possibly multi-chunk) APP2 ICC profile
//!
//! The writer embeds an ICC profile and JFIF density.
//!
//! # Example
//!
//! ```rust,ignore
//! use iccconv_io::jpeg::JpegReader;
//!
//! let decoded = JpegReader::new().read("photo.jpg")?;
//! if let Some(markers) = decoded.metadata.container.jpeg_markers() {
//!     println!("Adobe APP14: {:?}", markers.adobe);
//! }
//! ```

use crate::exif;
use crate::{DecodedImage, EncodeRequest, IoError, IoResult};
use iccconv_core::{AdobeTransform, Container, ImageMetadata, JpegMarkers, PixelFormat, RasterBuffer};
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, trace};

// ============================================================================
// Writer Options
// ============================================================================

/// Options for writing JPEG files.
#[derive(Debug, Clone)]
pub struct JpegWriterOptions {
    /// Quality level 1-100. Default: 100.
    pub quality: u8,
}

impl Default for JpegWriterOptions {
    fn default() -> Self {
        Self { quality: 100 }
    }
}

// ============================================================================
// Segment Metadata
// ============================================================================

/// Color-relevant facts collected from JPEG marker segments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JpegSegments {
    /// Adobe APP14 and EXIF colorspace markers.
    pub markers: JpegMarkers,
    /// Reassembled APP2 ICC profile.
    pub icc_profile: Option<Vec<u8>>,
    /// JFIF density converted to dots per inch.
    pub dpi: Option<f64>,
}

// ============================================================================
// JpegReader
// ============================================================================

/// JPEG file reader.
///
/// Returns raw component samples: grayscale, YCbCr or RGB for three
/// components, CMYK or YCCK for four. Which one is decided later from
/// [`JpegMarkers`].
#[derive(Debug, Clone, Default)]
pub struct JpegReader;

impl JpegReader {
    /// Creates a new reader.
    pub fn new() -> Self {
        Self
    }

    /// Reads a JPEG file from disk.
    pub fn read<P: AsRef<Path>>(&self, path: P) -> IoResult<DecodedImage> {
        let data = std::fs::read(path.as_ref())?;
        self.read_from_memory(&data)
    }

    /// Reads a JPEG from a byte slice.
    pub fn read_from_memory(&self, data: &[u8]) -> IoResult<DecodedImage> {
        trace!(len = data.len(), "JpegReader::read_from_memory");

        let mut decoder = jpeg_decoder::Decoder::new(Cursor::new(data));
        decoder
            .read_info()
            .map_err(|e| IoError::DecodeError(e.to_string()))?;
        let info = decoder
            .info()
            .ok_or_else(|| IoError::DecodeError("missing JPEG info".into()))?;

        // `ColorTransform::None` emits each row component by component, so
        // ask for transforms that only interleave: RGB copies as stored,
        // CMYK inverts every sample and is undone below.
        let bands = match info.pixel_format {
            jpeg_decoder::PixelFormat::L8 => 1,
            jpeg_decoder::PixelFormat::RGB24 => {
                decoder.set_color_transform(jpeg_decoder::ColorTransform::RGB);
                3
            }
            jpeg_decoder::PixelFormat::CMYK32 => {
                decoder.set_color_transform(jpeg_decoder::ColorTransform::CMYK);
                4
            }
            jpeg_decoder::PixelFormat::L16 => {
                return Err(IoError::UnsupportedBitDepth("16-bit JPEG".into()));
            }
        };

        let mut pixels = decoder
            .decode()
            .map_err(|e| IoError::DecodeError(e.to_string()))?;
        if bands == 4 {
            pixels.iter_mut().for_each(|v| *v = 255 - *v);
        }

        let width = info.width as u32;
        let height = info.height as u32;
        let raster = RasterBuffer::new(width, height, bands, pixels)
            .map_err(|e| IoError::DecodeError(e.to_string()))?;

        let segments = parse_segments(data);
        debug!(
            width,
            height,
            bands,
            adobe = ?segments.markers.adobe,
            exif = ?segments.markers.exif_color_space,
            icc = segments.icc_profile.as_ref().map(|p| p.len()),
            "Decoded JPEG"
        );

        let mut metadata = ImageMetadata::new(Container::Jpeg(segments.markers), bands);
        metadata.dpi = segments.dpi;
        metadata.icc_profile = segments.icc_profile;

        Ok(DecodedImage { raster, metadata })
    }
}

/// Parses JPEG segments up to the first scan.
pub fn parse_segments(data: &[u8]) -> JpegSegments {
    let mut segments = JpegSegments::default();
    if data.len() < 2 || data[0] != 0xFF || data[1] != 0xD8 {
        return segments;
    }

    let mut icc_chunks: Vec<(u8, Vec<u8>)> = Vec::new();
    let mut pos = 2usize;

    while pos + 1 < data.len() {
        if data[pos] != 0xFF {
            pos += 1;
            continue;
        }
        while pos < data.len() && data[pos] == 0xFF {
            pos += 1;
        }
        if pos >= data.len() {
            break;
        }

        let marker = data[pos];
        pos += 1;

        // End markers
        if marker == 0xD9 || marker == 0xDA {
            break;
        }

        // Standalone markers
        if (0xD0..=0xD7).contains(&marker) || marker == 0x01 {
            continue;
        }

        if pos + 2 > data.len() {
            break;
        }
        let seg_len = u16::from_be_bytes([data[pos], data[pos + 1]]) as usize;
        pos += 2;
        if seg_len < 2 || pos + seg_len - 2 > data.len() {
            break;
        }
        let segment = &data[pos..pos + seg_len - 2];

        match marker {
            0xE0 => {
                if let Some(dpi) = parse_jfif_dpi(segment) {
                    segments.dpi = Some(dpi);
                }
            }
            0xE1 => {
                if segment.starts_with(b"Exif\0\0") && segments.markers.exif_color_space.is_none() {
                    segments.markers.exif_color_space = exif::color_space(&segment[6..]);
                }
            }
            0xE2 => {
                if segment.starts_with(b"ICC_PROFILE\0") && segment.len() > 14 {
                    icc_chunks.push((segment[12], segment[14..].to_vec()));
                }
            }
            0xEE => {
                if segment.starts_with(b"Adobe") && segment.len() >= 12 {
                    segments.markers.adobe = Some(AdobeTransform::from_byte(segment[11]));
                }
            }
            _ => {}
        }
        pos += seg_len - 2;
    }

    if !icc_chunks.is_empty() {
        icc_chunks.sort_by_key(|(num, _)| *num);
        let profile: Vec<u8> = icc_chunks.into_iter().flat_map(|(_, chunk)| chunk).collect();
        segments.icc_profile = Some(profile);
    }

    segments
}

/// JFIF APP0 density in dots per inch. Aspect-ratio-only density is ignored.
fn parse_jfif_dpi(data: &[u8]) -> Option<f64> {
    if !data.starts_with(b"JFIF\0") || data.len() < 12 {
        return None;
    }
    let units = data[7];
    let x_density = u16::from_be_bytes([data[8], data[9]]);
    if x_density == 0 {
        return None;
    }
    match units {
        1 => Some(x_density as f64),
        2 => Some(x_density as f64 * 2.54),
        _ => None,
    }
}

// ============================================================================
// JpegWriter
// ============================================================================

/// JPEG file writer.
///
/// Accepts `Gray8`, `Rgb8`, `Bgr8` and `Abgr8` rasters. Alpha is dropped
/// since JPEG cannot store it.
#[derive(Debug, Clone, Default)]
pub struct JpegWriter {
    options: JpegWriterOptions,
}

impl JpegWriter {
    /// Creates a new writer with default options (quality 100).
    pub fn new() -> Self {
        Self::with_options(JpegWriterOptions::default())
    }

    /// Creates writer with custom options.
    pub fn with_options(options: JpegWriterOptions) -> Self {
        Self { options }
    }

    /// Encodes `raster` (laid out as `format`) to a byte vector.
    pub fn write_to_memory(
        &self,
        raster: &RasterBuffer,
        format: PixelFormat,
        icc_profile: Option<&[u8]>,
        dpi: Option<f64>,
    ) -> IoResult<Vec<u8>> {
        use jpeg_encoder::{ColorType as JpegColorType, Density, Encoder};

        trace!(format = %format, quality = self.options.quality, "JpegWriter::write_to_memory");

        let (width, height) = (raster.width(), raster.height());
        if width > u16::MAX as u32 || height > u16::MAX as u32 {
            return Err(IoError::EncodeError(format!(
                "{}x{} exceeds JPEG limits",
                width, height
            )));
        }

        let stripped;
        let (color_type, pixel_data): (JpegColorType, &[u8]) = match format {
            PixelFormat::Gray8 => (JpegColorType::Luma, raster.as_bytes()),
            PixelFormat::Rgb8 => (JpegColorType::Rgb, raster.as_bytes()),
            PixelFormat::Bgr8 => (JpegColorType::Bgr, raster.as_bytes()),
            PixelFormat::Abgr8 => {
                stripped = raster
                    .as_bytes()
                    .chunks_exact(4)
                    .flat_map(|abgr| [abgr[1], abgr[2], abgr[3]])
                    .collect::<Vec<u8>>();
                (JpegColorType::Bgr, stripped.as_slice())
            }
            PixelFormat::Cmyk8 | PixelFormat::Cmyk8Inverted => {
                return Err(IoError::UnsupportedLayout {
                    format: format.to_string(),
                    container: "JPEG".into(),
                });
            }
        };

        let mut buffer = Vec::new();
        let mut encoder = Encoder::new(&mut buffer, self.options.quality.clamp(1, 100));
        if let Some(dpi) = dpi {
            let density = dpi.round().clamp(1.0, u16::MAX as f64) as u16;
            encoder.set_density(Density::Inch {
                x: density,
                y: density,
            });
        }
        if let Some(icc) = icc_profile {
            encoder
                .add_icc_profile(icc)
                .map_err(|e| IoError::EncodeError(e.to_string()))?;
        }
        encoder
            .encode(pixel_data, width as u16, height as u16, color_type)
            .map_err(|e: jpeg_encoder::EncodingError| IoError::EncodeError(e.to_string()))?;

        Ok(buffer)
    }

    /// Encodes an [`EncodeRequest`], using its quality.
    pub fn write_request(request: &EncodeRequest<'_>) -> IoResult<Vec<u8>> {
        Self::with_options(JpegWriterOptions {
            quality: request.jpeg_quality,
        })
        .write_to_memory(request.raster, request.format, request.icc_profile, request.dpi)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use iccconv_core::ExifColorSpace;

    fn gradient(width: u32, height: u32) -> RasterBuffer {
        let mut data = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                data.push((x * 8) as u8);
                data.push((y * 8) as u8);
                data.push(128);
            }
        }
        RasterBuffer::new(width, height, 3, data).unwrap()
    }

    /// Inserts a marker segment right after SOI.
    fn insert_segment(jpeg: &[u8], marker: u8, payload: &[u8]) -> Vec<u8> {
        let mut out = jpeg[..2].to_vec();
        out.push(0xFF);
        out.push(marker);
        out.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
        out.extend_from_slice(payload);
        out.extend_from_slice(&jpeg[2..]);
        out
    }

    #[test]
    fn test_roundtrip_keeps_ycbcr() {
        let raster = RasterBuffer::new(16, 16, 3, [0u8, 0, 255].repeat(256)).unwrap();
        let bytes = JpegWriter::new()
            .write_to_memory(&raster, PixelFormat::Bgr8, None, None)
            .expect("Write failed");

        let decoded = JpegReader::new().read_from_memory(&bytes).expect("Read failed");
        assert_eq!(decoded.raster.width(), 16);
        assert_eq!(decoded.raster.bands(), 3);
        assert_eq!(decoded.metadata.container, Container::Jpeg(JpegMarkers::default()));

        // Pure red stays in YCbCr: Cr well above 128, Cb below.
        let px = &decoded.raster.as_bytes()[..3];
        assert!(px[2] > 200, "Cr {}", px[2]);
        assert!(px[1] < 128, "Cb {}", px[1]);
    }

    #[test]
    fn test_icc_and_density_roundtrip() {
        let icc: Vec<u8> = (0..=255u8).cycle().take(70_000).collect();
        let bytes = JpegWriter::new()
            .write_to_memory(&gradient(8, 8), PixelFormat::Rgb8, Some(&icc), Some(300.0))
            .expect("Write failed");

        let segments = parse_segments(&bytes);
        assert_eq!(segments.icc_profile.as_deref(), Some(icc.as_slice()));
        assert_eq!(segments.dpi, Some(300.0));

        let decoded = JpegReader::new().read_from_memory(&bytes).unwrap();
        assert_eq!(decoded.metadata.icc_profile.map(|p| p.len()), Some(70_000));
        assert_eq!(decoded.metadata.dpi, Some(300.0));
    }

    #[test]
    fn test_adobe_marker() {
        let bytes = JpegWriter::new()
            .write_to_memory(&gradient(8, 8), PixelFormat::Rgb8, None, None)
            .unwrap();
        let mut adobe = b"Adobe".to_vec();
        adobe.extend_from_slice(&[0, 100, 0, 0, 0, 0, 2]);
        let patched = insert_segment(&bytes, 0xEE, &adobe);

        let segments = parse_segments(&patched);
        assert_eq!(segments.markers.adobe, Some(AdobeTransform::Ycck));
    }

    #[test]
    fn test_exif_color_space() {
        let bytes = JpegWriter::new()
            .write_to_memory(&gradient(8, 8), PixelFormat::Rgb8, None, None)
            .unwrap();
        let mut app1 = b"Exif\0\0".to_vec();
        app1.extend_from_slice(&crate::exif::tests::build_tiff(true, 2, None));
        let patched = insert_segment(&bytes, 0xE1, &app1);

        let decoded = JpegReader::new().read_from_memory(&patched).unwrap();
        let markers = decoded.metadata.container.jpeg_markers().unwrap();
        assert_eq!(markers.exif_color_space, Some(ExifColorSpace::AdobeRgb));
        assert_eq!(markers.adobe, None);
    }

    #[test]
    fn test_gray_and_alpha_layouts() {
        let gray = RasterBuffer::new(4, 4, 1, vec![77; 16]).unwrap();
        let bytes = JpegWriter::new()
            .write_to_memory(&gray, PixelFormat::Gray8, None, None)
            .unwrap();
        let decoded = JpegReader::new().read_from_memory(&bytes).unwrap();
        assert_eq!(decoded.raster.bands(), 1);
        assert!((decoded.raster.as_bytes()[0] as i16 - 77).abs() <= 2);

        let abgr = RasterBuffer::new(4, 4, 4, [255u8, 10, 20, 30].repeat(16)).unwrap();
        let bytes = JpegWriter::new()
            .write_to_memory(&abgr, PixelFormat::Abgr8, None, None)
            .unwrap();
        assert_eq!(JpegReader::new().read_from_memory(&bytes).unwrap().raster.bands(), 3);
    }

    fn assert_every_pixel(raster: &RasterBuffer, expected: &[u8], tolerance: i32) {
        for px in raster.as_bytes().chunks_exact(expected.len()) {
            for (got, want) in px.iter().zip(expected) {
                assert!((*got as i32 - *want as i32).abs() <= tolerance, "{px:?} vs {expected:?}");
            }
        }
    }

    fn four_band(pixel: [u8; 4], color: jpeg_encoder::ColorType, quality: u8) -> DecodedImage {
        let mut bytes = Vec::new();
        jpeg_encoder::Encoder::new(&mut bytes, quality)
            .encode(&pixel.repeat(16 * 16), 16, 16, color)
            .unwrap();
        JpegReader::new().read_from_memory(&bytes).unwrap()
    }

    #[test]
    fn test_three_band_samples_interleaved() {
        // 75 subsamples chroma, 100 does not.
        for quality in [100, 75] {
            let raster = RasterBuffer::new(16, 16, 3, [0u8, 0, 255].repeat(256)).unwrap();
            let bytes = JpegWriter::with_options(JpegWriterOptions { quality })
                .write_to_memory(&raster, PixelFormat::Bgr8, None, None)
                .unwrap();
            let decoded = JpegReader::new().read_from_memory(&bytes).unwrap();
            // Pure red in full-range YCbCr.
            assert_every_pixel(&decoded.raster, &[76, 85, 255], 4);
        }
    }

    #[test]
    fn test_cmyk_samples_as_stored() {
        for quality in [95, 75] {
            // The encoder stores 255 - x per channel.
            let decoded = four_band([0, 64, 128, 255], jpeg_encoder::ColorType::Cmyk, quality);
            assert_eq!(decoded.raster.bands(), 4);
            let markers = decoded.metadata.container.jpeg_markers().unwrap();
            assert_eq!(markers.adobe, Some(AdobeTransform::Unknown));
            assert_every_pixel(&decoded.raster, &[255, 191, 127, 0], 3);
        }
    }

    #[test]
    fn test_ycck_samples_as_stored() {
        for quality in [95, 75] {
            let decoded = four_band([0, 0, 0, 0], jpeg_encoder::ColorType::CmykAsYcck, quality);
            let markers = decoded.metadata.container.jpeg_markers().unwrap();
            assert_eq!(markers.adobe, Some(AdobeTransform::Ycck));
            assert_every_pixel(&decoded.raster, &[0, 128, 128, 255], 3);
        }
    }

    #[test]
    fn test_cmyk_rejected() {
        let raster = RasterBuffer::zeroed(2, 2, 4).unwrap();
        let err = JpegWriter::new()
            .write_to_memory(&raster, PixelFormat::Cmyk8, None, None)
            .unwrap_err();
        assert!(matches!(err, IoError::UnsupportedLayout { .. }));
    }

    #[test]
    fn test_jfif_units() {
        let mut app0 = b"JFIF\0".to_vec();
        app0.extend_from_slice(&[1, 2, 2, 0, 100, 0, 100, 0, 0]);
        assert!((parse_jfif_dpi(&app0).unwrap() - 254.0).abs() < 1e-9);
        app0[7] = 0;
        assert_eq!(parse_jfif_dpi(&app0), None);
    }

    #[test]
    fn test_garbage_is_decode_error() {
        let err = JpegReader::new().read_from_memory(b"\xFF\xD8\xFF\xE0junk").unwrap_err();
        assert!(matches!(err, IoError::DecodeError(_)));
    }
}
