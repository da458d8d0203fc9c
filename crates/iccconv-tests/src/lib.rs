//! Integration tests for the iccconv crates.
//!
//! End-to-end conversions through real JPEG and PNG files: decode, resolve,
//! preprocess, transform, encode, and decode the result again.

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use iccconv::{ColorProfile, Error, ProfileResources, Transformer, TransformerConfig};
    use iccconv_core::{ColorSpaceKind, ContainerKind, PixelFormat, RasterBuffer};
    use iccconv_icc::{Intent, StandardProfile, TransformContext, TransformFlags, TransformSession};
    use iccconv_io::jpeg::JpegWriter;
    use iccconv_io::{png as png_io, DecodedImage, FileCodec, ImageCodec};
    use std::path::Path;
    use tempfile::{tempdir, TempDir};

    /// Transformer reading bundled profiles from an empty directory, so
    /// results do not depend on what is installed.
    fn isolated(destination: ColorProfile) -> (TempDir, Transformer) {
        let dir = tempdir().unwrap();
        let resources = ProfileResources::new(dir.path().join("no-profiles"));
        (dir, Transformer::with_resources(destination, resources).unwrap())
    }

    fn decode(path: &Path) -> DecodedImage {
        FileCodec.decode(path).expect("Failed to decode output")
    }

    fn solid_bgr(width: u32, height: u32, rgb: [u8; 3]) -> RasterBuffer {
        let px = [rgb[2], rgb[1], rgb[0]];
        RasterBuffer::new(width, height, 3, px.repeat((width * height) as usize)).unwrap()
    }

    fn write_png(path: &Path, raster: &RasterBuffer, format: PixelFormat, dpi: Option<f64>) {
        std::fs::write(path, png_io::write_to_memory(raster, format, None, dpi).unwrap()).unwrap();
    }

    /// Inserts a marker segment right after SOI.
    fn insert_segment(jpeg: &[u8], marker: u8, payload: &[u8]) -> Vec<u8> {
        let mut out = jpeg[..2].to_vec();
        out.extend_from_slice(&[0xFF, marker]);
        out.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
        out.extend_from_slice(payload);
        out.extend_from_slice(&jpeg[2..]);
        out
    }

    /// APP1 payload carrying only EXIF `ColorSpace`, little endian.
    fn exif_app1(color_space: u16) -> Vec<u8> {
        let mut app1 = b"Exif\0\0II".to_vec();
        app1.extend_from_slice(&42u16.to_le_bytes());
        app1.extend_from_slice(&8u32.to_le_bytes());
        // IFD0: ExifIFD pointer -> 26
        app1.extend_from_slice(&1u16.to_le_bytes());
        app1.extend_from_slice(&0x8769u16.to_le_bytes());
        app1.extend_from_slice(&4u16.to_le_bytes());
        app1.extend_from_slice(&1u32.to_le_bytes());
        app1.extend_from_slice(&26u32.to_le_bytes());
        app1.extend_from_slice(&0u32.to_le_bytes());
        // EXIF IFD: ColorSpace
        app1.extend_from_slice(&1u16.to_le_bytes());
        app1.extend_from_slice(&0xA001u16.to_le_bytes());
        app1.extend_from_slice(&3u16.to_le_bytes());
        app1.extend_from_slice(&1u32.to_le_bytes());
        app1.extend_from_slice(&color_space.to_le_bytes());
        app1.extend_from_slice(&[0, 0]);
        app1.extend_from_slice(&0u32.to_le_bytes());
        app1
    }

    /// Encodes a solid 16x16 four-band JPEG. `cmyk` uses 0 for no ink.
    fn four_band_jpeg(path: &Path, cmyk: [u8; 4], color: jpeg_encoder::ColorType, quality: u8) {
        let mut jpeg = Vec::new();
        jpeg_encoder::Encoder::new(&mut jpeg, quality)
            .encode(&cmyk.repeat(256), 16, 16, color)
            .unwrap();
        std::fs::write(path, jpeg).unwrap();
    }

    /// Converts a four-band JPEG to an sRGB PNG and returns every decoded
    /// pixel as RGB.
    fn four_band_to_srgb(
        dir: &Path,
        name: &str,
        cmyk: [u8; 4],
        color: jpeg_encoder::ColorType,
        quality: u8,
    ) -> Vec<[u8; 3]> {
        let input = dir.join(format!("{name}.jpg"));
        let output = dir.join(format!("{name}.png"));
        four_band_jpeg(&input, cmyk, color, quality);
        assert_eq!(decode(&input).raster.bands(), 4);

        let (_res, transformer) = isolated(ColorProfile::srgb());
        transformer.transform_file(&input, &output).unwrap();
        let out = decode(&output);
        assert_eq!(out.raster.bands(), 3);
        out.raster
            .as_bytes()
            .chunks_exact(3)
            .map(|bgr| [bgr[2], bgr[1], bgr[0]])
            .collect()
    }

    #[test]
    fn test_png_to_jpeg_embeds_destination() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.png");
        let output = dir.path().join("out.jpg");
        write_png(&input, &solid_bgr(32, 16, [90, 140, 200]), PixelFormat::Bgr8, Some(300.0));

        let (_res, transformer) = isolated(ColorProfile::srgb());
        transformer.transform_file(&input, &output).unwrap();

        let out = decode(&output);
        assert_eq!(out.metadata.container.kind(), ContainerKind::Jpeg);
        assert_eq!((out.raster.width(), out.raster.height(), out.raster.bands()), (32, 16, 3));
        assert_relative_eq!(out.metadata.dpi.unwrap(), 300.0, epsilon = 0.5);

        let icc = out.metadata.icc_profile.as_deref().expect("destination profile embedded");
        let embedded = ColorProfile::from_icc(icc).unwrap();
        assert_eq!(embedded.color_space().unwrap(), ColorSpaceKind::Rgb);
    }

    #[test]
    fn test_jpeg_roundtrip_keeps_color() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.jpg");
        let output = dir.path().join("out.png");
        let rgb = [200, 30, 30];
        let jpeg = JpegWriter::new()
            .write_to_memory(&solid_bgr(16, 16, rgb), PixelFormat::Bgr8, None, None)
            .unwrap();
        std::fs::write(&input, jpeg).unwrap();

        let (_res, mut transformer) = isolated(ColorProfile::srgb());
        transformer.set_flags(TransformFlags::NONE);
        transformer.transform_file(&input, &output).unwrap();

        let out = decode(&output);
        assert_eq!(out.metadata.container.kind(), ContainerKind::Png);
        let bgr = &out.raster.as_bytes()[..3];
        for (got, want) in [bgr[2], bgr[1], bgr[0]].into_iter().zip(rgb) {
            assert!((got as i32 - want as i32).abs() <= 6, "{bgr:?} vs {rgb:?}");
        }
    }

    #[test]
    fn test_gray_destination() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.png");
        let output = dir.path().join("out.jpeg");
        write_png(&input, &solid_bgr(8, 8, [255, 255, 255]), PixelFormat::Bgr8, None);

        let (_res, transformer) = isolated(ColorProfile::gray(2.2).unwrap());
        transformer.transform_file(&input, &output).unwrap();

        let out = decode(&output);
        assert_eq!(out.raster.bands(), 1);
        assert!(out.raster.as_bytes().iter().all(|&v| v >= 250));
        let icc = out.metadata.icc_profile.unwrap();
        assert_eq!(
            ColorProfile::from_icc(&icc).unwrap().color_space().unwrap(),
            ColorSpaceKind::Gray
        );
    }

    #[test]
    fn test_alpha_survives_png_output() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("alpha.png");
        let output = dir.path().join("alpha_out.png");

        let abgr: Vec<u8> = (0..16u8).flat_map(|i| [i * 16, 40, 80, 120]).collect();
        let raster = RasterBuffer::new(4, 4, 4, abgr.clone()).unwrap();
        write_png(&input, &raster, PixelFormat::Abgr8, None);

        let (_res, transformer) = isolated(ColorProfile::srgb());
        transformer.transform_file(&input, &output).unwrap();

        let out = decode(&output);
        assert!(out.metadata.transparent);
        let alpha_in: Vec<u8> = abgr.chunks_exact(4).map(|px| px[0]).collect();
        let alpha_out: Vec<u8> = out.raster.as_bytes().chunks_exact(4).map(|px| px[0]).collect();
        assert_eq!(alpha_in, alpha_out);
    }

    #[test]
    fn test_alpha_dropped_for_jpeg_output() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("alpha.png");
        let output = dir.path().join("flat.jpg");
        let raster = RasterBuffer::new(2, 2, 4, [128u8, 10, 20, 30].repeat(4)).unwrap();
        write_png(&input, &raster, PixelFormat::Abgr8, None);

        let (_res, transformer) = isolated(ColorProfile::srgb());
        transformer.transform_file(&input, &output).unwrap();
        assert_eq!(decode(&output).raster.bands(), 3);
    }

    #[test]
    fn test_exif_adobe_rgb_hint() {
        let dir = tempdir().unwrap();
        let plain = JpegWriter::new()
            .write_to_memory(&solid_bgr(8, 8, [200, 100, 50]), PixelFormat::Bgr8, None, None)
            .unwrap();
        let hinted = insert_segment(&plain, 0xE1, &exif_app1(2));

        let (_res, transformer) = isolated(ColorProfile::srgb());
        let mut reds = Vec::new();
        for (name, bytes) in [("plain", plain), ("hinted", hinted)] {
            let input = dir.path().join(format!("{name}.jpg"));
            let output = dir.path().join(format!("{name}.png"));
            std::fs::write(&input, bytes).unwrap();
            transformer.transform_file(&input, &output).unwrap();
            reds.push(decode(&output).raster.as_bytes()[2] as i32);
        }
        // Adobe RGB red is more saturated than sRGB red.
        assert!(reds[1] > reds[0] + 10, "{reds:?}");
    }

    #[test]
    fn test_cmyk_jpeg_white_and_black() {
        let dir = tempdir().unwrap();
        // 95 stores every channel at full resolution, 75 subsamples.
        for quality in [95, 75] {
            let white =
                four_band_to_srgb(dir.path(), "white", [0, 0, 0, 0], jpeg_encoder::ColorType::Cmyk, quality);
            assert!(white.iter().flatten().all(|&v| v >= 245), "q{quality}: {:?}", white[0]);

            let black =
                four_band_to_srgb(dir.path(), "black", [0, 0, 0, 255], jpeg_encoder::ColorType::Cmyk, quality);
            assert!(black.iter().flatten().all(|&v| v <= 10), "q{quality}: {:?}", black[0]);
        }
    }

    #[test]
    fn test_ycck_jpeg_white_and_black() {
        let dir = tempdir().unwrap();
        for quality in [95, 75] {
            let white =
                four_band_to_srgb(dir.path(), "white", [0, 0, 0, 0], jpeg_encoder::ColorType::CmykAsYcck, quality);
            assert!(white.iter().flatten().all(|&v| v >= 245), "q{quality}: {:?}", white[0]);

            let black =
                four_band_to_srgb(dir.path(), "black", [0, 0, 0, 255], jpeg_encoder::ColorType::CmykAsYcck, quality);
            assert!(black.iter().flatten().all(|&v| v <= 10), "q{quality}: {:?}", black[0]);
        }
    }

    #[test]
    fn test_cmyk_jpeg_cyan_is_cyan() {
        let dir = tempdir().unwrap();
        let cyan = four_band_to_srgb(dir.path(), "cyan", [255, 0, 0, 0], jpeg_encoder::ColorType::Cmyk, 95);
        let [r, g, b] = cyan[0];
        assert!(r < 60 && g > 200 && b > 200, "{:?}", cyan[0]);
    }

    #[test]
    fn test_standard_cmyk_white_roundtrip() {
        let (_dir, transformer) = isolated(ColorProfile::srgb());
        let cmyk = StandardProfile::CoatedFogra39.load(transformer.resources()).unwrap();

        let session = TransformSession::new(&TransformContext {
            source: &cmyk,
            source_format: PixelFormat::Cmyk8Inverted,
            destination: &cmyk,
            destination_format: PixelFormat::Cmyk8Inverted,
            intent: Intent::RelativeColorimetric,
            flags: TransformFlags::default(),
        })
        .unwrap();
        let mut out = [0u8; 4];
        session.transform(&[255, 255, 255, 255], &mut out, 1).unwrap();
        assert!(out.iter().all(|&v| v >= 250), "{out:?}");

        let to_srgb = TransformSession::new(&TransformContext {
            source: &cmyk,
            source_format: PixelFormat::Cmyk8Inverted,
            destination: &ColorProfile::srgb(),
            destination_format: PixelFormat::Bgr8,
            intent: Intent::RelativeColorimetric,
            flags: TransformFlags::default(),
        })
        .unwrap();
        let mut bgr = [0u8; 3];
        to_srgb.transform(&[255, 255, 255, 255], &mut bgr, 1).unwrap();
        assert!(bgr.iter().all(|&v| v >= 245), "{bgr:?}");
    }

    #[test]
    fn test_indexed_png_rejected() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("palette.png");
        let mut bytes = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut bytes, 2, 1);
            encoder.set_color(png::ColorType::Indexed);
            encoder.set_depth(png::BitDepth::Eight);
            encoder.set_palette(vec![255, 0, 0, 0, 0, 255]);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(&[0, 1]).unwrap();
        }
        std::fs::write(&input, bytes).unwrap();

        let (_res, transformer) = isolated(ColorProfile::srgb());
        let err = transformer
            .transform_file(&input, &dir.path().join("out.png"))
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedColorModel(_)));
    }

    #[test]
    fn test_undecodable_input() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("notes.png");
        std::fs::write(&input, b"plain text, not an image").unwrap();

        let (_res, transformer) = isolated(ColorProfile::srgb());
        let err = transformer
            .transform_file(&input, &dir.path().join("out.png"))
            .unwrap_err();
        assert!(err.is_codec_error());
        assert!(matches!(err, Error::Decoding(_)));
    }

    #[test]
    fn test_config_driven_conversion() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("iccconv.yaml");
        std::fs::write(
            &config_path,
            "destination: gray\nintent: perceptual\njpeg_quality: 80\nprofile_dir: no-profiles\n",
        )
        .unwrap();
        let config = TransformerConfig::from_file(&config_path).unwrap();
        let transformer = Transformer::from_config(&config).unwrap();
        assert_eq!(transformer.intent(), Intent::Perceptual);
        assert_eq!(transformer.jpeg_quality(), 80);
        assert_eq!(transformer.resources().dir(), dir.path().join("no-profiles"));

        let input = dir.path().join("in.png");
        let output = dir.path().join("out.jpg");
        write_png(&input, &solid_bgr(4, 4, [10, 10, 10]), PixelFormat::Bgr8, None);
        transformer.transform_file(&input, &output).unwrap();
        assert_eq!(decode(&output).raster.bands(), 1);
    }

    #[test]
    fn test_repeatable_output() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.jpg");
        let data: Vec<u8> = (0..24 * 24 * 3).map(|i| (i * 13 % 256) as u8).collect();
        let raster = RasterBuffer::new(24, 24, 3, data).unwrap();
        std::fs::write(
            &input,
            JpegWriter::new()
                .write_to_memory(&raster, PixelFormat::Rgb8, None, None)
                .unwrap(),
        )
        .unwrap();

        let (_res, transformer) = isolated(ColorProfile::srgb());
        let a = dir.path().join("a.png");
        let b = dir.path().join("b.png");
        transformer.transform_file(&input, &a).unwrap();
        transformer.transform_file(&input, &b).unwrap();
        assert_eq!(std::fs::read(a).unwrap(), std::fs::read(b).unwrap());
    }
}
