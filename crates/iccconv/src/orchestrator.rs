//! End-to-end conversion of one raster or one file.

use crate::config::TransformerConfig;
use crate::policy::{resolve_input_profile, DefaultProfiles};
use crate::{preprocess, resolve, ProfileSlot};
use iccconv_core::{ColorSpaceKind, ContainerKind, Error, ImageMetadata, PixelFormat, RasterBuffer, Result};
use iccconv_icc::{ColorProfile, Intent, ProfileResources, TransformContext, TransformFlags, TransformSession};
use iccconv_io::{DecodedImage, EncodeRequest, FileCodec, ImageCodec};
use std::path::Path;
use tracing::{debug, info, trace};

/// Converted samples and the layout they are stored in.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformedRaster {
    /// Converted pixels.
    pub raster: RasterBuffer,
    /// Layout of `raster`: `Gray8`, `Bgr8` or `Abgr8`.
    pub format: PixelFormat,
}

/// Converts images into one destination profile.
///
/// Holds the destination profile, the default input profiles, rendering
/// options and the codec used by [`transform_file`](Self::transform_file).
///
/// # Example
///
/// ```rust,no_run
/// use iccconv::Transformer;
/// use iccconv_icc::{ColorProfile, Intent};
///
/// let mut transformer = Transformer::new(ColorProfile::srgb())?;
/// transformer.set_intent(Intent::Perceptual);
/// transformer.transform_file("scan.jpg".as_ref(), "scan.png".as_ref())?;
/// # Ok::<(), iccconv_core::Error>(())
/// ```
#[derive(Debug)]
pub struct Transformer<C: ImageCodec = FileCodec> {
    destination: ColorProfile,
    defaults: DefaultProfiles,
    intent: Intent,
    flags: TransformFlags,
    use_embedded: bool,
    jpeg_quality: u8,
    codec: C,
    resources: ProfileResources,
}

impl Transformer<FileCodec> {
    /// Creates a transformer with standard defaults, relative colorimetric
    /// intent and black-point compensation.
    pub fn new(destination: ColorProfile) -> Result<Self> {
        Self::with_resources(destination, ProfileResources::from_env())
    }

    /// Like [`new`](Self::new), reading bundled profiles from `resources`.
    pub fn with_resources(destination: ColorProfile, resources: ProfileResources) -> Result<Self> {
        let defaults = DefaultProfiles::standard(&resources)?;
        Ok(Self {
            destination,
            defaults,
            intent: Intent::default(),
            flags: TransformFlags::default(),
            use_embedded: true,
            jpeg_quality: 100,
            codec: FileCodec,
            resources,
        })
    }

    /// Builds a transformer from a loaded config.
    pub fn from_config(config: &TransformerConfig) -> Result<Self> {
        let resources = config.resources();
        let destination = config.destination.load(&resources)?;
        let mut transformer = Self::with_resources(destination, resources)?;
        transformer.intent = config.intent;
        transformer.flags = config.flags();
        transformer.use_embedded = config.use_embedded_profiles;
        transformer.set_jpeg_quality(config.jpeg_quality);

        let overrides = [
            (ProfileSlot::Gray, &config.default_gray),
            (ProfileSlot::Rgb, &config.default_rgb),
            (ProfileSlot::Cmyk, &config.default_cmyk),
        ];
        for (slot, source) in overrides {
            if let Some(source) = source {
                let profile = source.load(&transformer.resources)?;
                transformer.set_default(slot, profile)?;
            }
        }
        Ok(transformer)
    }
}

impl<C: ImageCodec> Transformer<C> {
    /// Swaps the codec used by [`transform_file`](Self::transform_file).
    pub fn with_codec<D: ImageCodec>(self, codec: D) -> Transformer<D> {
        Transformer {
            destination: self.destination,
            defaults: self.defaults,
            intent: self.intent,
            flags: self.flags,
            use_embedded: self.use_embedded,
            jpeg_quality: self.jpeg_quality,
            codec,
            resources: self.resources,
        }
    }

    /// Destination profile.
    pub fn destination(&self) -> &ColorProfile {
        &self.destination
    }

    /// Rendering intent.
    pub fn intent(&self) -> Intent {
        self.intent
    }

    /// Sets the rendering intent.
    pub fn set_intent(&mut self, intent: Intent) {
        self.intent = intent;
    }

    /// Engine flags.
    pub fn flags(&self) -> TransformFlags {
        self.flags
    }

    /// Sets the engine flags.
    pub fn set_flags(&mut self, flags: TransformFlags) {
        self.flags = flags;
    }

    /// Whether embedded source profiles are honored.
    pub fn use_embedded_profiles(&self) -> bool {
        self.use_embedded
    }

    /// Honors or ignores embedded source profiles and EXIF colorspace hints.
    pub fn set_use_embedded_profiles(&mut self, use_embedded: bool) {
        self.use_embedded = use_embedded;
    }

    /// JPEG output quality.
    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality
    }

    /// Sets JPEG output quality, clamped to 1-100.
    pub fn set_jpeg_quality(&mut self, quality: u8) {
        self.jpeg_quality = quality.clamp(1, 100);
    }

    /// Bundled-profile location.
    pub fn resources(&self) -> &ProfileResources {
        &self.resources
    }

    /// The default profile for `slot`.
    pub fn default_profile(&self, slot: ProfileSlot) -> Result<&ColorProfile> {
        self.defaults.get(slot)
    }

    /// Replaces the default profile for `slot`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if the profile's colorspace does not match
    /// the slot. The previous default is kept.
    pub fn set_default(&mut self, slot: ProfileSlot, profile: ColorProfile) -> Result<()> {
        self.defaults.set(slot, profile)
    }

    /// Converts a decoded raster into the destination profile.
    ///
    /// The raster is resolved to an engine layout, preprocessed, interpreted
    /// with its embedded, hinted or default profile, and converted scanline by
    /// scanline. Alpha is carried over when the output layout has room for it.
    ///
    /// # Errors
    ///
    /// - [`Error::UnsupportedColorModel`] for indexed rasters
    /// - [`Error::InvalidArgument`] if `metadata.bands` disagrees with the
    ///   raster, or the needed default profile is missing
    /// - [`Error::UnsupportedRasterFormat`], [`Error::UnsupportedDestinationProfile`],
    ///   [`Error::InvalidProfileData`], [`Error::TransformEngine`]
    pub fn transform_image(&self, metadata: &ImageMetadata, mut raster: RasterBuffer) -> Result<TransformedRaster> {
        trace!(
            width = raster.width(),
            height = raster.height(),
            bands = raster.bands(),
            container = %metadata.container.kind(),
            "Transformer::transform_image"
        );

        if metadata.indexed {
            return Err(Error::UnsupportedColorModel("indexed color".into()));
        }
        if metadata.bands != raster.bands() {
            return Err(Error::invalid_argument(format!(
                "metadata reports {} bands, raster has {}",
                metadata.bands,
                raster.bands()
            )));
        }

        let resolution = resolve(raster.bands(), &metadata.container, metadata.indexed)?;
        preprocess::apply(resolution.preprocess, &mut raster)?;

        let destination_format = destination_format(&self.destination, metadata.transparent)?;
        let source = resolve_input_profile(
            metadata,
            raster.bands(),
            resolution.slot,
            &self.defaults,
            self.use_embedded,
            &self.resources,
        )?;

        convert(
            &raster,
            &TransformContext {
                source: &source,
                source_format: resolution.format,
                destination: &self.destination,
                destination_format,
                intent: self.intent,
                flags: self.flags,
            },
            metadata.transparent,
        )
    }

    /// Converts a raster from `source` into the configured destination, using
    /// this transformer's intent and flags.
    ///
    /// Same checks as [`transform_raster`]; defaults, embedded profiles and
    /// preprocessing are not involved.
    pub fn transform_raster_with(
        &self,
        raster: &RasterBuffer,
        source_format: PixelFormat,
        source: &ColorProfile,
        transparent: bool,
    ) -> Result<TransformedRaster> {
        transform_raster(
            raster,
            source_format,
            source,
            &self.destination,
            self.intent,
            self.flags,
            transparent,
        )
    }

    /// Decodes `source`, converts it and writes `destination`.
    ///
    /// The output container follows the destination extension (`.png` for
    /// PNG, anything else JPEG). Source resolution is carried over and the
    /// destination profile is embedded.
    ///
    /// # Errors
    ///
    /// [`Error::Decoding`] / [`Error::Encoding`] for codec failures, plus
    /// everything [`transform_image`](Self::transform_image) reports.
    pub fn transform_file(&self, source: &Path, destination: &Path) -> Result<()> {
        trace!(source = %source.display(), destination = %destination.display(), "Transformer::transform_file");

        let DecodedImage { raster, metadata } = self
            .codec
            .decode(source)
            .map_err(|e| Error::Decoding(format!("{}: {}", source.display(), e)))?;

        let transformed = self.transform_image(&metadata, raster)?;
        let icc = self.destination.to_icc()?;
        let container = ContainerKind::for_output(destination);

        let request = EncodeRequest {
            raster: &transformed.raster,
            format: transformed.format,
            container,
            icc_profile: Some(&icc),
            dpi: metadata.dpi,
            jpeg_quality: self.jpeg_quality,
        };
        self.codec
            .encode(&request, destination)
            .map_err(|e| Error::Encoding(format!("{}: {}", destination.display(), e)))?;

        info!(
            source = %source.display(),
            destination = %destination.display(),
            format = %transformed.format,
            %container,
            "Converted"
        );
        Ok(())
    }
}

/// Converts a raster between two explicit profiles.
///
/// `source` must match the colorspace of `source_format`; `destination`
/// must be RGB (output `Bgr8`, or `Abgr8` when `transparent`) or Gray
/// (output `Gray8`).
///
/// # Errors
///
/// - [`Error::InvalidArgument`] on a source profile/format mismatch or a
///   raster whose band count differs from `source_format`
/// - [`Error::UnsupportedDestinationProfile`] for other destinations
/// - [`Error::TransformEngine`] if the engine rejects the pair
///
/// # Example
///
/// ```rust
/// use iccconv::transform_raster;
/// use iccconv_core::{PixelFormat, RasterBuffer};
/// use iccconv_icc::{ColorProfile, Intent, TransformFlags};
///
/// let rgb = RasterBuffer::new(1, 1, 3, vec![255, 255, 255]).unwrap();
/// let gray = ColorProfile::gray(2.2).unwrap();
/// let out = transform_raster(
///     &rgb,
///     PixelFormat::Rgb8,
///     &ColorProfile::srgb(),
///     &gray,
///     Intent::RelativeColorimetric,
///     TransformFlags::default(),
///     false,
/// )
/// .unwrap();
/// assert_eq!(out.format, PixelFormat::Gray8);
/// assert!(out.raster.as_bytes()[0] > 250);
/// ```
pub fn transform_raster(
    raster: &RasterBuffer,
    source_format: PixelFormat,
    source: &ColorProfile,
    destination: &ColorProfile,
    intent: Intent,
    flags: TransformFlags,
    transparent: bool,
) -> Result<TransformedRaster> {
    trace!(format = %source_format, transparent, "transform_raster");

    if raster.bands() != source_format.bands() {
        return Err(Error::invalid_argument(format!(
            "{} raster has {} bands",
            source_format,
            raster.bands()
        )));
    }
    source.ensure_color_space(source_format.color_space())?;
    let destination_format = destination_format(destination, transparent)?;

    convert(
        raster,
        &TransformContext {
            source,
            source_format,
            destination,
            destination_format,
            intent,
            flags,
        },
        transparent,
    )
}

/// Output layout for a destination profile.
fn destination_format(destination: &ColorProfile, transparent: bool) -> Result<PixelFormat> {
    match destination.color_space()? {
        ColorSpaceKind::Rgb if transparent => Ok(PixelFormat::Abgr8),
        ColorSpaceKind::Rgb => Ok(PixelFormat::Bgr8),
        ColorSpaceKind::Gray => Ok(PixelFormat::Gray8),
        other => Err(Error::UnsupportedDestinationProfile(other)),
    }
}

fn convert(raster: &RasterBuffer, context: &TransformContext<'_>, transparent: bool) -> Result<TransformedRaster> {
    let session = TransformSession::new(context)?;
    let destination_format = context.destination_format;
    let mut output = RasterBuffer::zeroed(raster.width(), raster.height(), destination_format.bands())?;

    let width = raster.width() as usize;
    for (src_row, dst_row) in raster.rows().zip(output.rows_mut()) {
        session.transform(src_row, dst_row, width)?;
    }

    if transparent {
        if let Some(dst_alpha) = destination_format.alpha_offset() {
            // Layouts without alpha hand over their first band.
            let src_alpha = context.source_format.alpha_offset().unwrap_or(0);
            copy_alpha(raster, src_alpha, &mut output, dst_alpha);
        }
    }

    debug!(
        from = %context.source_format,
        to = %destination_format,
        pixels = raster.pixel_count(),
        "Transformed raster"
    );
    Ok(TransformedRaster {
        raster: output,
        format: destination_format,
    })
}

fn copy_alpha(source: &RasterBuffer, src_offset: usize, output: &mut RasterBuffer, dst_offset: usize) {
    let src_bands = source.bands() as usize;
    let dst_bands = output.bands() as usize;
    for (src, dst) in source
        .as_bytes()
        .chunks_exact(src_bands)
        .zip(output.as_bytes_mut().chunks_exact_mut(dst_bands))
    {
        dst[dst_offset] = src[src_offset];
    }
}
