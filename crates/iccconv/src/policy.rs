//! Input profile selection.
//!
//! A source raster is interpreted with, in order of preference:
//!
//! 1. its embedded ICC profile
//! 2. the profile named by a JPEG's EXIF `ColorSpace` tag (3-band only,
//!    when no profile is embedded)
//! 3. the default profile for its [`ProfileSlot`]
//!
//! Disabling embedded profiles skips the first two steps: the EXIF hint is
//! treated as part of the file's own color description.
//!
//! Profiles built on the fly are owned by the returned [`ResolvedProfile`]
//! and released when it drops; defaults are only borrowed.

use crate::ProfileSlot;
use iccconv_core::{Error, ExifColorSpace, ImageMetadata, Result};
use iccconv_icc::{ColorProfile, ProfileResources, StandardProfile};
use std::ops::Deref;
use tracing::{debug, trace};

/// Gray, RGB and CMYK fallback profiles.
///
/// Every slot holds a profile of the matching colorspace. The CMYK slot
/// may be left empty through [`new`](Self::new); resolving a CMYK raster
/// then fails.
#[derive(Debug)]
pub struct DefaultProfiles {
    gray: ColorProfile,
    rgb: ColorProfile,
    cmyk: Option<ColorProfile>,
}

impl DefaultProfiles {
    /// Gray D50 gamma 2.2, sRGB and Coated FOGRA39.
    ///
    /// A missing FOGRA39 resource is replaced by the synthesized CMYK
    /// profile; a present but unreadable one is an error.
    pub fn standard(resources: &ProfileResources) -> Result<Self> {
        let gray = StandardProfile::GrayD50Gamma22.load(resources)?;
        let rgb = StandardProfile::Srgb.load(resources)?;
        let cmyk = StandardProfile::CoatedFogra39.load(resources)?;
        debug!(cmyk = %cmyk.description()?, "Default profiles loaded");
        Ok(Self {
            gray,
            rgb,
            cmyk: Some(cmyk),
        })
    }

    /// Builds a set from explicit profiles, checking each slot's colorspace.
    pub fn new(gray: ColorProfile, rgb: ColorProfile, cmyk: Option<ColorProfile>) -> Result<Self> {
        gray.ensure_color_space(ProfileSlot::Gray.color_space())?;
        rgb.ensure_color_space(ProfileSlot::Rgb.color_space())?;
        if let Some(cmyk) = &cmyk {
            cmyk.ensure_color_space(ProfileSlot::Cmyk.color_space())?;
        }
        Ok(Self { gray, rgb, cmyk })
    }

    /// The profile in `slot`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if the slot is empty.
    pub fn get(&self, slot: ProfileSlot) -> Result<&ColorProfile> {
        match slot {
            ProfileSlot::Gray => Ok(&self.gray),
            ProfileSlot::Rgb => Ok(&self.rgb),
            ProfileSlot::Cmyk => self
                .cmyk
                .as_ref()
                .ok_or_else(|| Error::invalid_argument("no default CMYK profile configured")),
        }
    }

    /// Whether `slot` holds a profile.
    pub fn has(&self, slot: ProfileSlot) -> bool {
        slot != ProfileSlot::Cmyk || self.cmyk.is_some()
    }

    /// Replaces the profile in `slot`.
    ///
    /// The colorspace is checked first; on mismatch the previous profile
    /// stays in place and [`Error::InvalidArgument`] is returned.
    pub fn set(&mut self, slot: ProfileSlot, profile: ColorProfile) -> Result<()> {
        profile.ensure_color_space(slot.color_space())?;
        debug!(%slot, description = %profile.description().unwrap_or_default(), "Default profile replaced");
        match slot {
            ProfileSlot::Gray => self.gray = profile,
            ProfileSlot::Rgb => self.rgb = profile,
            ProfileSlot::Cmyk => self.cmyk = Some(profile),
        }
        Ok(())
    }
}

/// A source profile, either built for one image or borrowed from the
/// defaults.
#[derive(Debug)]
pub enum ResolvedProfile<'a> {
    /// Built from the image itself; released on drop.
    Owned(ColorProfile),
    /// One of the [`DefaultProfiles`].
    Borrowed(&'a ColorProfile),
}

impl ResolvedProfile<'_> {
    /// Whether the profile was built for this image.
    pub fn is_owned(&self) -> bool {
        matches!(self, ResolvedProfile::Owned(_))
    }
}

impl Deref for ResolvedProfile<'_> {
    type Target = ColorProfile;

    fn deref(&self) -> &ColorProfile {
        match self {
            ResolvedProfile::Owned(profile) => profile,
            ResolvedProfile::Borrowed(profile) => profile,
        }
    }
}

/// Picks the profile a decoded raster is interpreted with.
///
/// # Errors
///
/// - [`Error::InvalidProfileData`] if the embedded profile is malformed
/// - [`Error::InvalidArgument`] if the slot default is missing
pub fn resolve_input_profile<'a>(
    metadata: &ImageMetadata,
    bands: u32,
    slot: ProfileSlot,
    defaults: &'a DefaultProfiles,
    use_embedded: bool,
    resources: &ProfileResources,
) -> Result<ResolvedProfile<'a>> {
    trace!(bands, %slot, use_embedded, "resolve_input_profile");

    if use_embedded {
        if let Some(icc) = metadata.icc_profile.as_deref() {
            let profile = ColorProfile::from_icc(icc)
                .map_err(|e| Error::invalid_profile(format!("embedded profile: {e}")))?;
            debug!(
                description = %profile.description().unwrap_or_default(),
                len = icc.len(),
                "Using embedded profile"
            );
            return Ok(ResolvedProfile::Owned(profile));
        }

        if let Some(standard) = exif_hint(metadata, bands) {
            debug!(profile = standard.name(), "Using EXIF colorspace hint");
            return Ok(ResolvedProfile::Owned(standard.load(resources)?));
        }
    }

    let profile = defaults.get(slot)?;
    debug!(%slot, description = %profile.description().unwrap_or_default(), "Using default profile");
    Ok(ResolvedProfile::Borrowed(profile))
}

/// Standard profile named by a 3-band JPEG's EXIF `ColorSpace` tag.
fn exif_hint(metadata: &ImageMetadata, bands: u32) -> Option<StandardProfile> {
    if bands != 3 {
        return None;
    }
    match metadata.container.jpeg_markers()?.exif_color_space? {
        ExifColorSpace::Srgb => Some(StandardProfile::Srgb),
        ExifColorSpace::AdobeRgb => Some(StandardProfile::AdobeRgb1998),
        _ => None,
    }
}
