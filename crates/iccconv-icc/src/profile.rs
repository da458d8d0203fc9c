//! ICC profile wrapper.

use crate::{IccError, IccResult, ProfileResources, StandardProfile};
use iccconv_core::ColorSpaceKind;
use lcms2::{ColorSpaceSignature, Profile as LcmsProfile};
use std::path::Path;
use tracing::trace;

/// An ICC color profile.
///
/// Owns one Little CMS profile handle. The handle is released exactly once:
/// either by [`dispose`](Self::dispose) or when the value is dropped. Any
/// query on a disposed profile fails with [`IccError::Released`].
///
/// # Example
///
/// ```rust
/// use iccconv_core::ColorSpaceKind;
/// use iccconv_icc::ColorProfile;
///
/// let mut srgb = ColorProfile::srgb();
/// assert_eq!(srgb.color_space().unwrap(), ColorSpaceKind::Rgb);
///
/// srgb.dispose();
/// srgb.dispose(); // no-op
/// assert!(srgb.description().is_err());
/// ```
pub struct ColorProfile {
    inner: Option<LcmsProfile>,
}

impl ColorProfile {
    pub(crate) fn from_lcms(inner: LcmsProfile) -> Self {
        Self { inner: Some(inner) }
    }

    /// Loads a profile from an ICC file.
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or contains invalid data.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use iccconv_icc::ColorProfile;
    /// use std::path::Path;
    ///
    /// let profile = ColorProfile::from_file(Path::new("monitor.icc")).unwrap();
    /// ```
    pub fn from_file(path: &Path) -> IccResult<Self> {
        trace!(path = %path.display(), "ColorProfile::from_file");
        let inner = LcmsProfile::new_file(path)
            .map_err(|e| IccError::LoadFailed(format!("{}: {}", path.display(), e)))?;
        Ok(Self::from_lcms(inner))
    }

    /// Creates a profile from raw ICC data.
    ///
    /// # Errors
    ///
    /// [`IccError::InvalidProfile`] if the bytes are not a parseable profile.
    pub fn from_icc(data: &[u8]) -> IccResult<Self> {
        trace!(len = data.len(), "ColorProfile::from_icc");
        if data.is_empty() {
            return Err(IccError::InvalidProfile("empty ICC data".into()));
        }
        let inner = LcmsProfile::new_icc(data).map_err(|e| IccError::InvalidProfile(e.to_string()))?;
        Ok(Self::from_lcms(inner))
    }

    /// Creates a profile from a standard identifier.
    ///
    /// Bundled profiles are read from `resources`.
    pub fn from_standard(standard: StandardProfile, resources: &ProfileResources) -> IccResult<Self> {
        standard.load(resources)
    }

    /// Creates the built-in sRGB profile (IEC 61966-2-1).
    pub fn srgb() -> Self {
        Self::from_lcms(LcmsProfile::new_srgb())
    }

    /// Creates a grayscale profile with D50 white and the given gamma.
    pub fn gray(gamma: f64) -> IccResult<Self> {
        let curve = lcms2::ToneCurve::new(gamma);
        let inner = LcmsProfile::new_gray(&lcms2::CIExyY::d50(), &curve)
            .map_err(|e| IccError::CreateFailed(e.to_string()))?;
        Ok(Self::from_lcms(inner))
    }

    pub(crate) fn lcms(&self) -> IccResult<&LcmsProfile> {
        self.inner.as_ref().ok_or(IccError::Released("profile"))
    }

    /// Returns the colorspace family of the profile's data side.
    pub fn color_space(&self) -> IccResult<ColorSpaceKind> {
        Ok(match self.lcms()?.color_space() {
            ColorSpaceSignature::GrayData => ColorSpaceKind::Gray,
            ColorSpaceSignature::RgbData => ColorSpaceKind::Rgb,
            ColorSpaceSignature::CmykData => ColorSpaceKind::Cmyk,
            _ => ColorSpaceKind::Other,
        })
    }

    /// Fails with [`IccError::ColorSpaceMismatch`] unless the profile's
    /// colorspace is `expected`.
    pub fn ensure_color_space(&self, expected: ColorSpaceKind) -> IccResult<()> {
        let actual = self.color_space()?;
        if actual != expected {
            return Err(IccError::ColorSpaceMismatch { expected, actual });
        }
        Ok(())
    }

    /// Returns the profile description (empty if the profile has none).
    pub fn description(&self) -> IccResult<String> {
        Ok(self
            .lcms()?
            .info(lcms2::InfoType::Description, lcms2::Locale::none())
            .unwrap_or_default())
    }

    /// Serializes the profile to ICC bytes.
    pub fn to_icc(&self) -> IccResult<Vec<u8>> {
        self.lcms()?
            .icc()
            .map_err(|e| IccError::CreateFailed(e.to_string()))
    }

    /// Releases the engine handle now. Calling it again does nothing.
    pub fn dispose(&mut self) {
        if self.inner.take().is_some() {
            trace!("ColorProfile::dispose");
        }
    }

    /// Whether [`dispose`](Self::dispose) has run.
    pub fn is_disposed(&self) -> bool {
        self.inner.is_none()
    }
}

impl std::fmt::Debug for ColorProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.inner {
            Some(_) => f
                .debug_struct("ColorProfile")
                .field("description", &self.description().unwrap_or_default())
                .field("color_space", &self.color_space().ok())
                .finish(),
            None => f.debug_struct("ColorProfile").field("disposed", &true).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_srgb() {
        let profile = ColorProfile::srgb();
        assert_eq!(profile.color_space().unwrap(), ColorSpaceKind::Rgb);
        assert!(!profile.description().unwrap().is_empty());
    }

    #[test]
    fn test_gray() {
        let profile = ColorProfile::gray(2.2).unwrap();
        assert_eq!(profile.color_space().unwrap(), ColorSpaceKind::Gray);
        assert!(profile.ensure_color_space(ColorSpaceKind::Gray).is_ok());
        assert!(matches!(
            profile.ensure_color_space(ColorSpaceKind::Rgb),
            Err(IccError::ColorSpaceMismatch { .. })
        ));
    }

    #[test]
    fn test_other_color_space() {
        let xyz = ColorProfile::from_lcms(LcmsProfile::new_xyz());
        assert_eq!(xyz.color_space().unwrap(), ColorSpaceKind::Other);
    }

    #[test]
    fn test_to_icc_roundtrip() {
        let profile = ColorProfile::srgb();
        let data = profile.to_icc().unwrap();
        assert!(!data.is_empty());

        let reloaded = ColorProfile::from_icc(&data).unwrap();
        assert_eq!(reloaded.color_space().unwrap(), ColorSpaceKind::Rgb);
    }

    #[test]
    fn test_invalid_icc() {
        assert!(matches!(ColorProfile::from_icc(&[]), Err(IccError::InvalidProfile(_))));
        assert!(matches!(
            ColorProfile::from_icc(b"definitely not an icc profile"),
            Err(IccError::InvalidProfile(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gray.icc");
        std::fs::write(&path, ColorProfile::gray(1.8).unwrap().to_icc().unwrap()).unwrap();

        let loaded = ColorProfile::from_file(&path).unwrap();
        assert_eq!(loaded.color_space().unwrap(), ColorSpaceKind::Gray);

        let missing = ColorProfile::from_file(&dir.path().join("missing.icc"));
        assert!(matches!(missing, Err(IccError::LoadFailed(_))));
    }

    #[test]
    fn test_from_standard() {
        let dir = tempfile::tempdir().unwrap();
        let resources = ProfileResources::new(dir.path());

        let gray = ColorProfile::from_standard(StandardProfile::GrayD50Gamma22, &resources).unwrap();
        assert_eq!(gray.color_space().unwrap(), ColorSpaceKind::Gray);

        // Nothing bundled in an empty directory: both file-backed profiles are synthesized.
        let adobe = ColorProfile::from_standard(StandardProfile::AdobeRgb1998, &resources).unwrap();
        assert_eq!(adobe.color_space().unwrap(), ColorSpaceKind::Rgb);
        let cmyk = ColorProfile::from_standard(StandardProfile::CoatedFogra39, &resources).unwrap();
        assert_eq!(cmyk.color_space().unwrap(), ColorSpaceKind::Cmyk);
    }

    #[test]
    fn test_double_dispose() {
        let mut first = ColorProfile::srgb();
        let second = ColorProfile::srgb();

        first.dispose();
        first.dispose();

        assert!(first.is_disposed());
        assert!(matches!(first.color_space(), Err(IccError::Released(_))));
        assert!(first.to_icc().is_err());
        assert!(!second.is_disposed());
        assert_eq!(second.color_space().unwrap(), ColorSpaceKind::Rgb);
    }
}
