//! Standard ICC profile definitions.

use crate::cmyk::synthetic_cmyk;
use crate::{ColorProfile, IccError, IccResult};
use lcms2::{CIExyY, CIExyYTRIPLE, Profile as LcmsProfile, ToneCurve};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, warn};

/// Standard profiles known by identifier.
///
/// Gray and sRGB are built in. Adobe RGB (1998) and Coated FOGRA39 are read
/// verbatim from the bundled resource directory (see [`ProfileResources`])
/// and synthesized in code when the file is absent, so every identifier
/// always yields a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StandardProfile {
    /// Grayscale, D50 white, gamma 2.2.
    #[serde(rename = "gray")]
    GrayD50Gamma22,
    /// IEC 61966-2-1 sRGB.
    #[serde(rename = "srgb")]
    Srgb,
    /// Adobe RGB (1998).
    #[serde(rename = "adobe-rgb")]
    AdobeRgb1998,
    /// Coated FOGRA39 (ISO 12647-2:2004).
    #[serde(rename = "fogra39")]
    CoatedFogra39,
}

impl StandardProfile {
    /// All identifiers in id order.
    pub const ALL: [StandardProfile; 4] = [
        StandardProfile::GrayD50Gamma22,
        StandardProfile::Srgb,
        StandardProfile::AdobeRgb1998,
        StandardProfile::CoatedFogra39,
    ];

    /// Numeric id (1-based).
    pub fn id(self) -> u8 {
        match self {
            StandardProfile::GrayD50Gamma22 => 1,
            StandardProfile::Srgb => 2,
            StandardProfile::AdobeRgb1998 => 3,
            StandardProfile::CoatedFogra39 => 4,
        }
    }

    /// Looks up a numeric id.
    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.id() == id)
    }

    /// Short name used on the command line and in config files.
    pub fn name(self) -> &'static str {
        match self {
            StandardProfile::GrayD50Gamma22 => "gray",
            StandardProfile::Srgb => "srgb",
            StandardProfile::AdobeRgb1998 => "adobe-rgb",
            StandardProfile::CoatedFogra39 => "fogra39",
        }
    }

    /// File name of the bundled resource, for profiles that need one.
    pub fn resource_file(self) -> Option<&'static str> {
        match self {
            StandardProfile::AdobeRgb1998 => Some("AdobeRGB1998.icc"),
            StandardProfile::CoatedFogra39 => Some("CoatedFOGRA39.icc"),
            _ => None,
        }
    }

    /// Builds the profile.
    ///
    /// A missing `AdobeRGB1998.icc` falls back to a profile synthesized from
    /// the Adobe RGB (1998) primaries. A missing `CoatedFOGRA39.icc` falls
    /// back to a synthesized GCR press profile over sRGB.
    pub fn load(self, resources: &ProfileResources) -> IccResult<ColorProfile> {
        match self {
            StandardProfile::GrayD50Gamma22 => ColorProfile::gray(2.2),
            StandardProfile::Srgb => Ok(ColorProfile::srgb()),
            StandardProfile::AdobeRgb1998 => match resources.read(self)? {
                Some(data) => ColorProfile::from_icc(&data),
                None => {
                    warn!(
                        dir = %resources.dir().display(),
                        "AdobeRGB1998.icc not bundled, synthesizing Adobe RGB (1998)"
                    );
                    adobe_rgb_1998()
                }
            },
            StandardProfile::CoatedFogra39 => match resources.read(self)? {
                Some(data) => ColorProfile::from_icc(&data),
                None => {
                    warn!(
                        dir = %resources.dir().display(),
                        "CoatedFOGRA39.icc not bundled, synthesizing a CMYK press profile"
                    );
                    synthetic_cmyk()
                }
            },
        }
    }
}

impl FromStr for StandardProfile {
    type Err = IccError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(id) = s.parse::<u8>() {
            return Self::from_id(id).ok_or_else(|| IccError::UnknownName {
                kind: "standard profile",
                name: s.to_string(),
            });
        }
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "gray" | "grey" | "gray-d50" => Ok(StandardProfile::GrayD50Gamma22),
            "srgb" => Ok(StandardProfile::Srgb),
            "adobe-rgb" | "adobergb" | "adobe-rgb-1998" => Ok(StandardProfile::AdobeRgb1998),
            "fogra39" | "coated-fogra39" => Ok(StandardProfile::CoatedFogra39),
            _ => Err(IccError::UnknownName {
                kind: "standard profile",
                name: s.to_string(),
            }),
        }
    }
}

/// Location of bundled profile data.
///
/// Resolved in order: an explicit directory, the `ICCCONV_PROFILE_DIR`
/// environment variable, then [`bundled_dir`](Self::bundled_dir).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileResources {
    dir: PathBuf,
}

impl ProfileResources {
    /// Environment variable naming the resource directory.
    pub const ENV_VAR: &'static str = "ICCCONV_PROFILE_DIR";

    /// Uses `dir` as the resource directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Uses `ICCCONV_PROFILE_DIR` if set, the bundled directory otherwise.
    pub fn from_env() -> Self {
        match std::env::var_os(Self::ENV_VAR) {
            Some(dir) if !dir.is_empty() => Self::new(dir),
            _ => Self::new(Self::bundled_dir()),
        }
    }

    /// Default resource directory, looked up at run time.
    ///
    /// Tries `resources/icc` next to the executable, then
    /// `../share/iccconv/icc` relative to it (installed layout). Falls back to
    /// the source tree's `resources/icc` for builds run from a checkout.
    pub fn bundled_dir() -> PathBuf {
        let installed = std::env::current_exe().ok().and_then(|exe| {
            let bin = exe.parent()?.to_path_buf();
            [bin.join("resources/icc"), bin.join("../share/iccconv/icc")]
                .into_iter()
                .find(|dir| dir.is_dir())
        });
        installed.unwrap_or_else(|| Path::new(env!("CARGO_MANIFEST_DIR")).join("../../resources/icc"))
    }

    /// The resource directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the bundled file for `profile`, if it needs one.
    pub fn path_for(&self, profile: StandardProfile) -> Option<PathBuf> {
        profile.resource_file().map(|name| self.dir.join(name))
    }

    /// Whether the bundled file for `profile` is present.
    pub fn has(&self, profile: StandardProfile) -> bool {
        self.path_for(profile).is_some_and(|p| p.is_file())
    }

    /// Reads the bundled file for `profile`; `None` if absent.
    fn read(&self, profile: StandardProfile) -> IccResult<Option<Vec<u8>>> {
        let Some(path) = self.path_for(profile) else {
            return Ok(None);
        };
        if !path.is_file() {
            return Ok(None);
        }
        debug!(path = %path.display(), profile = profile.name(), "Loading bundled profile");
        Ok(Some(std::fs::read(&path)?))
    }
}

impl Default for ProfileResources {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Adobe RGB (1998): D65 white, gamma 563/256.
fn adobe_rgb_1998() -> IccResult<ColorProfile> {
    let white = CIExyY { x: 0.3127, y: 0.3290, Y: 1.0 };
    let primaries = CIExyYTRIPLE {
        Red: CIExyY { x: 0.6400, y: 0.3300, Y: 1.0 },
        Green: CIExyY { x: 0.2100, y: 0.7100, Y: 1.0 },
        Blue: CIExyY { x: 0.1500, y: 0.0600, Y: 1.0 },
    };
    let curve = ToneCurve::new(563.0 / 256.0);
    let curves = [&curve, &curve, &curve];
    let inner = LcmsProfile::new_rgb(&white, &primaries, &curves)
        .map_err(|e| IccError::CreateFailed(e.to_string()))?;
    Ok(ColorProfile::from_lcms(inner))
}

#[cfg(test)]
mod tests {
    use super::*;
    use iccconv_core::ColorSpaceKind;

    fn empty_resources() -> (tempfile::TempDir, ProfileResources) {
        let dir = tempfile::tempdir().unwrap();
        let resources = ProfileResources::new(dir.path());
        (dir, resources)
    }

    #[test]
    fn test_ids() {
        for profile in StandardProfile::ALL {
            assert_eq!(StandardProfile::from_id(profile.id()), Some(profile));
            assert_eq!(profile.name().parse::<StandardProfile>().unwrap(), profile);
        }
        assert_eq!(StandardProfile::from_id(0), None);
        assert_eq!("2".parse::<StandardProfile>().unwrap(), StandardProfile::Srgb);
        assert!("9".parse::<StandardProfile>().is_err());
        assert!("prophoto".parse::<StandardProfile>().is_err());
    }

    #[test]
    fn test_builtin_profiles() {
        let (_dir, resources) = empty_resources();
        let gray = StandardProfile::GrayD50Gamma22.load(&resources).unwrap();
        assert_eq!(gray.color_space().unwrap(), ColorSpaceKind::Gray);
        let srgb = StandardProfile::Srgb.load(&resources).unwrap();
        assert_eq!(srgb.color_space().unwrap(), ColorSpaceKind::Rgb);
    }

    #[test]
    fn test_adobe_rgb_fallback() {
        let (_dir, resources) = empty_resources();
        assert!(!resources.has(StandardProfile::AdobeRgb1998));
        let adobe = StandardProfile::AdobeRgb1998.load(&resources).unwrap();
        assert_eq!(adobe.color_space().unwrap(), ColorSpaceKind::Rgb);
    }

    #[test]
    fn test_adobe_rgb_bundled_file_wins() {
        let (dir, resources) = empty_resources();
        // Any RGB profile stands in for the bundled file.
        let bytes = ColorProfile::srgb().to_icc().unwrap();
        std::fs::write(dir.path().join("AdobeRGB1998.icc"), &bytes).unwrap();

        let loaded = StandardProfile::AdobeRgb1998.load(&resources).unwrap();
        assert_eq!(
            loaded.description().unwrap(),
            ColorProfile::srgb().description().unwrap()
        );
    }

    #[test]
    fn test_fogra39_fallback() {
        let (_dir, resources) = empty_resources();
        assert!(!resources.has(StandardProfile::CoatedFogra39));
        let cmyk = StandardProfile::CoatedFogra39.load(&resources).unwrap();
        assert_eq!(cmyk.color_space().unwrap(), ColorSpaceKind::Cmyk);
        assert_eq!(cmyk.description().unwrap(), crate::cmyk::DESCRIPTION);
    }

    #[test]
    fn test_fogra39_bundled_file_wins() {
        let (dir, resources) = empty_resources();
        // The file is taken verbatim, whatever it holds.
        let bytes = ColorProfile::gray(1.8).unwrap().to_icc().unwrap();
        std::fs::write(dir.path().join("CoatedFOGRA39.icc"), &bytes).unwrap();

        let loaded = StandardProfile::CoatedFogra39.load(&resources).unwrap();
        assert_eq!(loaded.color_space().unwrap(), ColorSpaceKind::Gray);
    }

    #[test]
    fn test_bundled_dir_resolves_at_run_time() {
        let dir = ProfileResources::bundled_dir();
        assert!(dir.ends_with("resources/icc") || dir.ends_with("iccconv/icc"), "{}", dir.display());
    }
}
