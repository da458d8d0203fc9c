//! Transformer configuration files.
//!
//! A YAML document describing the destination profile, rendering options
//! and default-profile overrides:
//!
//! ```yaml
//! destination: adobe-rgb        # standard profile name or ICC file path
//! intent: perceptual
//! black_point_compensation: true
//! use_embedded_profiles: true
//! jpeg_quality: 92
//! default_cmyk: profiles/ISOcoated_v2.icc
//! profile_dir: /usr/share/iccconv
//! ```
//!
//! Relative paths in a config file are resolved against the file's directory.

use iccconv_icc::{ColorProfile, IccResult, Intent, ProfileResources, StandardProfile, TransformFlags};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::trace;

/// Result type for config loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while loading a config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error reading the file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parse error.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Config file not found.
    #[error("config file not found: {}", .path.display())]
    NotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// A value is out of range.
    #[error("invalid config value for `{field}`: {reason}")]
    InvalidValue {
        /// Offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// Where a profile comes from: a standard identifier or an ICC file.
///
/// Serialized as a bare string; standard names win over file names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProfileSource {
    /// One of the standard profiles.
    Standard(StandardProfile),
    /// An ICC file on disk.
    File(PathBuf),
}

impl ProfileSource {
    /// Builds the profile.
    pub fn load(&self, resources: &ProfileResources) -> IccResult<ColorProfile> {
        match self {
            ProfileSource::Standard(standard) => standard.load(resources),
            ProfileSource::File(path) => ColorProfile::from_file(path),
        }
    }

    fn rebase(&mut self, base: &Path) {
        if let ProfileSource::File(path) = self {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}

impl FromStr for ProfileSource {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.parse::<StandardProfile>() {
            Ok(standard) => ProfileSource::Standard(standard),
            Err(_) => ProfileSource::File(PathBuf::from(s)),
        })
    }
}

impl Default for ProfileSource {
    fn default() -> Self {
        ProfileSource::Standard(StandardProfile::Srgb)
    }
}

/// Settings for building a [`Transformer`](crate::Transformer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformerConfig {
    /// Destination profile. Must be RGB or Gray.
    pub destination: ProfileSource,
    /// Rendering intent.
    pub intent: Intent,
    /// Black-point compensation.
    pub black_point_compensation: bool,
    /// Prefer profiles embedded in source images, then EXIF colorspace hints.
    pub use_embedded_profiles: bool,
    /// JPEG output quality, 1-100.
    pub jpeg_quality: u8,
    /// Override for the gray default.
    pub default_gray: Option<ProfileSource>,
    /// Override for the RGB default.
    pub default_rgb: Option<ProfileSource>,
    /// Override for the CMYK default.
    pub default_cmyk: Option<ProfileSource>,
    /// Directory holding bundled profile files.
    pub profile_dir: Option<PathBuf>,
}

impl Default for TransformerConfig {
    fn default() -> Self {
        Self {
            destination: ProfileSource::default(),
            intent: Intent::default(),
            black_point_compensation: true,
            use_embedded_profiles: true,
            jpeg_quality: 100,
            default_gray: None,
            default_rgb: None,
            default_cmyk: None,
            profile_dir: None,
        }
    }
}

impl TransformerConfig {
    /// Loads a config file.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        trace!(path = %path.display(), "TransformerConfig::from_file");
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_yaml_str(&content)?;
        if let Some(base) = path.parent() {
            config.rebase(base);
        }
        Ok(config)
    }

    /// Parses a YAML document. Relative paths are kept as written.
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> ConfigResult<()> {
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ConfigError::InvalidValue {
                field: "jpeg_quality",
                reason: format!("{} is outside 1-100", self.jpeg_quality),
            });
        }
        Ok(())
    }

    fn rebase(&mut self, base: &Path) {
        self.destination.rebase(base);
        for source in [&mut self.default_gray, &mut self.default_rgb, &mut self.default_cmyk]
            .into_iter()
            .flatten()
        {
            source.rebase(base);
        }
        if let Some(dir) = &mut self.profile_dir {
            if dir.is_relative() {
                *dir = base.join(&*dir);
            }
        }
    }

    /// Bundled-profile location: `profile_dir`, else the environment default.
    pub fn resources(&self) -> ProfileResources {
        match &self.profile_dir {
            Some(dir) => ProfileResources::new(dir),
            None => ProfileResources::from_env(),
        }
    }

    /// Engine flags.
    pub fn flags(&self) -> TransformFlags {
        TransformFlags {
            black_point_compensation: self.black_point_compensation,
        }
    }
}
