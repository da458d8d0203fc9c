//! CLI command implementations

pub mod batch;
pub mod convert;
pub mod info;
pub mod profile;

use crate::TransformOpts;
use anyhow::{Context, Result};
use iccconv::{Intent, ProfileResources, ProfileSource, Transformer, TransformerConfig};
use std::path::Path;
use tracing::debug;

/// Parses `ID|PATH` into a profile source.
pub fn profile_source(value: &str) -> ProfileSource {
    match value.parse::<ProfileSource>() {
        Ok(source) => source,
        Err(never) => match never {},
    }
}

/// Bundled-profile location from an optional `--profile-dir`.
pub fn resources(profile_dir: Option<&Path>) -> ProfileResources {
    match profile_dir {
        Some(dir) => ProfileResources::new(dir),
        None => ProfileResources::from_env(),
    }
}

/// Merges `--config` with command-line overrides.
pub fn load_config(opts: &TransformOpts) -> Result<TransformerConfig> {
    let mut config = match &opts.config {
        Some(path) => TransformerConfig::from_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => TransformerConfig::default(),
    };

    if let Some(profile) = &opts.profile {
        config.destination = profile_source(profile);
    }
    if let Some(intent) = &opts.intent {
        config.intent = intent
            .parse::<Intent>()
            .with_context(|| format!("Invalid --intent: {intent}"))?;
    }
    if opts.no_bpc {
        config.black_point_compensation = false;
    }
    if opts.ignore_embedded {
        config.use_embedded_profiles = false;
    }
    if let Some(quality) = opts.quality {
        config.jpeg_quality = quality;
    }
    if let Some(gray) = &opts.default_gray {
        config.default_gray = Some(profile_source(gray));
    }
    if let Some(rgb) = &opts.default_rgb {
        config.default_rgb = Some(profile_source(rgb));
    }
    if let Some(cmyk) = &opts.default_cmyk {
        config.default_cmyk = Some(profile_source(cmyk));
    }
    if let Some(dir) = &opts.profile_dir {
        config.profile_dir = Some(dir.clone());
    }

    debug!(?config, "Effective configuration");
    Ok(config)
}

/// Builds a transformer from the merged configuration.
pub fn build_transformer(config: &TransformerConfig) -> Result<Transformer> {
    Transformer::from_config(config).context("Failed to set up color transform")
}

#[cfg(test)]
mod tests {
    use super::*;
    use iccconv::StandardProfile;
    use std::path::PathBuf;

    #[test]
    fn test_overrides() {
        let opts = TransformOpts {
            profile: Some("adobe-rgb".into()),
            intent: Some("perceptual".into()),
            no_bpc: true,
            ignore_embedded: true,
            quality: Some(75),
            default_cmyk: Some("press.icc".into()),
            ..Default::default()
        };
        let config = load_config(&opts).unwrap();
        assert_eq!(config.destination, ProfileSource::Standard(StandardProfile::AdobeRgb1998));
        assert_eq!(config.intent, Intent::Perceptual);
        assert!(!config.black_point_compensation);
        assert!(!config.use_embedded_profiles);
        assert_eq!(config.jpeg_quality, 75);
        assert_eq!(config.default_cmyk, Some(ProfileSource::File(PathBuf::from("press.icc"))));
    }

    #[test]
    fn test_bad_intent() {
        let opts = TransformOpts {
            intent: Some("vivid".into()),
            ..Default::default()
        };
        assert!(load_config(&opts).is_err());
    }

    #[test]
    fn test_config_file_then_flags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("iccconv.yaml");
        std::fs::write(&path, "destination: gray\njpeg_quality: 50\n").unwrap();

        let opts = TransformOpts {
            config: Some(path),
            quality: Some(95),
            ..Default::default()
        };
        let config = load_config(&opts).unwrap();
        assert_eq!(config.destination, ProfileSource::Standard(StandardProfile::GrayD50Gamma22));
        assert_eq!(config.jpeg_quality, 95);
    }
}
