//! Image info command.
//!
//! Shows what the converter would see: container, color markers, embedded
//! profile and the pixel format the image resolves to.

use crate::InfoArgs;
use anyhow::{Context, Result};
use iccconv::{resolve, ColorProfile};
use iccconv_core::{AdobeTransform, ExifColorSpace, ImageMetadata};
use iccconv_io::{FileCodec, ImageCodec};
use std::path::Path;
use tracing::trace;

/// Facts gathered for one file.
struct ImageInfo {
    width: u32,
    height: u32,
    metadata: ImageMetadata,
    embedded: Option<Result<(String, String), String>>,
    resolved: Result<String, String>,
}

/// Runs the info command.
pub fn run(args: InfoArgs, verbose: u8) -> Result<()> {
    let mut reports = Vec::new();
    for path in &args.input {
        trace!(path = %path.display(), "info::run");
        let info = inspect(path)?;
        if args.json {
            reports.push(to_json(path, &info));
        } else {
            print_text(path, &info, verbose);
            if args.input.len() > 1 {
                println!();
            }
        }
    }

    if args.json {
        let value = match reports.len() {
            1 => reports.remove(0),
            _ => serde_json::Value::Array(reports),
        };
        println!("{}", serde_json::to_string_pretty(&value)?);
    }
    Ok(())
}

fn inspect(path: &Path) -> Result<ImageInfo> {
    let decoded = FileCodec
        .decode(path)
        .with_context(|| format!("Failed to load: {}", path.display()))?;
    let metadata = decoded.metadata;

    let embedded = metadata.icc_profile.as_deref().map(|icc| {
        ColorProfile::from_icc(icc)
            .and_then(|p| Ok((p.description()?, p.color_space()?.to_string())))
            .map_err(|e| e.to_string())
    });
    let resolved = resolve(metadata.bands, &metadata.container, metadata.indexed)
        .map(|r| format!("{} ({:?}, {} slot)", r.format, r.preprocess, r.slot))
        .map_err(|e| e.to_string());

    Ok(ImageInfo {
        width: decoded.raster.width(),
        height: decoded.raster.height(),
        metadata,
        embedded,
        resolved,
    })
}

fn adobe_name(adobe: Option<AdobeTransform>) -> &'static str {
    match adobe {
        None => "none",
        Some(AdobeTransform::Unknown) => "unknown",
        Some(AdobeTransform::YCbCr) => "YCbCr",
        Some(AdobeTransform::Ycck) => "YCCK",
    }
}

fn exif_name(exif: Option<ExifColorSpace>) -> String {
    match exif {
        None => "none".into(),
        Some(ExifColorSpace::Srgb) => "sRGB".into(),
        Some(ExifColorSpace::AdobeRgb) => "Adobe RGB".into(),
        Some(ExifColorSpace::Uncalibrated) => "uncalibrated".into(),
        Some(ExifColorSpace::Other(v)) => format!("0x{v:04X}"),
    }
}

/// Prints info in human-readable text format.
fn print_text(path: &Path, info: &ImageInfo, verbose: u8) {
    let m = &info.metadata;
    println!("{}", path.display());
    println!("  Container:  {}", m.container.kind());
    println!("  Resolution: {}x{}", info.width, info.height);
    println!("  Bands:      {}", m.bands);
    if m.transparent {
        println!("  Alpha:      yes");
    }
    if m.indexed {
        println!("  Indexed:    yes");
    }
    if let Some(dpi) = m.dpi {
        println!("  DPI:        {:.1}", dpi);
    }
    if let Some(markers) = m.container.jpeg_markers() {
        println!("  APP14:      {}", adobe_name(markers.adobe));
        println!("  EXIF space: {}", exif_name(markers.exif_color_space));
    }
    match &info.embedded {
        None => println!("  Profile:    none"),
        Some(Ok((description, space))) => println!("  Profile:    {} ({})", description, space),
        Some(Err(e)) => println!("  Profile:    invalid ({})", e),
    }
    match &info.resolved {
        Ok(format) => println!("  Format:     {}", format),
        Err(e) => println!("  Format:     unsupported ({})", e),
    }
    if verbose > 0 {
        if let Some(icc) = &m.icc_profile {
            println!("  ICC bytes:  {}", icc.len());
        }
    }
}

fn to_json(path: &Path, info: &ImageInfo) -> serde_json::Value {
    let m = &info.metadata;
    let markers = m.container.jpeg_markers();
    serde_json::json!({
        "path": path.display().to_string(),
        "container": m.container.kind().to_string(),
        "width": info.width,
        "height": info.height,
        "bands": m.bands,
        "transparent": m.transparent,
        "indexed": m.indexed,
        "dpi": m.dpi,
        "adobe_transform": markers.map(|mk| adobe_name(mk.adobe)),
        "exif_color_space": markers.map(|mk| exif_name(mk.exif_color_space)),
        "profile": match &info.embedded {
            None => serde_json::Value::Null,
            Some(Ok((description, space))) => serde_json::json!({
                "description": description,
                "color_space": space,
                "bytes": m.icc_profile.as_ref().map_or(0, |p| p.len()),
            }),
            Some(Err(e)) => serde_json::json!({ "error": e }),
        },
        "pixel_format": info.resolved.as_ref().ok(),
        "error": info.resolved.as_ref().err(),
    })
}
