//! Profile inspection command.

use crate::ProfileArgs;
use anyhow::{Context, Result};
use iccconv::{ProfileSource, StandardProfile};
use tracing::trace;

/// Runs the profile command.
pub fn run(args: ProfileArgs, verbose: u8) -> Result<()> {
    let resources = super::resources(args.profile_dir.as_deref());

    if args.list {
        println!("Standard profiles ({}):", resources.dir().display());
        for standard in StandardProfile::ALL {
            let status = match standard.resource_file() {
                None => "built in",
                Some(_) if resources.has(standard) => "bundled",
                Some(_) => "synthesized",
            };
            println!("  {}  {:<10} {}", standard.id(), standard.name(), status);
        }
        if args.profile.is_none() {
            return Ok(());
        }
    }

    let Some(name) = args.profile.as_deref() else {
        return Ok(());
    };
    trace!(profile = name, "profile::run");

    let source = super::profile_source(name);
    let profile = source
        .load(&resources)
        .with_context(|| format!("Failed to load profile: {name}"))?;
    let icc = profile.to_icc()?;

    println!("{}", name);
    println!("  Description: {}", profile.description()?);
    println!("  Colorspace:  {}", profile.color_space()?);
    println!("  Size:        {} bytes", icc.len());
    if verbose > 0 {
        match &source {
            ProfileSource::Standard(standard) => println!("  Standard:    {} ({})", standard.name(), standard.id()),
            ProfileSource::File(path) => println!("  File:        {}", path.display()),
        }
    }

    if let Some(export) = &args.export {
        std::fs::write(export, &icc).with_context(|| format!("Failed to write {}", export.display()))?;
        println!("Exported to {}", export.display());
    }
    Ok(())
}
