//! Single-image conversion command.

use crate::ConvertArgs;
use anyhow::{Context, Result};
use tracing::{info, trace};

/// Runs the convert command.
pub fn run(args: ConvertArgs, verbose: u8) -> Result<()> {
    trace!(input = %args.input.display(), output = %args.output.display(), "convert::run");

    let config = super::load_config(&args.opts)?;
    let transformer = super::build_transformer(&config)?;
    let destination = transformer.destination().description().unwrap_or_default();

    info!(
        input = %args.input.display(),
        output = %args.output.display(),
        destination = %destination,
        intent = ?transformer.intent(),
        "Converting image"
    );

    if verbose > 0 {
        println!(
            "Converting {} -> {} ({})",
            args.input.display(),
            args.output.display(),
            destination
        );
    }

    transformer
        .transform_file(&args.input, &args.output)
        .with_context(|| format!("Failed to convert {}", args.input.display()))?;

    if verbose > 0 {
        println!("Done.");
    }

    Ok(())
}
