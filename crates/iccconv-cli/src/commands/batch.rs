//! Batch conversion command.

use crate::BatchArgs;
use anyhow::{bail, Result};
use iccconv::Transformer;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{info, trace};

/// Runs the batch command.
///
/// Files are converted in parallel; each rayon worker builds its own
/// [`Transformer`] from the same configuration.
pub fn run(args: BatchArgs, verbose: u8) -> Result<()> {
    trace!(pattern = %args.input, "batch::run");

    let files: Vec<PathBuf> = glob::glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file())
        .collect();

    if files.is_empty() {
        bail!("No files match pattern: {}", args.input);
    }

    info!(files = files.len(), pattern = %args.input, "Starting batch conversion");
    if verbose > 0 {
        println!("Found {} files matching '{}'", files.len(), args.input);
    }

    std::fs::create_dir_all(&args.output_dir)?;

    // Fail early on a bad configuration instead of once per file.
    let config = super::load_config(&args.opts)?;
    super::build_transformer(&config)?;

    let results: Vec<(PathBuf, Result<()>)> = files
        .par_iter()
        .map_init(
            || super::build_transformer(&config),
            |transformer, input| {
                let result = match transformer {
                    Ok(t) => convert_one(t, input, &args.output_dir, args.format.as_deref(), verbose),
                    Err(e) => Err(anyhow::anyhow!("{e:#}")),
                };
                (input.clone(), result)
            },
        )
        .collect();

    let mut success = 0;
    let mut failed = 0;
    for (input, result) in results {
        match result {
            Ok(()) => success += 1,
            Err(e) => {
                failed += 1;
                eprintln!("Error: {}: {:#}", input.display(), e);
            }
        }
    }

    info!(success, failed, "Batch conversion complete");
    println!("Processed: {} success, {} failed", success, failed);

    if failed > 0 {
        bail!("{} files failed", failed);
    }
    Ok(())
}

/// `output_dir/<stem>.<ext>`, where `ext` is `format` or the input extension.
fn output_path(input: &Path, output_dir: &Path, format: Option<&str>) -> PathBuf {
    let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("output");
    let ext = format.unwrap_or_else(|| input.extension().and_then(|s| s.to_str()).unwrap_or("jpg"));
    output_dir.join(format!("{}.{}", stem, ext.trim_start_matches('.')))
}

fn convert_one(transformer: &Transformer, input: &Path, output_dir: &Path, format: Option<&str>, verbose: u8) -> Result<()> {
    let output = output_path(input, output_dir, format);
    if verbose > 0 {
        println!("Converting {} -> {}", input.display(), output.display());
    }
    transformer.transform_file(input, &output)?;
    Ok(())
}
