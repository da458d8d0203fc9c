//! iccconv - color-managed JPEG/PNG conversion CLI

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod logging;

#[derive(Parser)]
#[command(name = "iccconv")]
#[command(author, version, about = "Convert JPEG and PNG images into an ICC destination profile")]
#[command(long_about = "
Converts JPEG and PNG images into a destination ICC profile.

Source images are interpreted with their embedded profile, an EXIF colorspace
hint, or a default profile per color model (Gray, RGB, CMYK). YCbCr and YCCK
JPEGs are decoded to RGB / CMYK before conversion.

Standard profiles: 1 gray, 2 srgb, 3 adobe-rgb, 4 fogra39

Examples:
  iccconv convert scan.jpg web.jpg                 # into sRGB
  iccconv convert print.jpg out.png -p adobe-rgb   # into Adobe RGB, PNG output
  iccconv convert cmyk.jpg gray.jpg -p gray --intent perceptual
  iccconv info photo.jpg --json
  iccconv profile monitor.icc --export copy.icc
  iccconv batch -i 'in/*.jpg' -o out -f png -p srgb
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Also write log records to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Number of threads (0 = auto)
    #[arg(short = 'j', long, global = true, default_value = "0")]
    threads: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert one image into the destination profile
    #[command(visible_alias = "c")]
    Convert(ConvertArgs),

    /// Show container, color markers and resolved pixel format
    #[command(visible_alias = "i")]
    Info(InfoArgs),

    /// Inspect or export an ICC profile
    #[command(visible_alias = "p")]
    Profile(ProfileArgs),

    /// Convert every image matching a glob pattern
    #[command(visible_alias = "b")]
    Batch(BatchArgs),
}

/// Options shared by `convert` and `batch`.
#[derive(Args, Clone, Debug, Default)]
struct TransformOpts {
    /// Destination profile: standard id/name or ICC file (default: srgb)
    #[arg(short, long)]
    profile: Option<String>,

    /// Rendering intent: perceptual, relative, saturation, absolute
    #[arg(long)]
    intent: Option<String>,

    /// Disable black-point compensation
    #[arg(long)]
    no_bpc: bool,

    /// Ignore embedded profiles and EXIF colorspace hints in source images
    #[arg(long)]
    ignore_embedded: bool,

    /// JPEG output quality (1-100)
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: Option<u8>,

    /// Default profile for grayscale sources
    #[arg(long, value_name = "ID|PATH")]
    default_gray: Option<String>,

    /// Default profile for RGB sources
    #[arg(long, value_name = "ID|PATH")]
    default_rgb: Option<String>,

    /// Default profile for CMYK sources
    #[arg(long, value_name = "ID|PATH")]
    default_cmyk: Option<String>,

    /// YAML config file; command-line options override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory with bundled profiles (AdobeRGB1998.icc, CoatedFOGRA39.icc)
    #[arg(long)]
    profile_dir: Option<PathBuf>,
}

#[derive(Args)]
struct ConvertArgs {
    /// Input image (JPEG or PNG)
    input: PathBuf,

    /// Output image (.png for PNG, anything else JPEG)
    output: PathBuf,

    #[command(flatten)]
    opts: TransformOpts,
}

#[derive(Args)]
struct InfoArgs {
    /// Input image(s)
    #[arg(required = true)]
    input: Vec<PathBuf>,

    /// Machine-readable output (JSON)
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ProfileArgs {
    /// Standard id/name or ICC file
    #[arg(required_unless_present = "list")]
    profile: Option<String>,

    /// Write the profile as ICC to this file
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// List the standard profiles
    #[arg(short, long)]
    list: bool,

    /// Directory with bundled profiles
    #[arg(long)]
    profile_dir: Option<PathBuf>,
}

#[derive(Args)]
struct BatchArgs {
    /// Input glob pattern (e.g. 'scans/*.jpg')
    #[arg(short, long)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: PathBuf,

    /// Output extension: jpg or png (default: keep input extension)
    #[arg(short, long)]
    format: Option<String>,

    #[command(flatten)]
    opts: TransformOpts,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = logging::init(cli.verbose, cli.log_file.as_deref())?;

    // Configure thread pool
    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    match cli.command {
        Commands::Convert(args) => commands::convert::run(args, cli.verbose),
        Commands::Info(args) => commands::info::run(args, cli.verbose),
        Commands::Profile(args) => commands::profile::run(args, cli.verbose),
        Commands::Batch(args) => commands::batch::run(args, cli.verbose),
    }
}
