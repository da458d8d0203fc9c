//! # iccconv
//!
//! Color-managed conversion of JPEG and PNG rasters into one destination
//! ICC profile.
//!
//! A conversion runs through these stages:
//!
//! 1. [`resolve`] - pick the engine pixel layout, preprocessing and default
//!    profile slot from the band count and container markers
//! 2. [`preprocess`] - convert raw JPEG YCbCr / YCCK samples in place
//! 3. [`resolve_input_profile`] - embedded profile, EXIF hint or default
//! 4. [`TransformSession`](iccconv_icc::TransformSession) - Little CMS
//!    conversion, one scanline at a time
//! 5. alpha carried over when the output layout has an alpha byte
//!
//! [`Transformer`] wires the stages together and adds file decoding and
//! encoding through an [`ImageCodec`](iccconv_io::ImageCodec).
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use iccconv::{Transformer, TransformerConfig};
//!
//! let config = TransformerConfig::from_file("iccconv.yaml")?;
//! let transformer = Transformer::from_config(&config)?;
//! transformer.transform_file("cmyk.jpg".as_ref(), "web.jpg".as_ref())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod policy;
pub mod preprocess;
pub mod resolver;

mod orchestrator;

pub use config::{ConfigError, ConfigResult, ProfileSource, TransformerConfig};
pub use orchestrator::{transform_raster, TransformedRaster, Transformer};
pub use policy::{resolve_input_profile, DefaultProfiles, ResolvedProfile};
pub use resolver::{resolve, Preprocess, ProfileSlot, Resolution};

pub use iccconv_core::{Error, Result};
pub use iccconv_icc::{ColorProfile, Intent, ProfileResources, StandardProfile, TransformFlags};
