//! # iccconv-core
//!
//! Core types shared by the iccconv crates.
//!
//! - [`RasterBuffer`] - Interleaved 8-bit pixel buffer
//! - [`ImageMetadata`], [`Container`], [`JpegMarkers`] - Decoded container facts
//! - [`PixelFormat`], [`ColorSpaceKind`] - Pixel layouts understood by the color engine
//! - [`Error`], [`Result`] - Unified error type for the transform pipeline
//!
//! ## Crate Structure
//!
//! ```text
//! iccconv-core (this crate)
//!    ^
//!    |
//!    +-- iccconv-icc (profiles, transform sessions)
//!    +-- iccconv-io (JPEG / PNG codec)
//!    +-- iccconv (resolver, preprocessor, orchestrator)
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod metadata;
pub mod pixel;
pub mod raster;

pub use error::*;
pub use metadata::{AdobeTransform, Container, ContainerKind, ExifColorSpace, ImageMetadata, JpegMarkers};
pub use pixel::{ColorSpaceKind, PixelFormat};
pub use raster::RasterBuffer;
