//! # iccconv-io
//!
//! JPEG and PNG codecs for the iccconv pipeline.
//!
//! Unlike a general-purpose image loader, these codecs return samples
//! exactly as stored and leave color interpretation to the caller:
//!
//! - **JPEG** - no YCbCr/YCCK conversion on decode; Adobe APP14, EXIF
//!   `ColorSpace`, JFIF density and chunked APP2 ICC profiles are captured
//!   into [`ImageMetadata`](iccconv_core::ImageMetadata)
//! - **PNG** - palette and `tRNS` expanded, 16-bit stripped, color samples
//!   returned in reversed order (`BGR`, `ABGR`)
//!
//! # Architecture
//!
//! - [`ImageCodec`] - decode/encode seam used by the orchestrator
//! - [`FileCodec`] - default implementation, dispatching on magic bytes
//!   for input and on [`ContainerKind`](iccconv_core::ContainerKind) for output
//! - [`jpeg`] / [`png`] - format modules usable on their own
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use iccconv_io::{FileCodec, ImageCodec};
//!
//! let decoded = FileCodec.decode("scan.jpg".as_ref())?;
//! println!("{:?}", decoded.metadata);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod codec;
mod detect;
mod error;
mod exif;
mod traits;

pub mod jpeg;
pub mod png;

pub use codec::FileCodec;
pub use detect::Format;
pub use error::{IoError, IoResult};
pub use traits::{DecodedImage, EncodeRequest, ImageCodec};
