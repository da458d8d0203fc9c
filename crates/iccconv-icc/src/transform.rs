//! Transform sessions between two ICC profiles.

use crate::format::lcms_format;
use crate::{ColorProfile, IccError, IccResult, Intent, TransformFlags};
use iccconv_core::PixelFormat;
use lcms2::Transform as LcmsTransform;
use tracing::{debug, trace};

/// Everything a [`TransformSession`] is built from.
///
/// Borrowed and immutable: the session copies what it needs from the
/// profiles and does not keep them borrowed afterwards.
#[derive(Debug, Clone, Copy)]
pub struct TransformContext<'a> {
    /// Profile the input pixels are encoded in.
    pub source: &'a ColorProfile,
    /// Layout of the input pixels.
    pub source_format: PixelFormat,
    /// Profile to convert into.
    pub destination: &'a ColorProfile,
    /// Layout of the output pixels.
    pub destination_format: PixelFormat,
    /// Rendering intent.
    pub intent: Intent,
    /// Engine flags.
    pub flags: TransformFlags,
}

/// A prepared conversion between two profiles and two 8-bit layouts.
///
/// Each [`transform`](Self::transform) call is independent, so a session can
/// be driven a scanline at a time or over a whole image at once.
///
/// # Example
///
/// ```rust
/// use iccconv_core::PixelFormat;
/// use iccconv_icc::{ColorProfile, Intent, TransformContext, TransformFlags, TransformSession};
///
/// let srgb = ColorProfile::srgb();
/// let session = TransformSession::new(&TransformContext {
///     source: &srgb,
///     source_format: PixelFormat::Rgb8,
///     destination: &srgb,
///     destination_format: PixelFormat::Bgr8,
///     intent: Intent::RelativeColorimetric,
///     flags: TransformFlags::NONE,
/// })
/// .unwrap();
///
/// let mut bgr = [0u8; 3];
/// session.transform(&[255, 0, 0], &mut bgr, 1).unwrap();
/// assert!(bgr[2] > 250 && bgr[0] < 5);
/// ```
pub struct TransformSession {
    inner: Option<LcmsTransform<u8, u8>>,
    source_format: PixelFormat,
    destination_format: PixelFormat,
}

impl TransformSession {
    /// Builds a session.
    ///
    /// # Errors
    ///
    /// [`IccError::TransformFailed`] if the engine refuses the combination
    /// (for example a CMYK layout paired with an RGB profile), or
    /// [`IccError::Released`] if either profile was disposed.
    pub fn new(context: &TransformContext<'_>) -> IccResult<Self> {
        trace!(
            source_format = %context.source_format,
            destination_format = %context.destination_format,
            intent = ?context.intent,
            bpc = context.flags.black_point_compensation,
            "TransformSession::new"
        );
        let inner = LcmsTransform::new_flags(
            context.source.lcms()?,
            lcms_format(context.source_format),
            context.destination.lcms()?,
            lcms_format(context.destination_format),
            context.intent.into(),
            context.flags.to_lcms(),
        )
        .map_err(|e| {
            IccError::TransformFailed(format!(
                "{} -> {}: {}",
                context.source_format, context.destination_format, e
            ))
        })?;

        debug!(
            source_format = %context.source_format,
            destination_format = %context.destination_format,
            "Transform session ready"
        );
        Ok(Self {
            inner: Some(inner),
            source_format: context.source_format,
            destination_format: context.destination_format,
        })
    }

    /// Input layout.
    pub fn source_format(&self) -> PixelFormat {
        self.source_format
    }

    /// Output layout.
    pub fn destination_format(&self) -> PixelFormat {
        self.destination_format
    }

    /// Converts `pixel_count` pixels from `input` into `output`.
    ///
    /// Reads `pixel_count * source bands` bytes and writes
    /// `pixel_count * destination bands` bytes; bytes past those ranges are
    /// left untouched.
    ///
    /// # Errors
    ///
    /// [`IccError::TransformFailed`] if either buffer is too short,
    /// [`IccError::Released`] after [`dispose`](Self::dispose).
    pub fn transform(&self, input: &[u8], output: &mut [u8], pixel_count: usize) -> IccResult<()> {
        let inner = self.inner.as_ref().ok_or(IccError::Released("transform session"))?;

        let in_len = pixel_count * self.source_format.bands() as usize;
        let out_len = pixel_count * self.destination_format.bands() as usize;
        if input.len() < in_len || output.len() < out_len {
            return Err(IccError::TransformFailed(format!(
                "{} pixels need {} input / {} output bytes, got {} / {}",
                pixel_count,
                in_len,
                out_len,
                input.len(),
                output.len()
            )));
        }
        if pixel_count == 0 {
            return Ok(());
        }

        inner.transform_pixels(&input[..in_len], &mut output[..out_len]);
        Ok(())
    }

    /// Releases the engine transform now. Calling it again does nothing.
    pub fn dispose(&mut self) {
        if self.inner.take().is_some() {
            trace!("TransformSession::dispose");
        }
    }

    /// Whether [`dispose`](Self::dispose) has run.
    pub fn is_disposed(&self) -> bool {
        self.inner.is_none()
    }
}

impl std::fmt::Debug for TransformSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformSession")
            .field("source_format", &self.source_format)
            .field("destination_format", &self.destination_format)
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
