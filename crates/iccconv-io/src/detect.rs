//! Container sniffing from magic bytes.

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
const JPEG_SOI: [u8; 3] = [0xFF, 0xD8, 0xFF];

/// Containers the codec can decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// PNG format.
    Png,
    /// JPEG format.
    Jpeg,
    /// Anything else.
    Unknown,
}

impl Format {
    /// Identifies the container from the leading bytes of an image.
    ///
    /// File extensions are never consulted: a mislabeled file decodes as
    /// what it actually is.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        if bytes.starts_with(&PNG_SIGNATURE) {
            Format::Png
        } else if bytes.starts_with(&JPEG_SOI) {
            Format::Jpeg
        } else {
            Format::Unknown
        }
    }
}
