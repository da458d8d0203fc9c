//! EXIF colorspace lookup.
//!
//! Walks just enough of the TIFF structure inside an APP1 `Exif` segment to
//! find `ColorSpace` (0xA001) in the EXIF sub-IFD, plus the
//! interoperability index that marks uncalibrated Adobe RGB files.

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use iccconv_core::ExifColorSpace;

const TAG_EXIF_IFD: u16 = 0x8769;
const TAG_COLOR_SPACE: u16 = 0xA001;
const TAG_INTEROP_IFD: u16 = 0xA005;
const TAG_INTEROP_INDEX: u16 = 0x0001;

#[derive(Clone, Copy)]
enum Endian {
    Little,
    Big,
}

struct Tiff<'a> {
    data: &'a [u8],
    endian: Endian,
}

/// Raw IFD entry: position of its 4-byte value field.
struct Entry {
    count: u32,
    value_pos: usize,
}

impl<'a> Tiff<'a> {
    fn parse(data: &'a [u8]) -> Option<Self> {
        let endian = match data.get(0..2)? {
            b"II" => Endian::Little,
            b"MM" => Endian::Big,
            _ => return None,
        };
        let tiff = Self { data, endian };
        (tiff.u16(2)? == 42).then_some(tiff)
    }

    fn u16(&self, pos: usize) -> Option<u16> {
        let bytes = self.data.get(pos..pos + 2)?;
        Some(match self.endian {
            Endian::Little => LittleEndian::read_u16(bytes),
            Endian::Big => BigEndian::read_u16(bytes),
        })
    }

    fn u32(&self, pos: usize) -> Option<u32> {
        let bytes = self.data.get(pos..pos + 4)?;
        Some(match self.endian {
            Endian::Little => LittleEndian::read_u32(bytes),
            Endian::Big => BigEndian::read_u32(bytes),
        })
    }

    fn first_ifd(&self) -> Option<usize> {
        self.u32(4).map(|v| v as usize)
    }

    fn find(&self, ifd: usize, tag: u16) -> Option<Entry> {
        let count = self.u16(ifd)? as usize;
        (0..count).find_map(|i| {
            let pos = ifd + 2 + i * 12;
            (self.u16(pos)? == tag).then(|| Entry {
                count: self.u32(pos + 4).unwrap_or(0),
                value_pos: pos + 8,
            })
        })
    }

    fn sub_ifd(&self, ifd: usize, tag: u16) -> Option<usize> {
        let entry = self.find(ifd, tag)?;
        self.u32(entry.value_pos).map(|v| v as usize)
    }
}

/// Reads the EXIF colorspace hint from a TIFF block (the bytes after
/// `Exif\0\0`). Returns `None` if the block is malformed or has no tag.
pub(crate) fn color_space(tiff: &[u8]) -> Option<ExifColorSpace> {
    let tiff = Tiff::parse(tiff)?;
    let exif_ifd = tiff.sub_ifd(tiff.first_ifd()?, TAG_EXIF_IFD)?;
    let entry = tiff.find(exif_ifd, TAG_COLOR_SPACE)?;

    Some(match tiff.u16(entry.value_pos)? {
        1 => ExifColorSpace::Srgb,
        2 => ExifColorSpace::AdobeRgb,
        0xFFFF if interop_is_adobe_rgb(&tiff, exif_ifd) => ExifColorSpace::AdobeRgb,
        0xFFFF => ExifColorSpace::Uncalibrated,
        other => ExifColorSpace::Other(other),
    })
}

/// DCF files record Adobe RGB as uncalibrated with interoperability index `R03`.
fn interop_is_adobe_rgb(tiff: &Tiff<'_>, exif_ifd: usize) -> bool {
    let index = tiff
        .sub_ifd(exif_ifd, TAG_INTEROP_IFD)
        .and_then(|ifd| tiff.find(ifd, TAG_INTEROP_INDEX));
    match index {
        Some(entry) if entry.count <= 4 => tiff
            .data
            .get(entry.value_pos..entry.value_pos + 3)
            .is_some_and(|v| v == b"R03"),
        _ => false,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Builds a minimal TIFF block: IFD0 -> EXIF IFD with ColorSpace, and an
    /// optional interoperability IFD.
    pub(crate) fn build_tiff(big_endian: bool, color_space: u16, interop: Option<&[u8; 4]>) -> Vec<u8> {
        let put16 = |buf: &mut Vec<u8>, v: u16| {
            if big_endian {
                buf.extend_from_slice(&v.to_be_bytes())
            } else {
                buf.extend_from_slice(&v.to_le_bytes())
            }
        };
        let put32 = |buf: &mut Vec<u8>, v: u32| {
            if big_endian {
                buf.extend_from_slice(&v.to_be_bytes())
            } else {
                buf.extend_from_slice(&v.to_le_bytes())
            }
        };

        let mut buf = Vec::new();
        buf.extend_from_slice(if big_endian { b"MM" } else { b"II" });
        put16(&mut buf, 42);
        put32(&mut buf, 8);

        // IFD0 at 8: one entry, pointer to EXIF IFD at 26.
        put16(&mut buf, 1);
        put16(&mut buf, TAG_EXIF_IFD);
        put16(&mut buf, 4);
        put32(&mut buf, 1);
        put32(&mut buf, 26);
        put32(&mut buf, 0);

        // EXIF IFD at 26.
        let entries = if interop.is_some() { 2 } else { 1 };
        put16(&mut buf, entries);
        put16(&mut buf, TAG_COLOR_SPACE);
        put16(&mut buf, 3);
        put32(&mut buf, 1);
        put16(&mut buf, color_space);
        put16(&mut buf, 0);
        if interop.is_some() {
            // Interop IFD follows this one: 26 + 2 + 24 + 4 = 56.
            put16(&mut buf, TAG_INTEROP_IFD);
            put16(&mut buf, 4);
            put32(&mut buf, 1);
            put32(&mut buf, 56);
        }
        put32(&mut buf, 0);

        if let Some(index) = interop {
            put16(&mut buf, 1);
            put16(&mut buf, TAG_INTEROP_INDEX);
            put16(&mut buf, 2);
            put32(&mut buf, 4);
            buf.extend_from_slice(index);
            put32(&mut buf, 0);
        }
        buf
    }

    #[test]
    fn test_srgb_little_endian() {
        let tiff = build_tiff(false, 1, None);
        assert_eq!(color_space(&tiff), Some(ExifColorSpace::Srgb));
    }

    #[test]
    fn test_adobe_rgb_big_endian() {
        let tiff = build_tiff(true, 2, None);
        assert_eq!(color_space(&tiff), Some(ExifColorSpace::AdobeRgb));
    }

    #[test]
    fn test_uncalibrated_interop_index() {
        let tiff = build_tiff(false, 0xFFFF, Some(b"R03\0"));
        assert_eq!(color_space(&tiff), Some(ExifColorSpace::AdobeRgb));

        let tiff = build_tiff(true, 0xFFFF, Some(b"R98\0"));
        assert_eq!(color_space(&tiff), Some(ExifColorSpace::Uncalibrated));

        let tiff = build_tiff(true, 0xFFFF, None);
        assert_eq!(color_space(&tiff), Some(ExifColorSpace::Uncalibrated));
    }

    #[test]
    fn test_other_value() {
        let tiff = build_tiff(false, 7, None);
        assert_eq!(color_space(&tiff), Some(ExifColorSpace::Other(7)));
    }

    #[test]
    fn test_malformed() {
        assert_eq!(color_space(b""), None);
        assert_eq!(color_space(b"XX*\0\x08\0\0\0"), None);
        let mut tiff = build_tiff(false, 1, None);
        tiff.truncate(30);
        assert_eq!(color_space(&tiff), None);
    }
}
