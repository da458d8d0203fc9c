//! Synthesized CMYK press profile.
//!
//! Stands in for Coated FOGRA39 when that profile is not bundled. The device
//! model is plain gray-component replacement over sRGB:
//! `R = (1 - C)(1 - K)` and likewise for G/B, with full GCR on the way back
//! (`K = 1 - max(R, G, B)`). Paper white maps to D50 white and full black ink
//! to L* = 0, so neutral extremes survive any round trip through it.
//!
//! The profile is serialized as ICC v4.3 output (`prtr`) bytes with `lut16`
//! A2B0/B2A0 tags over a Lab connection space, then parsed by Little CMS like
//! any other profile.

use crate::{ColorProfile, IccResult};

/// Description tag of the synthesized profile.
pub(crate) const DESCRIPTION: &str = "iccconv synthetic CMYK (GCR over sRGB)";

/// Grid points per input channel of the CMYK -> Lab table.
const A2B_GRID: usize = 9;
/// Grid points per input channel of the Lab -> CMYK table.
const B2A_GRID: usize = 17;

/// D50 white in XYZ, normalized to Y = 1.
const D50: [f64; 3] = [0.9642, 1.0, 0.8249];

/// Linear sRGB to XYZ, Bradford-adapted to D50.
const SRGB_TO_XYZ: [[f64; 3]; 3] = [
    [0.4360747, 0.3850649, 0.1430804],
    [0.2225045, 0.7168786, 0.0606169],
    [0.0139322, 0.0971045, 0.7141733],
];

/// Inverse of [`SRGB_TO_XYZ`].
const XYZ_TO_SRGB: [[f64; 3]; 3] = [
    [3.1338561, -1.6168667, -0.4906146],
    [-0.9787684, 1.9161415, 0.0334540],
    [0.0719453, -0.2289914, 1.4052427],
];

/// Builds the synthesized profile.
pub(crate) fn synthetic_cmyk() -> IccResult<ColorProfile> {
    ColorProfile::from_icc(&synthetic_cmyk_icc())
}

/// Serializes the synthesized profile.
pub(crate) fn synthetic_cmyk_icc() -> Vec<u8> {
    let mut tags = TagTable::default();
    tags.push(*b"desc", mluc(DESCRIPTION));
    tags.push(*b"cprt", mluc("No copyright, use freely"));
    tags.push(*b"wtpt", xyz(D50));
    tags.push(*b"A2B0", lut16(4, 3, A2B_GRID, cmyk_to_lab_encoded));
    tags.push(*b"B2A0", lut16(3, 4, B2A_GRID, lab_encoded_to_cmyk));
    tags.into_profile()
}

// ============================================================================
// Device model
// ============================================================================

fn srgb_to_linear(v: f64) -> f64 {
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_to_srgb(v: f64) -> f64 {
    if v <= 0.0031308 {
        v * 12.92
    } else {
        1.055 * v.powf(1.0 / 2.4) - 0.055
    }
}

fn mul(m: &[[f64; 3]; 3], v: [f64; 3]) -> [f64; 3] {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}

const DELTA: f64 = 6.0 / 29.0;

fn lab_f(t: f64) -> f64 {
    if t > DELTA * DELTA * DELTA {
        t.cbrt()
    } else {
        t / (3.0 * DELTA * DELTA) + 4.0 / 29.0
    }
}

fn lab_f_inv(u: f64) -> f64 {
    if u > DELTA {
        u * u * u
    } else {
        3.0 * DELTA * DELTA * (u - 4.0 / 29.0)
    }
}

/// CMYK ink fractions to CIE Lab (D50).
fn cmyk_to_lab(cmyk: [f64; 4]) -> [f64; 3] {
    let [c, m, y, k] = cmyk;
    let rgb = [(1.0 - c) * (1.0 - k), (1.0 - m) * (1.0 - k), (1.0 - y) * (1.0 - k)];
    let xyz = mul(&SRGB_TO_XYZ, rgb.map(srgb_to_linear));
    let [fx, fy, fz] = [xyz[0] / D50[0], xyz[1] / D50[1], xyz[2] / D50[2]].map(lab_f);
    [116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz)]
}

/// CIE Lab (D50) to CMYK ink fractions, full GCR.
fn lab_to_cmyk(lab: [f64; 3]) -> [f64; 4] {
    let [l, a, b] = lab;
    let fy = (l + 16.0) / 116.0;
    let fx = fy + a / 500.0;
    let fz = fy - b / 200.0;
    let xyz = [
        D50[0] * lab_f_inv(fx),
        D50[1] * lab_f_inv(fy),
        D50[2] * lab_f_inv(fz),
    ];
    let rgb = mul(&XYZ_TO_SRGB, xyz).map(|v| linear_to_srgb(v.clamp(0.0, 1.0)));

    let k = 1.0 - rgb[0].max(rgb[1]).max(rgb[2]);
    if k >= 1.0 - 1e-9 {
        return [0.0, 0.0, 0.0, 1.0];
    }
    let ink = |v: f64| ((1.0 - v - k) / (1.0 - k)).clamp(0.0, 1.0);
    [ink(rgb[0]), ink(rgb[1]), ink(rgb[2]), k]
}

// `lut16` tags carry Lab in the legacy 16-bit encoding: L* 100 at 0xFF00,
// a*/b* 0 at 0x8000.

fn encode_lab(lab: [f64; 3]) -> [u16; 3] {
    let clamp = |v: f64| v.round().clamp(0.0, 65535.0) as u16;
    [
        clamp(lab[0] / 100.0 * 65280.0),
        clamp((lab[1] + 128.0) * 256.0),
        clamp((lab[2] + 128.0) * 256.0),
    ]
}

fn decode_lab(enc: [f64; 3]) -> [f64; 3] {
    [enc[0] / 65280.0 * 100.0, enc[1] / 256.0 - 128.0, enc[2] / 256.0 - 128.0]
}

/// Grid node values in 0..=1 to encoded Lab.
fn cmyk_to_lab_encoded(node: &[f64]) -> Vec<u16> {
    encode_lab(cmyk_to_lab([node[0], node[1], node[2], node[3]])).to_vec()
}

/// Grid node values in 0..=1 (encoded Lab) to 16-bit ink.
fn lab_encoded_to_cmyk(node: &[f64]) -> Vec<u16> {
    let lab = decode_lab([node[0] * 65535.0, node[1] * 65535.0, node[2] * 65535.0]);
    lab_to_cmyk(lab)
        .iter()
        .map(|v| (v * 65535.0).round() as u16)
        .collect()
}

// ============================================================================
// ICC serialization
// ============================================================================

#[derive(Default)]
struct TagTable {
    entries: Vec<([u8; 4], Vec<u8>)>,
}

impl TagTable {
    fn push(&mut self, signature: [u8; 4], data: Vec<u8>) {
        self.entries.push((signature, data));
    }

    /// Header, tag table and 4-byte aligned tag data.
    fn into_profile(self) -> Vec<u8> {
        let table_len = 4 + 12 * self.entries.len();
        let mut offset = 128 + table_len;

        let mut table = Vec::with_capacity(table_len);
        table.extend_from_slice(&(self.entries.len() as u32).to_be_bytes());
        let mut body = Vec::new();
        for (signature, data) in &self.entries {
            table.extend_from_slice(signature);
            table.extend_from_slice(&(offset as u32).to_be_bytes());
            table.extend_from_slice(&(data.len() as u32).to_be_bytes());
            body.extend_from_slice(data);
            body.resize(body.len().next_multiple_of(4), 0);
            offset = 128 + table_len + body.len();
        }

        let mut profile = header();
        profile.extend_from_slice(&table);
        profile.extend_from_slice(&body);
        let size = profile.len() as u32;
        profile[0..4].copy_from_slice(&size.to_be_bytes());
        profile
    }
}

fn header() -> Vec<u8> {
    let mut h = vec![0u8; 128];
    h[8..12].copy_from_slice(&0x0430_0000u32.to_be_bytes());
    h[12..16].copy_from_slice(b"prtr");
    h[16..20].copy_from_slice(b"CMYK");
    h[20..24].copy_from_slice(b"Lab ");
    for (i, v) in [2024u16, 1, 1, 0, 0, 0].into_iter().enumerate() {
        h[24 + 2 * i..26 + 2 * i].copy_from_slice(&v.to_be_bytes());
    }
    h[36..40].copy_from_slice(b"acsp");
    for (i, v) in D50.into_iter().enumerate() {
        h[68 + 4 * i..72 + 4 * i].copy_from_slice(&s15_fixed16(v).to_be_bytes());
    }
    h
}

fn s15_fixed16(v: f64) -> i32 {
    (v * 65536.0).round() as i32
}

/// `mluc` with a single en-US record. `text` must be ASCII.
fn mluc(text: &str) -> Vec<u8> {
    let mut tag = b"mluc".to_vec();
    tag.extend_from_slice(&0u32.to_be_bytes());
    tag.extend_from_slice(&1u32.to_be_bytes());
    tag.extend_from_slice(&12u32.to_be_bytes());
    tag.extend_from_slice(b"enUS");
    tag.extend_from_slice(&((text.len() * 2) as u32).to_be_bytes());
    tag.extend_from_slice(&28u32.to_be_bytes());
    for b in text.bytes() {
        tag.extend_from_slice(&[0, b]);
    }
    tag
}

fn xyz(v: [f64; 3]) -> Vec<u8> {
    let mut tag = b"XYZ ".to_vec();
    tag.extend_from_slice(&0u32.to_be_bytes());
    for c in v {
        tag.extend_from_slice(&s15_fixed16(c).to_be_bytes());
    }
    tag
}

/// `lut16` tag with identity matrix and linear 2-entry input/output curves.
///
/// `sample` receives one grid node (each input in 0..=1, first channel
/// varying slowest) and returns `outputs` 16-bit values.
fn lut16(inputs: usize, outputs: usize, grid: usize, sample: fn(&[f64]) -> Vec<u16>) -> Vec<u8> {
    let mut tag = b"mft2".to_vec();
    tag.extend_from_slice(&0u32.to_be_bytes());
    tag.extend_from_slice(&[inputs as u8, outputs as u8, grid as u8, 0]);
    for row in 0..3 {
        for col in 0..3 {
            let v = if row == col { 1.0 } else { 0.0 };
            tag.extend_from_slice(&s15_fixed16(v).to_be_bytes());
        }
    }
    tag.extend_from_slice(&2u16.to_be_bytes());
    tag.extend_from_slice(&2u16.to_be_bytes());

    let linear_curves = |tag: &mut Vec<u8>, channels: usize| {
        for _ in 0..channels {
            tag.extend_from_slice(&0u16.to_be_bytes());
            tag.extend_from_slice(&u16::MAX.to_be_bytes());
        }
    };

    linear_curves(&mut tag, inputs);
    let nodes = grid.pow(inputs as u32);
    let mut node = vec![0.0; inputs];
    for index in 0..nodes {
        let mut rest = index;
        for ch in (0..inputs).rev() {
            node[ch] = (rest % grid) as f64 / (grid - 1) as f64;
            rest /= grid;
        }
        for v in sample(&node) {
            tag.extend_from_slice(&v.to_be_bytes());
        }
    }
    linear_curves(&mut tag, outputs);
    tag
}
