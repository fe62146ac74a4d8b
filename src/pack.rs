use crate::codec::{decode_int, decode_to_f32, element_hex, f32_to_hex, Encoded, HexCase};
use crate::dtype::DataType;
use crate::error::{DotgenError, Result};
use serde::{Deserialize, Serialize};

/// Where the zero padding goes when `count * width` is not a multiple of 8.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// The packed row is an integer rendered in whole bytes; padding bits lead.
    #[default]
    Right,
    /// First element starts at the top bit; the final byte is zero filled.
    Left,
}

/// One-element-per-line rendering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    /// Element in its own width, integers <= 8 bits as a two-digit byte.
    #[default]
    Native,
    /// Every element as its 8-digit fp32 encoding.
    Widened,
}

struct BitWriter {
    out: Vec<u8>,
    acc: u64,
    nbits: u32,
}

impl BitWriter {
    fn with_capacity(n_bytes: usize) -> Self {
        Self { out: Vec::with_capacity(n_bytes), acc: 0, nbits: 0 }
    }

    fn push(&mut self, v: u32, width: u32) {
        if width == 0 { return; }
        self.acc = (self.acc << width) | v as u64;
        self.nbits += width;
        while self.nbits >= 8 {
            self.nbits -= 8;
            self.out.push((self.acc >> self.nbits) as u8);
        }
        self.acc &= (1u64 << self.nbits) - 1;
    }
}

fn width_mask(width: u32) -> u32 {
    if width >= 32 { u32::MAX } else { (1u32 << width) - 1 }
}

pub fn packed_len_bytes(count: usize, width: u32) -> usize { (count * width as usize + 7) / 8 }

/// Concatenate elements MSB-first into big-endian bytes.
pub fn pack_bytes(elements: &[Encoded], width: u32, align: Alignment) -> Vec<u8> {
    let width = width.min(32);
    let n_bytes = packed_len_bytes(elements.len(), width);
    let pad = (n_bytes * 8 - elements.len() * width as usize) as u32;
    let mask = width_mask(width);
    let mut w = BitWriter::with_capacity(n_bytes);
    if align == Alignment::Right { w.push(0, pad); }
    for e in elements { w.push(e.bits & mask, width); }
    if align == Alignment::Left { w.push(0, pad); }
    w.out
}

/// Dense packed row as lowercase hex, right aligned.
pub fn pack(elements: &[Encoded], width: u32) -> String {
    hex::encode(pack_bytes(elements, width, Alignment::Right))
}

pub fn pack_with(elements: &[Encoded], width: u32, align: Alignment, case: HexCase) -> String {
    case.apply(hex::encode(pack_bytes(elements, width, align)))
}

/// Inverse of [`pack_with`]; `align` must match the one the row was packed with.
pub fn unpack(packed: &str, width: u32, count: usize, align: Alignment) -> Result<Vec<Encoded>> {
    let bytes = hex::decode(packed.trim()).map_err(|e| DotgenError::InvalidHex(e.to_string()))?;
    let width = width.min(32);
    let expected = packed_len_bytes(count, width);
    if bytes.len() != expected {
        return Err(DotgenError::InvalidHex(format!(
            "expected {} bytes for {} x {}-bit elements, got {}",
            expected, count, width, bytes.len()
        )));
    }
    let pad = (expected * 8 - count * width as usize) as u32;
    let mask = width_mask(width) as u64;
    let mut it = bytes.iter();
    let (mut acc, mut nbits) = (0u64, 0u32);
    // left-aligned rows keep their pad in the low bits of the last byte, never read
    if align == Alignment::Right && pad > 0 {
        if let Some(&b) = it.next() {
            acc = (b as u64) & ((1u64 << (8 - pad)) - 1);
            nbits = 8 - pad;
        }
    }
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        while nbits < width {
            let b = it.next().copied().unwrap_or(0);
            acc = (acc << 8) | b as u64;
            nbits += 8;
        }
        nbits -= width;
        out.push(Encoded { bits: ((acc >> nbits) & mask) as u32 });
        acc &= (1u64 << nbits) - 1;
    }
    Ok(out)
}

/// One hex string per element, for the unpacked `.mem` layout.
pub fn render_lines(
    elements: &[Encoded],
    dtype: DataType,
    style: LineStyle,
    case: HexCase,
) -> Vec<String> {
    elements
        .iter()
        .map(|&e| {
            let s = match style {
                LineStyle::Widened => f32_to_hex(decode_to_f32(e, dtype)),
                LineStyle::Native => match decode_int(e, dtype) {
                    Some(v) => format!("{:02x}", v & 0xff),
                    None => element_hex(e, dtype),
                },
            };
            case.apply(s)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_writer_carries_across_bytes() {
        let mut w = BitWriter::with_capacity(2);
        w.push(0b101, 3);
        w.push(0b11111, 5);
        w.push(0xab, 8);
        assert_eq!(w.out, vec![0b1011_1111, 0xab]);
        assert_eq!(w.nbits, 0);
    }
}
