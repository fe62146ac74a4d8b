//! Per-type conversion between logical values and their bit layouts.
//!
//! Integral encodes wrap to the declared width (only the low `width` bits
//! reach the memory image). Float encodes follow the hardware formats:
//! `fp16` rounds to nearest-even, `bf16` keeps the top half of the f32 word
//! (truncation), `fp32` is the identity.

use crate::dtype::{DataType, Kind};
use crate::error::{DotgenError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LogicalValue {
    Int(i64),
    Float(f32),
}

impl fmt::Display for LogicalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalValue::Int(v) => write!(f, "{}", v),
            LogicalValue::Float(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for LogicalValue {
    fn from(v: i64) -> Self { LogicalValue::Int(v) }
}

impl From<f32> for LogicalValue {
    fn from(v: f32) -> Self { LogicalValue::Float(v) }
}

/// Bit pattern of one element; only the low `dtype.width()` bits are set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Encoded {
    pub bits: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HexCase {
    #[default]
    Lower,
    Upper,
}

impl HexCase {
    pub fn apply(self, s: String) -> String {
        match self {
            HexCase::Lower => s,
            HexCase::Upper => s.to_ascii_uppercase(),
        }
    }
}

fn as_integer(value: LogicalValue, dtype: DataType) -> Result<i64> {
    match value {
        LogicalValue::Int(v) => Ok(v),
        LogicalValue::Float(v) if v.is_finite() && v.fract() == 0.0 => Ok(v as i64),
        LogicalValue::Float(v) => {
            Err(DotgenError::DomainViolation { dtype: dtype.name(), value: v.to_string() })
        }
    }
}

fn as_float(value: LogicalValue) -> f32 {
    match value {
        LogicalValue::Int(v) => v as f32,
        LogicalValue::Float(v) => v,
    }
}

/// Wrapping encode: out-of-domain integers keep their low `width` bits.
pub fn encode(value: LogicalValue, dtype: DataType) -> Result<Encoded> {
    let bits = match dtype.kind() {
        Kind::Integral => (as_integer(value, dtype)? as u64 & dtype.mask() as u64) as u32,
        Kind::Float => {
            let v = as_float(value);
            match dtype {
                DataType::Fp16 => half::f16::from_f32(v).to_bits() as u32,
                DataType::Bf16 => v.to_bits() >> 16,
                _ => v.to_bits(),
            }
        }
    };
    Ok(Encoded { bits })
}

/// Like [`encode`] but rejects values the type cannot hold without wrapping
/// or overflowing to infinity.
pub fn encode_strict(value: LogicalValue, dtype: DataType) -> Result<Encoded> {
    let violation = || DotgenError::DomainViolation { dtype: dtype.name(), value: value.to_string() };
    if let Some((lo, hi)) = dtype.int_range() {
        let v = as_integer(value, dtype)?;
        if v < lo || v > hi { return Err(violation()); }
        return encode(value, dtype);
    }
    let e = encode(value, dtype)?;
    if as_float(value).is_finite() && !decode_to_f32(e, dtype).is_finite() {
        return Err(violation());
    }
    Ok(e)
}

/// Sign- or zero-extended integer held by an integral element.
pub fn decode_int(e: Encoded, dtype: DataType) -> Option<i64> {
    if !dtype.is_integral() { return None; }
    let raw = (e.bits & dtype.mask()) as i64;
    if dtype.is_signed() {
        let shift = 64 - dtype.width();
        Some((raw << shift) >> shift)
    } else {
        Some(raw)
    }
}

/// Exact widening of an element to f32.
pub fn decode_to_f32(e: Encoded, dtype: DataType) -> f32 {
    let bits = e.bits & dtype.mask();
    match dtype {
        DataType::Fp16 => half::f16::from_bits(bits as u16).to_f32(),
        DataType::Bf16 => f32::from_bits(bits << 16),
        DataType::Fp32 => f32::from_bits(bits),
        // every int2..uint8 value is exact in f32
        _ => decode_int(Encoded { bits }, dtype).unwrap_or(0) as f32,
    }
}

/// `decode_to_f32(encode(v))`: the value the accelerator actually sees.
pub fn widen(value: LogicalValue, dtype: DataType) -> Result<f32> {
    Ok(decode_to_f32(encode(value, dtype)?, dtype))
}

/// Lowercase, big-endian, always 8 characters.
pub fn f32_to_hex(v: f32) -> String { hex::encode(v.to_bits().to_be_bytes()) }

pub fn f32_from_hex(s: &str) -> Result<f32> {
    let mut buf = [0u8; 4];
    hex::decode_to_slice(s.trim(), &mut buf)
        .map_err(|e| DotgenError::InvalidHex(format!("{:?}: {}", s, e)))?;
    Ok(f32::from_bits(u32::from_be_bytes(buf)))
}

/// Native-width hex of one element, zero padded to whole bytes.
pub fn element_hex(e: Encoded, dtype: DataType) -> String {
    let bytes = (dtype.width() as usize + 7) / 8;
    let be = (e.bits & dtype.mask()).to_be_bytes();
    hex::encode(&be[4 - bytes..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_extension_at_sub_byte_widths() {
        assert_eq!(decode_int(Encoded { bits: 0b10 }, DataType::Int2), Some(-2));
        assert_eq!(decode_int(Encoded { bits: 0b01 }, DataType::Int2), Some(1));
        assert_eq!(decode_int(Encoded { bits: 0x8 }, DataType::Int4), Some(-8));
        assert_eq!(decode_int(Encoded { bits: 0xff }, DataType::Uint8), Some(255));
        assert_eq!(decode_int(Encoded { bits: 0x3c00 }, DataType::Fp16), None);
    }

    #[test]
    fn element_hex_pads_to_bytes() {
        assert_eq!(element_hex(Encoded { bits: 0x3 }, DataType::Int2), "03");
        assert_eq!(element_hex(Encoded { bits: 0x4900 }, DataType::Fp16), "4900");
        assert_eq!(element_hex(Encoded { bits: 0x3f800000 }, DataType::Fp32), "3f800000");
    }
}
