use crate::error::DotgenError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    Integral,
    Float,
}

/// Element formats understood by the accelerator, plus the canonical
/// `fp32` form used for reference results and float x-vectors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Int2,
    Int4,
    Int8,
    Uint8,
    Fp16,
    Bf16,
    Fp32,
}

impl DataType {
    /// The six hardware operand formats (excludes `Fp32`).
    pub const OPERANDS: [DataType; 6] = [
        DataType::Int2,
        DataType::Int4,
        DataType::Int8,
        DataType::Uint8,
        DataType::Fp16,
        DataType::Bf16,
    ];

    pub fn width(self) -> u32 {
        match self {
            DataType::Int2 => 2,
            DataType::Int4 => 4,
            DataType::Int8 | DataType::Uint8 => 8,
            DataType::Fp16 | DataType::Bf16 => 16,
            DataType::Fp32 => 32,
        }
    }

    pub fn is_signed(self) -> bool { !matches!(self, DataType::Uint8) }

    pub fn kind(self) -> Kind {
        match self {
            DataType::Int2 | DataType::Int4 | DataType::Int8 | DataType::Uint8 => Kind::Integral,
            DataType::Fp16 | DataType::Bf16 | DataType::Fp32 => Kind::Float,
        }
    }

    pub fn is_integral(self) -> bool { self.kind() == Kind::Integral }

    /// Low-`width` bit mask.
    pub fn mask(self) -> u32 {
        let w = self.width();
        if w >= 32 { u32::MAX } else { (1u32 << w) - 1 }
    }

    /// Inclusive integer domain; `None` for float kinds.
    pub fn int_range(self) -> Option<(i64, i64)> {
        match self {
            DataType::Uint8 => Some((0, 255)),
            t if t.is_integral() => {
                let half = 1i64 << (t.width() - 1);
                Some((-half, half - 1))
            }
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DataType::Int2 => "int2",
            DataType::Int4 => "int4",
            DataType::Int8 => "int8",
            DataType::Uint8 => "uint8",
            DataType::Fp16 => "fp16",
            DataType::Bf16 => "bf16",
            DataType::Fp32 => "fp32",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name()) }
}

impl FromStr for DataType {
    type Err = DotgenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "int2" => Ok(DataType::Int2),
            "int4" => Ok(DataType::Int4),
            "int8" => Ok(DataType::Int8),
            "uint8" => Ok(DataType::Uint8),
            "fp16" | "f16" | "half" => Ok(DataType::Fp16),
            "bf16" | "bfloat16" => Ok(DataType::Bf16),
            "fp32" | "f32" | "float" => Ok(DataType::Fp32),
            _ => Err(DotgenError::UnsupportedType(s.to_string())),
        }
    }
}
