use crate::codec::{self, Encoded, HexCase, LogicalValue};
use crate::dtype::DataType;
use crate::error::Result;
use crate::pack::{self, Alignment, LineStyle};
use serde::{Deserialize, Serialize};

/// Ordered operand vector of a single element type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub dtype: DataType,
    pub values: Vec<LogicalValue>,
}

impl Row {
    pub fn new(dtype: DataType, values: Vec<LogicalValue>) -> Self { Self { dtype, values } }

    pub fn from_ints(dtype: DataType, values: &[i64]) -> Self {
        Self::new(dtype, values.iter().map(|&v| LogicalValue::Int(v)).collect())
    }

    pub fn from_floats(dtype: DataType, values: &[f32]) -> Self {
        Self::new(dtype, values.iter().map(|&v| LogicalValue::Float(v)).collect())
    }

    pub fn len(&self) -> usize { self.values.len() }

    pub fn is_empty(&self) -> bool { self.values.is_empty() }

    pub fn encode(&self) -> Result<Vec<Encoded>> {
        self.values.iter().map(|&v| codec::encode(v, self.dtype)).collect()
    }

    pub fn encode_strict(&self) -> Result<Vec<Encoded>> {
        self.values.iter().map(|&v| codec::encode_strict(v, self.dtype)).collect()
    }

    /// Elements as the accelerator sees them, widened to f32.
    pub fn widened(&self) -> Result<Vec<f32>> {
        self.values.iter().map(|&v| codec::widen(v, self.dtype)).collect()
    }

    pub fn packed(&self) -> Result<String> { Ok(pack::pack(&self.encode()?, self.dtype.width())) }

    pub fn packed_with(&self, align: Alignment, case: HexCase) -> Result<String> {
        Ok(pack::pack_with(&self.encode()?, self.dtype.width(), align, case))
    }

    pub fn lines(&self, style: LineStyle, case: HexCase) -> Result<Vec<String>> {
        Ok(pack::render_lines(&self.encode()?, self.dtype, style, case))
    }
}
