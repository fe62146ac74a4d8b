//! Reference inner product in f32.
//!
//! Both rows are widened element by element, then accumulated left to right
//! with one f32 rounding per multiply and per add. The order is fixed; hardware
//! fixtures depend on the exact rounding sequence.

use crate::codec::f32_to_hex;
use crate::error::{DotgenError, Result};
use crate::row::Row;

#[inline]
pub fn dot_f32(a: &[f32], x: &[f32]) -> f32 {
    let mut acc = 0.0f32;
    for i in 0..a.len().min(x.len()) {
        let p = a[i] * x[i];
        acc += p;
    }
    acc
}

pub fn dot(a: &Row, x: &Row) -> Result<f32> {
    if a.len() != x.len() {
        return Err(DotgenError::LengthMismatch { a: a.len(), x: x.len() });
    }
    Ok(dot_f32(&a.widened()?, &x.widened()?))
}

/// [`dot`] rendered as the 8-digit fp32 hex written to `y_out.txt`.
pub fn dot_hex(a: &Row, x: &Row) -> Result<String> { Ok(f32_to_hex(dot(a, x)?)) }
