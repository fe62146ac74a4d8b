use crate::codec::{self, LogicalValue};
use crate::dtype::DataType;
use crate::error::{DotgenError, Result};
use crate::row::Row;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

pub const DEFAULT_FLOAT_LO: f64 = -10.0;
pub const DEFAULT_FLOAT_HI: f64 = 10.0;

/// Value domain for one row. Integer bounds are inclusive, float intervals half-open.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Domain {
    /// The type's declared range, or `[-10, 10)` for floats.
    #[default]
    Natural,
    Range { min: i64, max: i64 },
    Interval { lo: f64, hi: f64 },
    /// Element i is `start + i`.
    Sweep { start: i64 },
    Constant { value: f64 },
}

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

/// Seed for an independent stream derived from a run seed.
pub fn stream_seed(seed: u64, stream: u64) -> u64 { splitmix64(seed ^ splitmix64(stream)) }

fn sweep_value(start: i64, i: usize) -> Result<i64> {
    i64::try_from(i)
        .ok()
        .and_then(|i| start.checked_add(i))
        .ok_or_else(|| {
            DotgenError::InvalidDomain(format!("sweep from {} overflows at element {}", start, i))
        })
}

/// Draws rows from an injected random source.
pub struct VectorSampler<R: Rng = SmallRng> {
    rng: R,
    strict: bool,
}

impl VectorSampler<SmallRng> {
    pub fn seeded(seed: u64) -> Self { Self::new(SmallRng::seed_from_u64(seed)) }

    pub fn for_stream(seed: u64, stream: u64) -> Self { Self::seeded(stream_seed(seed, stream)) }
}

impl<R: Rng> VectorSampler<R> {
    pub fn new(rng: R) -> Self { Self { rng, strict: false } }

    /// Reject caller domains that leave the type's declared range.
    pub fn strict(mut self, on: bool) -> Self {
        self.strict = on;
        self
    }

    pub fn sample(&mut self, dtype: DataType, len: usize, domain: &Domain) -> Result<Row> {
        let values = if dtype.is_integral() {
            self.sample_ints(dtype, len, domain)?
        } else {
            self.sample_floats(dtype, len, domain)?
        };
        Ok(Row::new(dtype, values))
    }

    fn check(&self, dtype: DataType, v: i64) -> Result<()> {
        if !self.strict { return Ok(()); }
        match dtype.int_range() {
            Some((lo, hi)) if v < lo || v > hi => {
                Err(DotgenError::DomainViolation { dtype: dtype.name(), value: v.to_string() })
            }
            _ => Ok(()),
        }
    }

    fn sample_ints(&mut self, dtype: DataType, len: usize, domain: &Domain) -> Result<Vec<LogicalValue>> {
        let (min, max) = match *domain {
            Domain::Natural => dtype.int_range().unwrap_or((0, 0)),
            Domain::Range { min, max } => {
                if min > max {
                    return Err(DotgenError::InvalidDomain(format!("empty range [{}, {}]", min, max)));
                }
                self.check(dtype, min)?;
                self.check(dtype, max)?;
                (min, max)
            }
            Domain::Sweep { start } => {
                let mut out = Vec::with_capacity(len);
                for i in 0..len {
                    let v = sweep_value(start, i)?;
                    self.check(dtype, v)?;
                    out.push(LogicalValue::Int(v));
                }
                return Ok(out);
            }
            Domain::Constant { value } => {
                if !value.is_finite() || value.fract() != 0.0 {
                    return Err(DotgenError::InvalidDomain(format!("{} is not an integer", value)));
                }
                self.check(dtype, value as i64)?;
                return Ok(vec![LogicalValue::Int(value as i64); len]);
            }
            Domain::Interval { lo, hi } => {
                return Err(DotgenError::InvalidDomain(format!(
                    "real interval [{}, {}) for integral type {}",
                    lo, hi, dtype
                )));
            }
        };
        Ok((0..len).map(|_| LogicalValue::Int(self.rng.gen_range(min..=max))).collect())
    }

    fn sample_floats(&mut self, dtype: DataType, len: usize, domain: &Domain) -> Result<Vec<LogicalValue>> {
        let round = |v: f64| -> Result<LogicalValue> {
            let w = codec::widen(LogicalValue::Float(v as f32), dtype)?;
            Ok(LogicalValue::Float(w))
        };
        let (lo, hi) = match *domain {
            Domain::Natural => (DEFAULT_FLOAT_LO, DEFAULT_FLOAT_HI),
            Domain::Interval { lo, hi } => (lo, hi),
            Domain::Range { min, max } => (min as f64, max as f64),
            Domain::Sweep { start } => {
                return (0..len).map(|i| round(sweep_value(start, i)? as f64)).collect();
            }
            Domain::Constant { value } => return Ok(vec![round(value)?; len]),
        };
        // the width must be finite too or the uniform draw overflows
        if !lo.is_finite() || !hi.is_finite() || lo > hi || !(hi - lo).is_finite() {
            return Err(DotgenError::InvalidDomain(format!("interval [{}, {})", lo, hi)));
        }
        if lo == hi {
            return Ok(vec![round(lo)?; len]);
        }
        let mut out = Vec::with_capacity(len);
        for _ in 0..len {
            out.push(round(self.rng.gen_range(lo..hi))?);
        }
        Ok(out)
    }
}
