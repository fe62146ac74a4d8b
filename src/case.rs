use crate::codec::{f32_to_hex, HexCase};
use crate::dtype::DataType;
use crate::error::{DotgenError, Result};
use crate::pack::Alignment;
use crate::reference;
use crate::row::Row;
use crate::sampler::{Domain, VectorSampler};
use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fixture layouts the accelerator test benches consume.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Random A-rows against one shared x-vector of ones, all rows in one file.
    #[default]
    Batch,
    /// A-rows against random fp32 x-vectors, one commented `.mem` file.
    Mixed,
    /// One directory per case, integer A-rows sweep upward from the case index.
    Sweep,
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Variant::Batch => "batch",
            Variant::Mixed => "mixed",
            Variant::Sweep => "sweep",
        })
    }
}

impl FromStr for Variant {
    type Err = DotgenError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "batch" => Ok(Variant::Batch),
            "mixed" => Ok(Variant::Mixed),
            "sweep" => Ok(Variant::Sweep),
            _ => Err(DotgenError::UnsupportedType(format!("variant {}", s))),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenParams {
    pub dtype: DataType,
    pub variant: Variant,
    pub cases: usize,
    pub len: usize,
    pub seed: u64,
    pub threads: usize,            // 0 => rayon global pool
    pub strict: bool,              // reject out-of-domain values instead of wrapping
    pub a_domain: Option<Domain>,  // overrides the variant's A-row domain
    pub x_domain: Option<Domain>,  // overrides the variant's x-vector domain
    pub align: Alignment,
    pub hex_case: Option<HexCase>, // None => variant default
}

impl Default for GenParams {
    fn default() -> Self {
        Self {
            dtype: DataType::Int8,
            variant: Variant::Batch,
            cases: 64,
            len: 64,
            seed: 42,
            threads: 0,
            strict: false,
            a_domain: None,
            x_domain: None,
            align: Alignment::Right,
            hex_case: None,
        }
    }
}

impl GenParams {
    pub fn x_dtype(&self) -> DataType {
        match self.variant {
            Variant::Batch => self.dtype,
            Variant::Mixed | Variant::Sweep => DataType::Fp32,
        }
    }

    pub fn a_domain_for(&self, index: usize) -> Domain {
        if let Some(d) = self.a_domain { return d; }
        match self.variant {
            Variant::Sweep if self.dtype.is_integral() => Domain::Sweep { start: index as i64 },
            _ => Domain::Natural,
        }
    }

    pub fn x_domain(&self) -> Domain {
        if let Some(d) = self.x_domain { return d; }
        match self.variant {
            Variant::Mixed => Domain::Interval { lo: -1.0, hi: 1.0 },
            Variant::Batch | Variant::Sweep => Domain::Constant { value: 1.0 },
        }
    }

    pub fn hex_case(&self) -> HexCase {
        self.hex_case.unwrap_or(match self.variant {
            Variant::Sweep => HexCase::Upper,
            Variant::Batch | Variant::Mixed => HexCase::Lower,
        })
    }

    /// Batch fixtures share one x-vector across all rows.
    pub fn shares_x(&self) -> bool { self.variant == Variant::Batch }
}

/// One (A-row, x-vector, expected) triple.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TestCase {
    pub index: usize,
    pub a: Row,
    pub x: Row,
    pub expected: f32,
}

impl TestCase {
    pub fn new(index: usize, a: Row, x: Row) -> Result<Self> {
        let expected = reference::dot(&a, &x)?;
        Ok(Self { index, a, x, expected })
    }

    pub fn expected_hex(&self) -> String { f32_to_hex(self.expected) }
}

/// Stream id reserved for the shared batch x-vector.
const SHARED_X_STREAM: u64 = u64::MAX;

pub fn shared_x(params: &GenParams) -> Result<Row> {
    let mut s = VectorSampler::for_stream(params.seed, SHARED_X_STREAM).strict(params.strict);
    s.sample(params.x_dtype(), params.len, &params.x_domain())
}

/// Build case `index` from its own random stream. `x` is used when the
/// variant shares one x-vector.
pub fn generate_case(params: &GenParams, index: usize, x: Option<&Row>) -> Result<TestCase> {
    let mut s = VectorSampler::for_stream(params.seed, index as u64).strict(params.strict);
    let a = s.sample(params.dtype, params.len, &params.a_domain_for(index))?;
    let x = match x {
        Some(x) => x.clone(),
        None => s.sample(params.x_dtype(), params.len, &params.x_domain())?,
    };
    if params.strict {
        a.encode_strict()?;
        x.encode_strict()?;
    }
    let case = TestCase::new(index, a, x)?;
    debug!(
        "case {}: {} x {} -> {} ({})",
        index,
        params.dtype,
        params.x_dtype(),
        case.expected,
        case.expected_hex()
    );
    Ok(case)
}

/// All cases, in index order. Each case draws from an independent stream so
/// the result does not depend on the thread count.
pub fn generate_cases(params: &GenParams) -> Result<Vec<TestCase>> {
    let x = if params.shares_x() { Some(shared_x(params)?) } else { None };
    let run = || -> Result<Vec<TestCase>> {
        (0..params.cases)
            .into_par_iter()
            .map(|i| generate_case(params, i, x.as_ref()))
            .collect()
    };
    if params.threads > 0 {
        let pool = rayon::ThreadPoolBuilder::new().num_threads(params.threads).build()?;
        pool.install(run)
    } else {
        run()
    }
}
