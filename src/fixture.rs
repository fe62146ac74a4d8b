//! Writes generated cases to the `.mem`/`.txt` files the RTL test benches
//! load, and reads batch fixtures back for verification.
//!
//! Layouts:
//! - batch: `A_row_packed.mem` (one packed row per line), `x_vector.mem`
//!   (one line of space separated native hex), `y_out.txt` (one fp32 hex per row)
//! - mixed: `test_vectors.mem` with `#` headers per case
//! - sweep: `test_<n>/{A_row_packed.mem, x_vector.mem, expected_y.txt}`, one value per line
//!
//! Every run also leaves a `manifest.json`.

use crate::case::{shared_x, GenParams, TestCase, Variant};
use crate::codec::{decode_to_f32, f32_from_hex, Encoded, HexCase};
use crate::dtype::DataType;
use crate::error::{DotgenError, Result};
use crate::pack::{self, Alignment, LineStyle};
use crate::reference::dot_f32;
use crate::row::Row;
use log::info;
use serde::{Deserialize, Serialize};
use std::fs::{create_dir_all, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

pub const A_FILE: &str = "A_row_packed.mem";
pub const X_FILE: &str = "x_vector.mem";
pub const Y_FILE: &str = "y_out.txt";
pub const EXPECTED_FILE: &str = "expected_y.txt";
pub const MIXED_FILE: &str = "test_vectors.mem";
pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub index: usize,
    pub expected: f32,
    pub expected_hex: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Manifest {
    pub params: GenParams,
    pub cases: Vec<ManifestEntry>,
}

fn create(path: &Path) -> Result<BufWriter<File>> { Ok(BufWriter::new(File::create(path)?)) }

/// Writes cases one at a time so callers can report progress.
pub struct FixtureWriter {
    params: GenParams,
    dir: PathBuf,
    case: HexCase,
    // batch: A, y; mixed: test_vectors
    primary: Option<BufWriter<File>>,
    secondary: Option<BufWriter<File>>,
    x_written: bool,
    entries: Vec<ManifestEntry>,
    paths: Vec<PathBuf>,
}

impl FixtureWriter {
    pub fn new<P: AsRef<Path>>(params: &GenParams, dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        create_dir_all(&dir)?;
        let mut paths = Vec::new();
        let (primary, secondary) = match params.variant {
            Variant::Batch => {
                let a = dir.join(A_FILE);
                let y = dir.join(Y_FILE);
                let out = (Some(create(&a)?), Some(create(&y)?));
                paths.push(a);
                paths.push(y);
                out
            }
            Variant::Mixed => {
                let p = dir.join(MIXED_FILE);
                let out = (Some(create(&p)?), None);
                paths.push(p);
                out
            }
            Variant::Sweep => (None, None),
        };
        Ok(Self {
            params: params.clone(),
            dir,
            case: params.hex_case(),
            primary,
            secondary,
            x_written: false,
            entries: Vec::with_capacity(params.cases),
            paths,
        })
    }

    pub fn write_case(&mut self, tc: &TestCase) -> Result<()> {
        match self.params.variant {
            Variant::Batch => self.write_batch(tc)?,
            Variant::Mixed => self.write_mixed(tc)?,
            Variant::Sweep => self.write_sweep(tc)?,
        }
        self.entries.push(ManifestEntry {
            index: tc.index,
            expected: tc.expected,
            expected_hex: tc.expected_hex(),
        });
        Ok(())
    }

    fn write_x_vector(&mut self, x: &Row) -> Result<()> {
        let path = self.dir.join(X_FILE);
        let mut f = create(&path)?;
        writeln!(f, "{}", x.lines(LineStyle::Native, self.case)?.join(" "))?;
        f.flush()?;
        self.paths.push(path);
        self.x_written = true;
        Ok(())
    }

    fn write_batch(&mut self, tc: &TestCase) -> Result<()> {
        if !self.x_written { self.write_x_vector(&tc.x)?; }
        let packed = tc.a.packed_with(self.params.align, self.case)?;
        let y_hex = self.case.apply(tc.expected_hex());
        if let (Some(a), Some(y)) = (self.primary.as_mut(), self.secondary.as_mut()) {
            writeln!(a, "{}", packed)?;
            writeln!(y, "{}", y_hex)?;
        }
        Ok(())
    }

    fn write_mixed(&mut self, tc: &TestCase) -> Result<()> {
        let packed = tc.a.packed_with(self.params.align, self.case)?;
        let x = tc.x.lines(LineStyle::Native, self.case)?;
        let y_hex = self.case.apply(tc.expected_hex());
        let Some(f) = self.primary.as_mut() else { return Ok(()) };
        writeln!(f, "# A_row_packed:\n{}", packed)?;
        writeln!(f, "# x_vector_{} ({} values):\n{}", tc.x.dtype, x.len(), x.join(" "))?;
        writeln!(f, "# Expected dot product (fp32 hex):\n{}", y_hex)?;
        writeln!(f)?;
        Ok(())
    }

    fn write_sweep(&mut self, tc: &TestCase) -> Result<()> {
        let dir = self.dir.join(format!("test_{}", tc.index));
        create_dir_all(&dir)?;
        let a_style = if tc.a.dtype.is_integral() { LineStyle::Native } else { LineStyle::Widened };
        write_lines(&dir.join(A_FILE), &tc.a.lines(a_style, self.case)?)?;
        write_lines(&dir.join(X_FILE), &tc.x.lines(LineStyle::Widened, self.case)?)?;
        let mut f = create(&dir.join(EXPECTED_FILE))?;
        writeln!(f, "{}", self.case.apply(tc.expected_hex()))?;
        writeln!(f, "{:.6}", tc.expected)?;
        f.flush()?;
        self.paths.push(dir);
        Ok(())
    }

    /// Flush open files and write the manifest. Returns every path written.
    pub fn finish(mut self) -> Result<Vec<PathBuf>> {
        // a batch with no rows still gets its shared x-vector
        if self.params.variant == Variant::Batch && !self.x_written {
            let x = shared_x(&self.params)?;
            self.write_x_vector(&x)?;
        }
        for mut w in [self.primary.take(), self.secondary.take()].into_iter().flatten() {
            w.flush()?;
        }
        let manifest = Manifest { params: self.params, cases: self.entries };
        let path = self.dir.join(MANIFEST_FILE);
        let json = serde_json::to_string_pretty(&manifest).map_err(std::io::Error::from)?;
        std::fs::write(&path, json)?;
        self.paths.push(path);
        info!("wrote {} cases to {}", manifest.cases.len(), self.dir.display());
        Ok(self.paths)
    }
}

pub fn write_lines(path: &Path, lines: &[String]) -> Result<()> {
    let mut f = create(path)?;
    for l in lines { writeln!(f, "{}", l)?; }
    f.flush()?;
    Ok(())
}

/// Write all cases in one call.
pub fn write_fixtures<P: AsRef<Path>>(
    params: &GenParams,
    cases: &[TestCase],
    dir: P,
) -> Result<Vec<PathBuf>> {
    let mut w = FixtureWriter::new(params, dir)?;
    for tc in cases { w.write_case(tc)?; }
    w.finish()
}

/// A batch fixture read back from disk.
#[derive(Debug)]
pub struct BatchFixture {
    pub rows: Vec<Vec<Encoded>>,
    pub x: Vec<Encoded>,
    pub y: Vec<f32>,
}

fn read_nonempty_lines(path: &Path) -> Result<Vec<String>> {
    let rdr = BufReader::new(File::open(path)?);
    let mut out = Vec::new();
    for line in rdr.lines() {
        let line = line?;
        let l = line.trim();
        if l.is_empty() || l.starts_with('#') { continue; }
        out.push(l.to_string());
    }
    Ok(out)
}

/// Parse one per-element hex token; byte-wide tokens of sub-byte types keep their low bits.
pub fn parse_element(token: &str, dtype: DataType) -> Result<Encoded> {
    let bits = u32::from_str_radix(token, 16)
        .map_err(|e| DotgenError::InvalidHex(format!("{:?}: {}", token, e)))?;
    Ok(Encoded { bits: bits & dtype.mask() })
}

pub fn read_manifest<P: AsRef<Path>>(dir: P) -> Result<Manifest> {
    let s = std::fs::read_to_string(dir.as_ref().join(MANIFEST_FILE))?;
    Ok(serde_json::from_str(&s).map_err(std::io::Error::from)?)
}

pub fn read_batch<P: AsRef<Path>>(
    dir: P,
    dtype: DataType,
    len: usize,
    align: Alignment,
) -> Result<BatchFixture> {
    let dir = dir.as_ref();
    let rows = read_nonempty_lines(&dir.join(A_FILE))?
        .iter()
        .map(|l| pack::unpack(l, dtype.width(), len, align))
        .collect::<Result<Vec<_>>>()?;
    let x = read_nonempty_lines(&dir.join(X_FILE))?
        .iter()
        .flat_map(|l| l.split_whitespace().map(str::to_string).collect::<Vec<_>>())
        .map(|t| parse_element(&t, dtype))
        .collect::<Result<Vec<_>>>()?;
    let y = read_nonempty_lines(&dir.join(Y_FILE))?
        .iter()
        .map(|l| f32_from_hex(l))
        .collect::<Result<Vec<_>>>()?;
    Ok(BatchFixture { rows, x, y })
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mismatch {
    pub row: usize,
    pub expected: f32,
    pub actual: f32,
}

/// Recompute each row's dot and compare bit for bit with `y`.
pub fn verify_batch(fx: &BatchFixture, dtype: DataType) -> Result<Vec<Mismatch>> {
    if fx.rows.len() != fx.y.len() {
        return Err(DotgenError::LengthMismatch { a: fx.rows.len(), x: fx.y.len() });
    }
    let x: Vec<f32> = fx.x.iter().map(|&e| decode_to_f32(e, dtype)).collect();
    let mut out = Vec::new();
    for (i, row) in fx.rows.iter().enumerate() {
        if row.len() != x.len() {
            return Err(DotgenError::LengthMismatch { a: row.len(), x: x.len() });
        }
        let a: Vec<f32> = row.iter().map(|&e| decode_to_f32(e, dtype)).collect();
        let actual = dot_f32(&a, &x);
        if actual.to_bits() != fx.y[i].to_bits() {
            out.push(Mismatch { row: i, expected: fx.y[i], actual });
        }
    }
    info!("verified {} rows, {} mismatches", fx.rows.len(), out.len());
    Ok(out)
}
