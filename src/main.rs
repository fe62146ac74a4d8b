use anyhow::{Context, Result};
use clap::Parser;
use dotgen::case::{generate_cases, GenParams, Variant};
use dotgen::codec::HexCase;
use dotgen::fixture::FixtureWriter;
use dotgen::pack::Alignment;
use dotgen::sampler::Domain;
use dotgen::DataType;
use log::info;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "dotgen",
    author,
    version,
    about = "Generate bit-exact dot-product accelerator fixtures",
    long_about = None
)]
struct Args {
    /// Element type: int2, int4, int8, uint8, fp16, bf16
    #[arg(long, default_value = "int8")]
    dtype: DataType,

    /// Generate every operand type into <out>/<dtype>
    #[arg(long, default_value_t = false)]
    all_types: bool,

    /// Fixture layout: batch, mixed, sweep
    #[arg(long, default_value = "batch")]
    variant: Variant,

    /// Number of test cases (rows)
    #[arg(long, default_value_t = 64)]
    cases: usize,

    /// Vector length N
    #[arg(long, default_value_t = 64)]
    len: usize,

    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Worker threads (0 = all cores)
    #[arg(long, default_value_t = 0)]
    threads: usize,

    /// Fail on values outside the type's domain instead of wrapping
    #[arg(long, default_value_t = false)]
    strict: bool,

    /// Inclusive integer range for A-rows
    #[arg(long, requires = "a_max", allow_negative_numbers = true)]
    a_min: Option<i64>,
    #[arg(long, requires = "a_min", allow_negative_numbers = true)]
    a_max: Option<i64>,

    /// Real interval [lo, hi) for float A-rows
    #[arg(long, requires = "a_hi", allow_hyphen_values = true)]
    a_lo: Option<f64>,
    #[arg(long, requires = "a_lo", allow_hyphen_values = true)]
    a_hi: Option<f64>,

    /// Real interval [lo, hi) for x-vectors
    #[arg(long, requires = "x_hi", allow_hyphen_values = true)]
    x_lo: Option<f64>,
    #[arg(long, requires = "x_lo", allow_hyphen_values = true)]
    x_hi: Option<f64>,

    /// Put pad bits after the last element instead of before the first
    #[arg(long, default_value_t = false)]
    left_align: bool,

    /// Force uppercase hex (sweep defaults to uppercase, others lowercase)
    #[arg(long, default_value_t = false, conflicts_with = "lower")]
    upper: bool,
    #[arg(long, default_value_t = false)]
    lower: bool,

    #[arg(long, default_value = "test_vectors_by_type")]
    out: PathBuf,

    /// Skip the per-case table
    #[arg(long, default_value_t = false)]
    quiet: bool,
}

impl Args {
    fn params(&self, dtype: DataType) -> GenParams {
        let a_domain = match (self.a_min, self.a_max, self.a_lo, self.a_hi) {
            (Some(min), Some(max), _, _) => Some(Domain::Range { min, max }),
            (_, _, Some(lo), Some(hi)) => Some(Domain::Interval { lo, hi }),
            _ => None,
        };
        let x_domain = match (self.x_lo, self.x_hi) {
            (Some(lo), Some(hi)) => Some(Domain::Interval { lo, hi }),
            _ => None,
        };
        let hex_case = match (self.upper, self.lower) {
            (true, _) => Some(HexCase::Upper),
            (_, true) => Some(HexCase::Lower),
            _ => None,
        };
        GenParams {
            dtype,
            variant: self.variant,
            cases: self.cases,
            len: self.len,
            seed: self.seed,
            threads: self.threads,
            strict: self.strict,
            a_domain,
            x_domain,
            align: if self.left_align { Alignment::Left } else { Alignment::Right },
            hex_case,
        }
    }
}

fn progress_bar(n: usize) -> indicatif::ProgressBar {
    let pb = indicatif::ProgressBar::new(n as u64);
    if let Ok(style) = indicatif::ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}

fn run_one(args: &Args, params: &GenParams, out: &Path) -> Result<()> {
    info!(
        "generating {} {} cases ({}, N={}, seed={})",
        params.cases, params.dtype, params.variant, params.len, params.seed
    );
    let cases = generate_cases(params).with_context(|| format!("generate {} cases", params.dtype))?;

    if !args.quiet {
        println!("{:>4} | {:>12} | {:>10}", "Test", "Dot Product", "FP32 Hex");
        println!("{}", "-".repeat(34));
        for tc in &cases {
            let hex = params.hex_case().apply(tc.expected_hex());
            println!("{:>4} | {:>12.6} | {:>10}", tc.index, tc.expected, hex);
        }
    }

    let mut w = FixtureWriter::new(params, out)
        .with_context(|| format!("create fixture dir {}", out.display()))?;
    let pb = progress_bar(cases.len());
    for tc in &cases {
        w.write_case(tc).with_context(|| format!("write case {}", tc.index))?;
        pb.inc(1);
    }
    pb.finish_and_clear();
    let paths = w.finish()?;
    eprintln!(
        "Wrote {} {} fixtures ({} paths) to {}",
        cases.len(),
        params.dtype,
        paths.len(),
        out.display()
    );
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    if args.all_types {
        for dtype in DataType::OPERANDS {
            let params = args.params(dtype);
            run_one(&args, &params, &args.out.join(dtype.name()))?;
        }
    } else {
        let params = args.params(args.dtype);
        run_one(&args, &params, &args.out.join(args.dtype.name()))?;
    }
    Ok(())
}
