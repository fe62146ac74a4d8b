use anyhow::{bail, Context, Result};
use clap::Parser;
use dotgen::codec::f32_to_hex;
use dotgen::fixture::{read_batch, read_manifest, verify_batch, MANIFEST_FILE};
use dotgen::pack::Alignment;
use dotgen::DataType;
use log::info;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "dotcheck", about = "Recompute the reference dots of a batch fixture directory")]
struct Args {
    /// Directory holding A_row_packed.mem, x_vector.mem and y_out.txt
    #[arg(value_name = "DIR")]
    dir: PathBuf,
    /// Element type (default: from manifest.json, else int8)
    #[arg(long)]
    dtype: Option<DataType>,
    /// Vector length (default: from manifest.json, else 64)
    #[arg(long)]
    len: Option<usize>,
    /// Rows were packed with trailing pad bits (default: from manifest.json)
    #[arg(long, default_value_t = false)]
    left_align: bool,
}

/// Layout of the fixture: explicit flags win over the manifest.
fn layout(args: &Args) -> Result<(DataType, usize, Alignment)> {
    let (mut dtype, mut len, mut align) = (DataType::Int8, 64, Alignment::Right);
    if args.dir.join(MANIFEST_FILE).exists() {
        let m = read_manifest(&args.dir).context("read manifest.json")?;
        info!("manifest: {} N={} {:?}", m.params.dtype, m.params.len, m.params.align);
        (dtype, len, align) = (m.params.dtype, m.params.len, m.params.align);
    }
    if args.left_align {
        align = Alignment::Left;
    }
    Ok((args.dtype.unwrap_or(dtype), args.len.unwrap_or(len), align))
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let (dtype, len, align) = layout(&args)?;
    let fx = read_batch(&args.dir, dtype, len, align)
        .with_context(|| format!("read batch fixture from {}", args.dir.display()))?;
    let mismatches = verify_batch(&fx, dtype)?;
    for m in &mismatches {
        println!(
            "row {}: expected {} ({}), recomputed {} ({})",
            m.row,
            f32_to_hex(m.expected),
            m.expected,
            f32_to_hex(m.actual),
            m.actual
        );
    }
    if !mismatches.is_empty() {
        bail!("{} of {} rows mismatched", mismatches.len(), fx.rows.len());
    }
    println!("{} rows OK", fx.rows.len());
    Ok(())
}
