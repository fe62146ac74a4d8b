use dotgen::case::{generate_cases, GenParams, Variant};
use dotgen::fixture::{read_batch, read_manifest, verify_batch, write_fixtures, Manifest};
use dotgen::pack::Alignment;
use dotgen::DataType;
use pretty_assertions::assert_eq;
use std::fs::{read_to_string, remove_dir_all, write};
use std::path::Path;

fn fresh(dir: &str) -> &Path {
    let p = Path::new(dir);
    let _ = remove_dir_all(p);
    p
}

#[test]
fn batch_fixture_reads_back_and_verifies() {
    for dtype in DataType::OPERANDS {
        let dir = format!("target/dotgen_batch_{}", dtype);
        let out = fresh(&dir);
        let p = GenParams { dtype, cases: 8, ..GenParams::default() };
        let cases = generate_cases(&p).unwrap();
        write_fixtures(&p, &cases, out).unwrap();

        let a = read_to_string(out.join("A_row_packed.mem")).unwrap();
        let lines: Vec<&str> = a.lines().collect();
        assert_eq!(lines.len(), 8);
        assert_eq!(lines[0], cases[0].a.packed().unwrap());
        assert!(lines.iter().all(|l| l.len() == 2 * (64 * dtype.width() as usize / 8)));

        let fx = read_batch(out, dtype, 64, Alignment::Right).unwrap();
        assert_eq!(fx.rows.len(), 8);
        assert_eq!(fx.x.len(), 64);
        assert!(verify_batch(&fx, dtype).unwrap().is_empty(), "{}", dtype);
    }
}

#[test]
fn batch_x_vector_is_one_spaced_line() {
    let out = fresh("target/dotgen_batch_x");
    let p = GenParams { cases: 2, ..GenParams::default() };
    write_fixtures(&p, &generate_cases(&p).unwrap(), out).unwrap();
    let x = read_to_string(out.join("x_vector.mem")).unwrap();
    assert_eq!(x.lines().count(), 1);
    assert_eq!(x.trim(), vec!["01"; 64].join(" "));
    let y = read_to_string(out.join("y_out.txt")).unwrap();
    assert!(y.lines().all(|l| l.len() == 8));
}

#[test]
fn corrupted_expected_value_is_caught() {
    let out = fresh("target/dotgen_batch_corrupt");
    let p = GenParams { cases: 3, ..GenParams::default() };
    write_fixtures(&p, &generate_cases(&p).unwrap(), out).unwrap();
    let y = read_to_string(out.join("y_out.txt")).unwrap();
    let mut lines: Vec<String> = y.lines().map(str::to_string).collect();
    lines[1] = "7f7fffff".to_string();
    write(out.join("y_out.txt"), lines.join("\n") + "\n").unwrap();
    let fx = read_batch(out, DataType::Int8, 64, Alignment::Right).unwrap();
    let bad = verify_batch(&fx, DataType::Int8).unwrap();
    assert_eq!(bad.len(), 1);
    assert_eq!(bad[0].row, 1);
}

#[test]
fn sweep_writes_one_directory_per_case() {
    let out = fresh("target/dotgen_sweep");
    let p = GenParams { variant: Variant::Sweep, cases: 4, ..GenParams::default() };
    let cases = generate_cases(&p).unwrap();
    write_fixtures(&p, &cases, out).unwrap();
    let case_dir = out.join("test_2");
    let a = read_to_string(case_dir.join("A_row_packed.mem")).unwrap();
    let a: Vec<&str> = a.lines().collect();
    assert_eq!(a.len(), 64);
    assert_eq!(a[0], "02");
    assert_eq!(a[8], "0A");
    let x = read_to_string(case_dir.join("x_vector.mem")).unwrap();
    assert!(x.lines().all(|l| l == "3F800000"));
    let y = read_to_string(case_dir.join("expected_y.txt")).unwrap();
    let y: Vec<&str> = y.lines().collect();
    assert_eq!(y[0], dotgen::codec::f32_to_hex(cases[2].expected).to_uppercase());
    assert_eq!(y[1], format!("{:.6}", cases[2].expected));
}

#[test]
fn sweep_float_rows_are_widened_to_fp32() {
    let out = fresh("target/dotgen_sweep_fp16");
    let p = GenParams { dtype: DataType::Fp16, variant: Variant::Sweep, cases: 1, len: 8, ..GenParams::default() };
    write_fixtures(&p, &generate_cases(&p).unwrap(), out).unwrap();
    let a = read_to_string(out.join("test_0").join("A_row_packed.mem")).unwrap();
    assert!(a.lines().all(|l| l.len() == 8));
}

#[test]
fn mixed_file_has_commented_sections() {
    let out = fresh("target/dotgen_mixed");
    let p = GenParams { variant: Variant::Mixed, cases: 2, ..GenParams::default() };
    let cases = generate_cases(&p).unwrap();
    write_fixtures(&p, &cases, out).unwrap();
    let s = read_to_string(out.join("test_vectors.mem")).unwrap();
    let lines: Vec<&str> = s.lines().collect();
    assert_eq!(lines[0], "# A_row_packed:");
    assert_eq!(lines[1], cases[0].a.packed().unwrap());
    assert_eq!(lines[2], "# x_vector_fp32 (64 values):");
    assert_eq!(lines[3].split(' ').count(), 64);
    assert_eq!(lines[4], "# Expected dot product (fp32 hex):");
    assert_eq!(lines[5], cases[0].expected_hex());
    assert_eq!(lines[6], "");
}

#[test]
fn manifest_lists_every_case() {
    let out = fresh("target/dotgen_manifest");
    let p = GenParams { cases: 5, ..GenParams::default() };
    let cases = generate_cases(&p).unwrap();
    let paths = write_fixtures(&p, &cases, out).unwrap();
    assert!(paths.iter().any(|p| p.ends_with("manifest.json")));
    let m: Manifest = serde_json::from_str(&read_to_string(out.join("manifest.json")).unwrap()).unwrap();
    assert_eq!(m.cases.len(), 5);
    assert_eq!(m.params.seed, 42);
    assert_eq!(m.cases[4].expected_hex, cases[4].expected_hex());
}

#[test]
fn left_aligned_batch_verifies_with_manifest_alignment() {
    let out = fresh("target/dotgen_batch_left");
    let p = GenParams {
        dtype: DataType::Int2,
        cases: 4,
        len: 3,
        align: Alignment::Left,
        ..GenParams::default()
    };
    let cases = generate_cases(&p).unwrap();
    write_fixtures(&p, &cases, out).unwrap();

    let m = read_manifest(out).unwrap();
    assert_eq!(m.params.align, Alignment::Left);
    let fx = read_batch(out, m.params.dtype, m.params.len, m.params.align).unwrap();
    assert_eq!(fx.rows.len(), 4);
    assert!(verify_batch(&fx, DataType::Int2).unwrap().is_empty());
    for (row, tc) in fx.rows.iter().zip(&cases) {
        assert_eq!(row, &tc.a.encode().unwrap());
    }
}

#[test]
fn empty_batch_still_writes_x_vector() {
    let out = fresh("target/dotgen_batch_empty");
    let p = GenParams { cases: 0, ..GenParams::default() };
    let cases = generate_cases(&p).unwrap();
    assert!(cases.is_empty());
    let paths = write_fixtures(&p, &cases, out).unwrap();
    assert!(paths.iter().any(|p| p.ends_with("x_vector.mem")));
    let x = read_to_string(out.join("x_vector.mem")).unwrap();
    assert_eq!(x.trim(), vec!["01"; 64].join(" "));
    assert_eq!(read_to_string(out.join("A_row_packed.mem")).unwrap(), "");
    let fx = read_batch(out, DataType::Int8, 64, Alignment::Right).unwrap();
    assert!(fx.rows.is_empty());
    assert_eq!(fx.x.len(), 64);
}
