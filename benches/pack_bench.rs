use criterion::{criterion_group, criterion_main, Criterion, black_box};
use dotgen::pack::{pack, unpack, Alignment};
use dotgen::sampler::{Domain, VectorSampler};
use dotgen::DataType;

fn bench_pack_rows(c: &mut Criterion) {
    for dtype in [DataType::Int2, DataType::Int4, DataType::Int8, DataType::Fp16] {
        let row = VectorSampler::seeded(0x1234_5678).sample(dtype, 64, &Domain::Natural).unwrap();
        let enc = row.encode().unwrap();
        let packed = pack(&enc, dtype.width());
        c.bench_function(&format!("pack_{}_x64", dtype), |ben| {
            ben.iter(|| black_box(pack(black_box(&enc), dtype.width())))
        });
        c.bench_function(&format!("unpack_{}_x64", dtype), |ben| {
            ben.iter(|| black_box(unpack(black_box(&packed), dtype.width(), 64, Alignment::Right).unwrap()))
        });
    }
}

criterion_group!(benches, bench_pack_rows);
criterion_main!(benches);
