use criterion::{criterion_group, criterion_main, Criterion, black_box};
use dotgen::case::{generate_cases, GenParams};
use dotgen::reference::dot;
use dotgen::sampler::{Domain, VectorSampler};
use dotgen::DataType;

fn bench_reference_dot(c: &mut Criterion) {
    let mut s = VectorSampler::seeded(20240601);
    let a = s.sample(DataType::Bf16, 64, &Domain::Natural).unwrap();
    let x = s.sample(DataType::Bf16, 64, &Domain::Natural).unwrap();
    c.bench_function("dot_bf16_x64", |ben| {
        ben.iter(|| black_box(dot(black_box(&a), black_box(&x)).unwrap()))
    });
}

fn bench_generate(c: &mut Criterion) {
    // full reference fixture: 64 int8 rows of 64
    let p = GenParams::default();
    c.bench_function("generate_default_64_cases", |ben| {
        ben.iter(|| black_box(generate_cases(black_box(&p)).unwrap()))
    });
}

criterion_group!(benches, bench_reference_dot, bench_generate);
criterion_main!(benches);
