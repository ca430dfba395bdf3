//! OID comparison, parsing, and prefix-matching throughput — the hot path
//! for every registry lookup and GETNEXT walk.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use priot::oid::Oid;

fn bench_oid_compare(c: &mut Criterion) {
    let a = Oid::from_slice(&[1, 3, 6, 1, 4, 1, 8072, 2, 3, 2, 1, 2, 7]);
    let b = Oid::from_slice(&[1, 3, 6, 1, 4, 1, 8072, 2, 3, 2, 1, 2, 8]);
    c.bench_function("oid_cmp", |bench| {
        bench.iter(|| black_box(&a).cmp(black_box(&b)))
    });
}

fn bench_oid_starts_with(c: &mut Criterion) {
    let prefix = Oid::from_slice(&[1, 3, 6, 1, 4, 1, 8072, 2]);
    let full = Oid::from_slice(&[1, 3, 6, 1, 4, 1, 8072, 2, 3, 2, 1, 2, 7]);
    c.bench_function("oid_starts_with", |bench| {
        bench.iter(|| black_box(&full).starts_with(black_box(&prefix)))
    });
}

fn bench_oid_parse(c: &mut Criterion) {
    c.bench_function("oid_parse_dotted", |bench| {
        bench.iter(|| black_box("1.3.6.1.4.1.8072.2.3.2.1.2.7".parse::<Oid>().unwrap()))
    });
}

fn bench_oid_successor(c: &mut Criterion) {
    let oid = Oid::from_slice(&[1, 3, 6, 1, 4, 1, 8072, 2, 3, 2, 1, 2, 7]);
    c.bench_function("oid_successor", |bench| {
        bench.iter(|| black_box(&oid).successor())
    });
}

criterion_group!(
    benches,
    bench_oid_compare,
    bench_oid_starts_with,
    bench_oid_parse,
    bench_oid_successor
);
criterion_main!(benches);
