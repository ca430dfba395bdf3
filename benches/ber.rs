//! Codec throughput: encode and decode the varbind shapes that dominate a
//! typical GETBULK response (small integers, OIDs, and octet strings).

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use priot::ber::{Decoder, EncodeBuf};
use priot::oid::Oid;
use priot::value::Value;
use priot::varbind::VarBind;

fn sample_varbinds() -> Vec<VarBind> {
    (0..32)
        .map(|i| {
            VarBind::new(
                Oid::from_slice(&[1, 3, 6, 1, 2, 1, 2, 2, 1, 10, i]),
                Value::Counter32(i as u32 * 1000),
            )
        })
        .collect()
}

fn bench_encode_varbind_list(c: &mut Criterion) {
    let varbinds = sample_varbinds();
    c.bench_function("encode_varbind_list_32", |b| {
        b.iter(|| {
            let mut buf = EncodeBuf::new();
            priot::varbind::encode_varbind_list(&mut buf, black_box(&varbinds));
            black_box(buf.finish())
        })
    });
}

fn bench_decode_varbind_list(c: &mut Criterion) {
    let varbinds = sample_varbinds();
    let mut buf = EncodeBuf::new();
    priot::varbind::encode_varbind_list(&mut buf, &varbinds);
    let encoded = buf.finish();

    c.bench_function("decode_varbind_list_32", |b| {
        b.iter(|| {
            let mut decoder = Decoder::new(black_box(encoded.clone()));
            black_box(priot::varbind::decode_varbind_list(&mut decoder).unwrap())
        })
    });
}

fn bench_oid_encode(c: &mut Criterion) {
    let oid = Oid::from_slice(&[1, 3, 6, 1, 4, 1, 8072, 2, 3, 2, 1, 2, 7]);
    c.bench_function("oid_to_ber", |b| {
        b.iter(|| black_box(oid.to_ber_smallvec()))
    });
}

criterion_group!(
    benches,
    bench_encode_varbind_list,
    bench_decode_varbind_list,
    bench_oid_encode
);
criterion_main!(benches);
