//! Registry lookup throughput under realistic fan-out: many disjoint
//! subtree registrations, looked up by both exact GET and GETNEXT.

use std::sync::Arc;

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use priot::handler::{BoxFuture, GetNextResult, GetResult, MibHandler, RequestContext};
use priot::oid::Oid;
use priot::registry::{DEFAULT_CONTEXT, Registry};
use priot::value::Value;

struct NoopHandler;

impl MibHandler for NoopHandler {
    fn get<'a>(&'a self, _ctx: &'a RequestContext, _oid: &'a Oid) -> BoxFuture<'a, GetResult> {
        Box::pin(async move { GetResult::Value(Value::Integer(1)) })
    }

    fn get_next<'a>(&'a self, _ctx: &'a RequestContext, _oid: &'a Oid) -> BoxFuture<'a, GetNextResult> {
        Box::pin(async move { GetNextResult::EndOfMibView })
    }
}

fn populated_registry(count: u32) -> Registry {
    let registry = Registry::new();
    for i in 0..count {
        let oid = Oid::from_slice(&[1, 3, 6, 1, 4, 1, 8072, 2, i]);
        registry
            .register(DEFAULT_CONTEXT, oid, 127, Arc::new(NoopHandler))
            .unwrap();
    }
    registry
}

fn bench_lookup_hit(c: &mut Criterion) {
    let registry = populated_registry(256);
    let target = Oid::from_slice(&[1, 3, 6, 1, 4, 1, 8072, 2, 128, 0]);
    c.bench_function("registry_lookup_hit_256", |b| {
        b.iter(|| black_box(registry.lookup(DEFAULT_CONTEXT, black_box(&target))))
    });
}

fn bench_lookup_miss(c: &mut Criterion) {
    let registry = populated_registry(256);
    let target = Oid::from_slice(&[1, 3, 6, 1, 4, 1, 9999, 1]);
    c.bench_function("registry_lookup_miss_256", |b| {
        b.iter(|| black_box(registry.lookup(DEFAULT_CONTEXT, black_box(&target))))
    });
}

fn bench_lookup_next(c: &mut Criterion) {
    let registry = populated_registry(256);
    let cursor = Oid::from_slice(&[1, 3, 6, 1, 4, 1, 8072, 2, 128]);
    c.bench_function("registry_lookup_next_256", |b| {
        b.iter(|| black_box(registry.lookup_next(DEFAULT_CONTEXT, black_box(&cursor))))
    });
}

criterion_group!(benches, bench_lookup_hit, bench_lookup_miss, bench_lookup_next);
criterion_main!(benches);
