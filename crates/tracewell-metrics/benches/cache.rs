//! Instrument cache benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use prometheus::{Opts, Registry};
use tracewell_metrics::{new_shared_cache, CacheKey, Factory, Options, VectorCache};

fn bench_key_derivation(c: &mut Criterion) {
    let mut group = c.benchmark_group("cache/key");

    group.bench_function("name_only", |b| {
        b.iter(|| black_box(CacheKey::new("spans_received_total", &[])));
    });

    group.bench_function("three_labels", |b| {
        b.iter(|| {
            black_box(CacheKey::new(
                "spans_received_total",
                &["format", "transport", "tenant"],
            ))
        });
    });

    group.finish();
}

fn bench_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("cache/lookup");

    group.bench_function("hit", |b| {
        let cache = VectorCache::new(Registry::new());
        cache
            .get_or_make_counter_vec(Opts::new("spans_received_total", "Spans"), &["format"])
            .unwrap();

        b.iter(|| {
            black_box(
                cache
                    .get_or_make_counter_vec(
                        Opts::new("spans_received_total", "Spans"),
                        &["format"],
                    )
                    .unwrap(),
            );
        });
    });

    group.bench_function("miss", |b| {
        b.iter_batched(
            || VectorCache::new(Registry::new()),
            |cache| {
                black_box(
                    cache
                        .get_or_make_counter_vec(
                            Opts::new("spans_received_total", "Spans"),
                            &["format"],
                        )
                        .unwrap(),
                );
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

fn bench_factory(c: &mut Criterion) {
    let mut group = c.benchmark_group("cache/factory");

    let factory = Factory::new(new_shared_cache(Registry::new()));
    factory
        .counter(Options::new("spans_received_total").tag("format", "jaeger"))
        .unwrap();

    group.bench_function("tagged_counter_hit", |b| {
        b.iter(|| {
            black_box(
                factory
                    .counter(Options::new("spans_received_total").tag("format", "jaeger"))
                    .unwrap(),
            );
        });
    });

    group.finish();
}

criterion_group!(benches, bench_key_derivation, bench_lookup, bench_factory);
criterion_main!(benches);
