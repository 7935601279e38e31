use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ferrous_locator::*;
use std::sync::Arc;

// ===== Micro Benchmarks =====

fn bench_single_hit(c: &mut Criterion) {
    let locator = Locator::builder()
        .module(Module::new().single(|_, _| Ok(42u64)))
        .build();

    // Prime the single
    let _ = locator.get::<u64>().unwrap();

    c.bench_function("single_hit_u64", |b| {
        b.iter(|| {
            let v = locator.get::<u64>().unwrap();
            black_box(v);
        })
    });
}

fn bench_scoped_vs_factory(c: &mut Criterion) {
    struct Service {
        value: u64,
    }

    let locator = Locator::builder()
        .module(
            Module::new()
                .factory(|_, _| Ok(Service { value: 1 }))
                .scope("request", |s| s.scoped(|_, _| Ok(Service { value: 2 }))),
        )
        .build();

    let scope = locator.create_scope("bench", Some(&"request".into())).unwrap();

    let mut group = c.benchmark_group("lifetimes");
    group.bench_function("factory", |b| {
        b.iter(|| black_box(locator.get::<Service>().unwrap().value))
    });
    group.bench_function("scoped_cached", |b| {
        b.iter(|| black_box(scope.get::<Service>().unwrap().value))
    });
    group.finish();
}

fn bench_scope_lifecycle(c: &mut Criterion) {
    struct Session;

    let locator = Locator::builder()
        .module(Module::new().scope("session", |s| s.scoped(|_, _| Ok(Session))))
        .build();

    let mut group = c.benchmark_group("scope_lifecycle");
    for callbacks in [0usize, 4, 16] {
        group.bench_with_input(
            BenchmarkId::from_parameter(callbacks),
            &callbacks,
            |b, &callbacks| {
                b.iter(|| {
                    let scope = locator.create_scope("s", Some(&"session".into())).unwrap();
                    for _ in 0..callbacks {
                        scope.register_callback(Arc::new(|s: &Scope| {
                            black_box(s.id());
                        }));
                    }
                    black_box(scope.get::<Session>().unwrap());
                    scope.close();
                })
            },
        );
    }
    group.finish();
}

fn bench_context_lookup(c: &mut Criterion) {
    struct Session;

    let locator = Locator::builder()
        .module(Module::new().scope("session", |s| s.scoped(|_, _| Ok(Session))))
        .build();
    let _scope = locator.create_scope("target", Some(&"session".into())).unwrap();
    let ctx = locator.context();

    c.bench_function("get_from_scope", |b| {
        b.iter(|| black_box(ctx.get_from_scope::<Session>("target", None, None).unwrap()))
    });
}

fn bench_properties(c: &mut Criterion) {
    let locator = Locator::builder().property("pool.size", 16).build();

    c.bench_function("property_read_u32", |b| {
        b.iter(|| black_box(locator.get_property::<u32>("pool.size").unwrap()))
    });
}

criterion_group!(
    benches,
    bench_single_hit,
    bench_scoped_vs_factory,
    bench_scope_lifecycle,
    bench_context_lookup,
    bench_properties
);
criterion_main!(benches);
