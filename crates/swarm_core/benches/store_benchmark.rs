//! # Particle Store Benchmark
//!
//! Whole-store operations on 1M particles with two user fields.
//!
//! Run with: `cargo bench --package swarm_core --bench store_benchmark`

// Benchmarks don't need docs
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use swarm_core::{particle_field, Backend, Parallel, Particles, Sequential, Vec3};

particle_field!(pub Velocity: Vec3 = "velocity");
particle_field!(pub Mass: f64 = "mass");

type Store<B> = Particles<(Velocity, Mass), 3, B>;

const PARTICLE_COUNT: usize = 1_000_000;

fn seeded<B: Backend>() -> Store<B> {
    let mut store = Store::<B>::with_len(PARTICLE_COUNT);
    store.for_each(|mut particle| {
        #[allow(clippy::cast_precision_loss)]
        let id = particle.id() as f64;
        *particle.get_mut::<Velocity, _>() = Vec3::new([1.0, id.sin(), id.cos()]);
        *particle.get_mut::<Mass, _>() = 1.0 + id % 7.0;
    });
    store
}

fn integrate<B: Backend>(store: &mut Store<B>) {
    store.for_each(|mut particle| {
        let velocity = *particle.get::<Velocity, _>();
        *particle.position_mut() += velocity * 0.016;
    });
}

fn bench_integrate(c: &mut Criterion) {
    let mut group = c.benchmark_group("integrate_1M");
    let mut sequential = seeded::<Sequential>();
    group.bench_function("sequential", |b| b.iter(|| integrate(&mut sequential)));
    let mut parallel = seeded::<Parallel>();
    group.bench_function("parallel", |b| b.iter(|| integrate(&mut parallel)));
    group.finish();
}

#[allow(clippy::cast_possible_truncation)]
fn cell_keys<B: Backend>(store: &Store<B>) -> Vec<i64> {
    store
        .positions()
        .iter()
        .map(|p| (p[1] * 64.0).floor() as i64 * 1_024 + (p[2] * 64.0).floor() as i64)
        .collect()
}

fn bench_spatial_sort(c: &mut Criterion) {
    let mut group = c.benchmark_group("spatial_sort_1M");
    group.sample_size(10);

    let mut sequential = seeded::<Sequential>();
    integrate(&mut sequential);
    group.bench_function("sequential", |b| {
        b.iter(|| {
            let mut keys = cell_keys(&sequential);
            black_box(sequential.sort_by_key(&mut keys))
        });
    });

    let mut parallel = seeded::<Parallel>();
    integrate(&mut parallel);
    group.bench_function("parallel", |b| {
        b.iter(|| {
            let mut keys = cell_keys(&parallel);
            black_box(parallel.sort_by_key(&mut keys))
        });
    });
    group.finish();
}

fn bench_push(c: &mut Criterion) {
    c.bench_function("push_position_100k", |b| {
        b.iter(|| {
            let mut store = Store::<Sequential>::new();
            for i in 0..100_000_u32 {
                black_box(store.push_position(Vec3::splat(f64::from(i))))
                    .unwrap_or_default();
            }
            store.len()
        });
    });
}

criterion_group!(benches, bench_integrate, bench_spatial_sort, bench_push);
criterion_main!(benches);
