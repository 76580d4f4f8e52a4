//! # Backend Primitive Benchmark
//!
//! Sequential against parallel for the primitives the store leans on.
//!
//! Run with: `cargo bench --package swarm_core --bench backend_benchmark`

// Benchmarks don't need docs
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use swarm_core::{Backend, Parallel, Sequential};

const SIZES: [usize; 3] = [10_000, 100_000, 1_000_000];

fn random_keys(len: usize) -> Vec<u32> {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    (0..len).map(|_| rng.gen()).collect()
}

fn sort_on<B: Backend>(keys: &[u32], payload: &[u64]) -> u64 {
    let mut keys = keys.to_vec();
    let mut payload = payload.to_vec();
    B::sort_by_key(&mut keys, &mut payload);
    payload[0]
}

fn bench_sort_by_key(c: &mut Criterion) {
    let mut group = c.benchmark_group("sort_by_key");
    for len in SIZES {
        let keys = random_keys(len);
        let payload: Vec<u64> = (0..len as u64).collect();
        group.bench_with_input(BenchmarkId::new("sequential", len), &len, |b, _| {
            b.iter(|| black_box(sort_on::<Sequential>(&keys, &payload)));
        });
        group.bench_with_input(BenchmarkId::new("parallel", len), &len, |b, _| {
            b.iter(|| black_box(sort_on::<Parallel>(&keys, &payload)));
        });
    }
    group.finish();
}

fn scan_on<B: Backend>(input: &[u32], output: &mut [u64]) -> u64 {
    B::transform_exclusive_scan(input, output, |&x| u64::from(x), 0, |a, b| a + b)
}

fn bench_exclusive_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("transform_exclusive_scan");
    for len in SIZES {
        let input = random_keys(len);
        let mut output = vec![0_u64; len];
        group.bench_with_input(BenchmarkId::new("sequential", len), &len, |b, _| {
            b.iter(|| black_box(scan_on::<Sequential>(&input, &mut output)));
        });
        group.bench_with_input(BenchmarkId::new("parallel", len), &len, |b, _| {
            b.iter(|| black_box(scan_on::<Parallel>(&input, &mut output)));
        });
    }
    group.finish();
}

fn compact_on<B: Backend>(input: &[u32], output: &mut [u32]) -> usize {
    B::copy_if(input, input, output, |&x| x % 2 == 0).unwrap_or(0)
}

fn bench_copy_if(c: &mut Criterion) {
    let mut group = c.benchmark_group("copy_if");
    for len in SIZES {
        let input = random_keys(len);
        let mut output = vec![0_u32; len];
        group.bench_with_input(BenchmarkId::new("sequential", len), &len, |b, _| {
            b.iter(|| black_box(compact_on::<Sequential>(&input, &mut output)));
        });
        group.bench_with_input(BenchmarkId::new("parallel", len), &len, |b, _| {
            b.iter(|| black_box(compact_on::<Parallel>(&input, &mut output)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_sort_by_key, bench_exclusive_scan, bench_copy_if);
criterion_main!(benches);
